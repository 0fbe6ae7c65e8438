//! Short-term chat history
//!
//! Each conversation is a sorted set keyed by its `HistoryKey`. Live writes are
//! scored with the current epoch milliseconds, seeded lines with 0, 1, 2, ...
//! so that both read back in the order they were meant to be read.

use crate::core::SortedSetStore;
use crate::error::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::key::HistoryKey;

/// Number of most recent lines returned by `read_recent`
pub const HISTORY_WINDOW: usize = 30;

/// Separator used when joining history lines and, by default, when splitting seed content
pub const DEFAULT_SEED_DELIMITER: &str = "\n";

/// Result of a seeding attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The conversation was empty and `lines` entries were written
    Seeded {
        /// Number of lines written
        lines: usize,
    },
    /// The conversation already had history; nothing was written
    AlreadyPresent,
    /// The caller's key was malformed; nothing was written
    InvalidKey,
}

/// Append-only chat log over a sorted-set store
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn SortedSetStore>,
}

impl HistoryStore {
    /// Create a new history store
    pub fn new(store: Arc<dyn SortedSetStore>) -> Self {
        HistoryStore { store }
    }

    /// Append `text` with an explicit score, returning the store's acknowledgment
    pub async fn append(&self, key: &HistoryKey, text: &str, score: i64) -> Result<i64> {
        self.store.zadd(key.as_str(), score, text).await
    }

    /// Append `text` scored with the current time
    pub async fn append_now(&self, key: &HistoryKey, text: &str) -> Result<i64> {
        self.append(key, text, Utc::now().timestamp_millis()).await
    }

    /// The most recent `HISTORY_WINDOW` lines, oldest first, joined by newlines
    pub async fn read_recent(&self, key: &HistoryKey) -> Result<String> {
        let now = Utc::now().timestamp_millis();
        let members = self.store.zrange_by_score(key.as_str(), 0, now).await?;

        let start = members.len().saturating_sub(HISTORY_WINDOW);
        debug!(
            "Read {} of {} history lines for {}",
            members.len() - start,
            members.len(),
            key
        );

        Ok(members[start..].join(DEFAULT_SEED_DELIMITER))
    }

    /// Seed an empty conversation from `content` split on `delimiter`
    pub async fn seed_if_absent(
        &self,
        key: &HistoryKey,
        content: &str,
        delimiter: &str,
    ) -> Result<SeedOutcome> {
        if self.store.exists(key.as_str()).await? {
            debug!("Conversation {} already has chat history", key);
            return Ok(SeedOutcome::AlreadyPresent);
        }

        let mut lines = 0;
        for (score, line) in split_seed(content, delimiter).into_iter().enumerate() {
            self.append(key, line, score as i64).await?;
            lines += 1;
        }

        info!("Seeded {} history lines for {}", lines, key);
        Ok(SeedOutcome::Seeded { lines })
    }
}

/// Split seed content into lines; an empty delimiter yields one line per character
fn split_seed<'a>(content: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter.is_empty() {
        return content
            .char_indices()
            .map(|(i, c)| &content[i..i + c.len_utf8()])
            .collect();
    }
    content.split(delimiter).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemorySortedSet;

    fn key() -> HistoryKey {
        HistoryKey::new("Elon", "gpt", "u1").unwrap()
    }

    fn history() -> (HistoryStore, Arc<InMemorySortedSet>) {
        let store = Arc::new(InMemorySortedSet::new());
        (HistoryStore::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_read_missing_key_is_empty() {
        let (history, _) = history();
        assert_eq!(history.read_recent(&key()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_seed_then_read_round_trip() {
        let (history, _) = history();
        let outcome = history
            .seed_if_absent(&key(), "a\nb\nc", DEFAULT_SEED_DELIMITER)
            .await
            .unwrap();

        assert_eq!(outcome, SeedOutcome::Seeded { lines: 3 });
        assert_eq!(history.read_recent(&key()).await.unwrap(), "a\nb\nc");
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let (history, store) = history();
        history
            .seed_if_absent(&key(), "a\nb\nc", DEFAULT_SEED_DELIMITER)
            .await
            .unwrap();
        let before = store.len(key().as_str()).await;

        let outcome = history
            .seed_if_absent(&key(), "x\ny", DEFAULT_SEED_DELIMITER)
            .await
            .unwrap();

        assert_eq!(outcome, SeedOutcome::AlreadyPresent);
        assert_eq!(store.len(key().as_str()).await, before);
        assert_eq!(history.read_recent(&key()).await.unwrap(), "a\nb\nc");
    }

    #[tokio::test]
    async fn test_seed_with_custom_delimiter() {
        let (history, _) = history();
        history
            .seed_if_absent(&key(), "Human: hi|||Elon: hello", "|||")
            .await
            .unwrap();

        assert_eq!(
            history.read_recent(&key()).await.unwrap(),
            "Human: hi\nElon: hello"
        );
    }

    #[tokio::test]
    async fn test_seed_with_empty_delimiter_splits_characters() {
        let (history, store) = history();
        let outcome = history.seed_if_absent(&key(), "abc", "").await.unwrap();

        assert_eq!(outcome, SeedOutcome::Seeded { lines: 3 });
        assert_eq!(store.len(key().as_str()).await, 3);
        assert_eq!(history.read_recent(&key()).await.unwrap(), "a\nb\nc");
    }

    #[test]
    fn test_split_seed() {
        assert_eq!(split_seed("a\nb", "\n"), vec!["a", "b"]);
        assert_eq!(split_seed("héllo", ""), vec!["h", "é", "l", "l", "o"]);
        assert!(split_seed("", "").is_empty());
        assert_eq!(split_seed("", "\n"), vec![""]);
    }

    #[tokio::test]
    async fn test_repeated_text_keeps_latest_occurrence() {
        let (history, _) = history();
        assert_eq!(history.append(&key(), "hi", 1).await.unwrap(), 1);
        history.append(&key(), "bye", 2).await.unwrap();
        assert_eq!(history.append(&key(), "hi", 3).await.unwrap(), 0);

        assert_eq!(history.read_recent(&key()).await.unwrap(), "bye\nhi");
    }

    #[tokio::test]
    async fn test_read_returns_last_thirty_oldest_first() {
        let (history, _) = history();
        for i in 0..45 {
            history.append(&key(), &format!("line {i:02}"), i).await.unwrap();
        }

        let recent = history.read_recent(&key()).await.unwrap();
        let lines: Vec<&str> = recent.split('\n').collect();

        assert_eq!(lines.len(), HISTORY_WINDOW);
        assert_eq!(lines.first(), Some(&"line 15"));
        assert_eq!(lines.last(), Some(&"line 44"));
    }

    #[tokio::test]
    async fn test_live_writes_follow_seeded_lines() {
        let (history, _) = history();
        history
            .seed_if_absent(&key(), "seed one\nseed two", DEFAULT_SEED_DELIMITER)
            .await
            .unwrap();
        history.append_now(&key(), "Human: what's up?").await.unwrap();

        assert_eq!(
            history.read_recent(&key()).await.unwrap(),
            "seed one\nseed two\nHuman: what's up?"
        );
    }

    #[tokio::test]
    async fn test_conversations_are_isolated() {
        let (history, _) = history();
        let other = HistoryKey::new("Elon", "gpt", "u2").unwrap();

        history.append(&key(), "mine", 1).await.unwrap();
        assert_eq!(history.read_recent(&other).await.unwrap(), "");
    }
}
