//! Memory manager - single entry point over both memory tiers
//!
//! One `MemoryManager` exists per process. `MemoryManager::instance()` builds it
//! from the environment on first use, runs `initialize()` once, and hands the
//! same `Arc` to every caller afterwards. Construction is guarded by a
//! `tokio::sync::OnceCell`, so concurrent first callers wait for a single
//! initialization instead of racing to create their own.

use crate::config::Config;
use crate::core::{SemanticDocument, SortedSetStore, VectorStore};
use crate::database::{PineconeClient, PineconeStore, UpstashClient};
use crate::error::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::embedding::OpenAiEmbeddings;
use super::history::{HistoryStore, SeedOutcome, DEFAULT_SEED_DELIMITER};
use super::key::{CompanionKey, HistoryKey};
use super::retrieval::{Retrieval, SemanticRetriever};

/// Lazily initialized, at-most-once holder for a shared `MemoryManager`
pub struct ManagerCell {
    cell: OnceCell<Arc<MemoryManager>>,
}

impl ManagerCell {
    /// Create an empty cell
    pub const fn new() -> Self {
        ManagerCell {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the manager, building and initializing it with `build` on first use.
    ///
    /// If `build` fails the cell stays empty and the next caller retries.
    pub async fn get_or_try_init<F, Fut>(&self, build: F) -> Result<Arc<MemoryManager>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MemoryManager>>,
    {
        self.cell
            .get_or_try_init(|| async {
                let manager = build().await?;
                manager.initialize().await?;
                Ok::<_, crate::error::Error>(Arc::new(manager))
            })
            .await
            .cloned()
    }

    /// The manager, if already initialized
    pub fn get(&self) -> Option<Arc<MemoryManager>> {
        self.cell.get().cloned()
    }
}

impl Default for ManagerCell {
    fn default() -> Self {
        Self::new()
    }
}

static INSTANCE: ManagerCell = ManagerCell::new();

/// Conversational memory for companion agents
pub struct MemoryManager {
    history: HistoryStore,
    retriever: SemanticRetriever,
}

impl MemoryManager {
    /// Create a manager over explicit backends
    pub fn new(
        history: Arc<dyn SortedSetStore>,
        vectors: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        MemoryManager {
            history: HistoryStore::new(history),
            retriever: SemanticRetriever::new(vectors, top_k),
        }
    }

    /// Create a manager backed by Upstash, Pinecone and OpenAI embeddings
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let timeout = config.http.timeout_secs;
        let history = UpstashClient::new(&config.upstash, timeout)?;
        let embeddings = OpenAiEmbeddings::new(&config.openai, timeout)?;
        let index = PineconeClient::new(&config.pinecone, timeout)?;
        let vectors = PineconeStore::new(index, Arc::new(embeddings), &config.pinecone.text_key);

        Ok(Self::new(
            Arc::new(history),
            Arc::new(vectors),
            config.retrieval.top_k,
        ))
    }

    /// Get the process-wide manager, creating it from the environment on first use
    pub async fn instance() -> Result<Arc<MemoryManager>> {
        INSTANCE
            .get_or_try_init(|| async {
                Config::from_env().and_then(|config| Self::from_config(&config))
            })
            .await
    }

    /// Validate that the long-term index is usable
    pub async fn initialize(&self) -> Result<()> {
        self.retriever.health_check().await?;
        info!("Memory manager initialized (top_k={})", self.retriever.top_k());
        Ok(())
    }

    fn guard(&self, key: &CompanionKey, operation: &str) -> Option<HistoryKey> {
        let derived = key.derive();
        if derived.is_none() {
            warn!(
                companion = %key.companion_name,
                model = %key.model_name,
                "Companion key set incorrectly, skipping {}",
                operation
            );
        }
        derived
    }

    /// Append a line to the conversation, scored with the current time.
    ///
    /// Returns `None` without touching the store when the key is malformed.
    pub async fn write_to_history(&self, text: &str, key: &CompanionKey) -> Result<Option<i64>> {
        let Some(key) = self.guard(key, "write") else {
            return Ok(None);
        };
        self.history.append_now(&key, text).await.map(Some)
    }

    /// The 30 most recent lines of the conversation, oldest first, newline-joined.
    ///
    /// Returns an empty string when the key is malformed or the conversation is new.
    pub async fn read_latest_history(&self, key: &CompanionKey) -> Result<String> {
        let Some(key) = self.guard(key, "read") else {
            return Ok(String::new());
        };
        self.history.read_recent(&key).await
    }

    /// Seed an empty conversation from newline-separated content
    pub async fn seed_chat_history(&self, content: &str, key: &CompanionKey) -> Result<SeedOutcome> {
        self.seed_chat_history_with(content, DEFAULT_SEED_DELIMITER, key)
            .await
    }

    /// Seed an empty conversation from content split on `delimiter`
    pub async fn seed_chat_history_with(
        &self,
        content: &str,
        delimiter: &str,
        key: &CompanionKey,
    ) -> Result<SeedOutcome> {
        let Some(key) = self.guard(key, "seed") else {
            return Ok(SeedOutcome::InvalidKey);
        };
        self.history.seed_if_absent(&key, content, delimiter).await
    }

    /// Long-term fragments similar to `recent_chat_history` from `companion_file_name`.
    ///
    /// Never fails: search errors are logged and yield an empty list.
    pub async fn vector_search(
        &self,
        recent_chat_history: &str,
        companion_file_name: &str,
    ) -> Vec<SemanticDocument> {
        self.vector_search_detailed(recent_chat_history, companion_file_name)
            .await
            .into_documents()
    }

    /// Like `vector_search`, keeping the search outcome
    pub async fn vector_search_detailed(
        &self,
        recent_chat_history: &str,
        companion_file_name: &str,
    ) -> Retrieval {
        self.retriever
            .search(recent_chat_history, companion_file_name)
            .await
    }
}
