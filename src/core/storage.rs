//! Storage traits - Abstract interfaces for the two memory tiers
//!
//! - `SortedSetStore`: ordered key-value collections (short-term chat history)
//! - `VectorStore`: similarity search over an externally maintained index (long-term memory)
//!
//! Production implementations live in `crate::database`; the traits keep the
//! memory layer testable with in-process doubles.

use async_trait::async_trait;

use super::types::{Metadata, SemanticDocument};
use crate::error::Result;

/// Abstract interface for a sorted-set store (Redis `Z*` semantics)
///
/// Members are ordered by a numeric score, ascending.
#[async_trait]
pub trait SortedSetStore: Send + Sync {
    /// Get the backend ID
    fn id(&self) -> &str;

    /// Add `member` to the collection at `key` with `score`.
    ///
    /// Returns the store's acknowledgment (number of newly added members).
    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<i64>;

    /// Members whose score lies in `[min, max]`, ascending by score
    async fn zrange_by_score(&self, key: &str, min: i64, max: i64) -> Result<Vec<String>>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Abstract interface for a similarity-search store
///
/// Implementations own query embedding and ranking; callers pass raw text.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the backend ID
    fn id(&self) -> &str;

    /// Return at most `k` documents similar to `query` whose metadata matches
    /// every entry of `filter`, ranked by the index.
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: &Metadata,
    ) -> Result<Vec<SemanticDocument>>;

    /// Verify the index is reachable and usable
    async fn health_check(&self) -> Result<()>;
}
