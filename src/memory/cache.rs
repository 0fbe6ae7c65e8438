//! In-process cache for query embeddings
//!
//! Recent chat windows are searched repeatedly while a conversation is active;
//! caching their embeddings saves a provider round-trip per search.
//! Uses moka async cache (Send + Sync, TTL-based eviction).

use moka::future::Cache;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

/// Cache key helper: hash model + text to u64
fn hash_key(model: &str, text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    text.hash(&mut hasher);
    hasher.finish()
}

/// Embedding cache: hash(model, text) -> Vec<f32>
#[derive(Clone)]
pub struct EmbeddingCache {
    embeddings: Cache<u64, Vec<f32>>,
}

impl EmbeddingCache {
    /// Create a new cache with default settings
    pub fn new() -> Self {
        Self::with_limits(1000, Duration::from_secs(30 * 60))
    }

    /// Create a cache with explicit capacity and TTL
    pub fn with_limits(max_capacity: u64, ttl: Duration) -> Self {
        EmbeddingCache {
            embeddings: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Get a cached embedding
    pub async fn get(&self, model: &str, text: &str) -> Option<Vec<f32>> {
        self.embeddings.get(&hash_key(model, text)).await
    }

    /// Store an embedding in cache
    pub async fn put(&self, model: &str, text: &str, embedding: Vec<f32>) {
        self.embeddings.insert(hash_key(model, text), embedding).await;
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedding_cache() {
        let cache = EmbeddingCache::new();

        assert!(cache.get("ada", "hello").await.is_none());

        cache.put("ada", "hello", vec![0.1, 0.2, 0.3]).await;

        let result = cache.get("ada", "hello").await;
        assert_eq!(result.map(|v| v.len()), Some(3));
    }

    #[tokio::test]
    async fn test_cache_is_per_model() {
        let cache = EmbeddingCache::new();
        cache.put("ada", "hello", vec![1.0]).await;

        assert!(cache.get("text-embedding-3-small", "hello").await.is_none());
    }
}
