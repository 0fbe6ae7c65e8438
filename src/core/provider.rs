//! Embedding provider trait - Abstract interface for text embedding backends
//!
//! The long-term index is queried by vector; providers turn query text into
//! that vector. Only vector stores talk to providers.

use async_trait::async_trait;

use crate::error::Result;

/// Abstract interface for embedding generation
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier used for embeddings
    fn model(&self) -> &str;

    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
