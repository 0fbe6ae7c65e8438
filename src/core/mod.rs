//! Core module - Fundamental traits and types
//!
//! This module defines the seams between the memory layer and its external
//! collaborators:
//! - Storage traits for the sorted-set history store and the vector store
//! - Provider trait for embedding backends
//! - Shared document and metadata types

pub mod provider;
pub mod storage;
pub mod types;

// Re-export core traits for convenient access
pub use provider::EmbeddingProvider;
pub use storage::{SortedSetStore, VectorStore};
pub use types::*;
