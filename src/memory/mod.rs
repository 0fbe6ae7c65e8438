//! Memory module - short-term chat history and long-term semantic recall
//!
//! Composes a sorted-set history store and a similarity-search vector store
//! behind `MemoryManager`, keyed per companion, model and user.

pub mod cache;
pub mod embedding;
pub mod history;
pub mod key;
pub mod manager;
pub mod retrieval;

pub use cache::EmbeddingCache;
pub use embedding::OpenAiEmbeddings;
pub use history::{HistoryStore, SeedOutcome, DEFAULT_SEED_DELIMITER, HISTORY_WINDOW};
pub use key::{CompanionKey, HistoryKey};
pub use manager::{ManagerCell, MemoryManager};
pub use retrieval::{Retrieval, RetrievalOutcome, SemanticRetriever};
