//! Database module - external stores behind the memory tiers
//!
//! - Upstash Redis (REST): sorted-set chat history
//! - In-memory sorted sets: local development and tests
//! - Pinecone: long-term semantic memory

mod memory;
mod pinecone;
mod upstash;

pub use memory::InMemorySortedSet;
pub use pinecone::{IndexDescription, IndexStatus, PineconeClient, PineconeStore, QueryMatch};
pub use upstash::UpstashClient;
