//! # Companion Memory
//!
//! Two-tier conversational memory for companion agents.
//!
//! ## Features
//!
//! - **Short-term history:** per-conversation chat log in Upstash Redis sorted sets
//! - **Long-term recall:** scoped similarity search over a Pinecone index
//! - **Idempotent seeding:** bootstrap a conversation's backstory exactly once
//! - **Process-wide manager:** lazily initialized, shared by every request
//!
//! ```no_run
//! use companion_memory::{CompanionKey, MemoryManager};
//!
//! # async fn run() -> companion_memory::Result<()> {
//! let memory = MemoryManager::instance().await?;
//! let key = CompanionKey::new("Elon", "llama2-13b", "user_42");
//!
//! memory.write_to_history("User: how are rockets going?", &key).await?;
//! let recent = memory.read_latest_history(&key).await?;
//! let context = memory.vector_search(&recent, "Elon.txt").await;
//! # let _ = context;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod database;
pub mod error;
pub mod logging;
pub mod memory;

pub use config::Config;
pub use error::{Error, Result};
pub use memory::{CompanionKey, MemoryManager, SeedOutcome};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
