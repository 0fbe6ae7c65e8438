//! Configuration management for companion memory
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Default Pinecone control-plane endpoint
pub const DEFAULT_PINECONE_CONTROLLER_URL: &str = "https://api.pinecone.io";

/// Default OpenAI API endpoint
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model, matching the one the long-term index was built with
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Default number of long-term fragments returned per search
pub const DEFAULT_TOP_K: usize = 3;

/// Upstash Redis REST configuration (short-term history)
#[derive(Debug, Clone)]
pub struct UpstashConfig {
    /// REST endpoint URL
    pub url: String,
    /// REST bearer token
    pub token: SecretString,
}

/// Pinecone configuration (long-term semantic memory)
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// API key
    pub api_key: SecretString,
    /// Name of the index holding companion documents
    pub index: String,
    /// Control-plane URL used to resolve the index host
    pub controller_url: String,
    /// Metadata key under which document text is stored
    pub text_key: String,
}

/// OpenAI configuration (query embeddings)
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key
    pub api_key: SecretString,
    /// Base URL for the OpenAI API
    pub base_url: String,
    /// Embedding model
    pub embedding_model: String,
}

/// Retrieval tuning
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Maximum number of long-term fragments per search
    pub top_k: usize,
}

/// Outbound HTTP settings shared by all clients
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter
    pub level: String,
    /// Log format (pretty, json)
    pub format: String,
}

/// Main configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstash settings
    pub upstash: UpstashConfig,
    /// Pinecone settings
    pub pinecone: PineconeConfig,
    /// OpenAI settings
    pub openai: OpenAIConfig,
    /// Retrieval settings
    pub retrieval: RetrievalConfig,
    /// HTTP settings
    pub http: HttpConfig,
    /// Logging settings
    pub log: LogConfig,
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{} is required", name)))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config {
            upstash: UpstashConfig {
                url: required("UPSTASH_REDIS_REST_URL")?,
                token: SecretString::from(required("UPSTASH_REDIS_REST_TOKEN")?),
            },
            pinecone: PineconeConfig {
                api_key: SecretString::from(required("PINECONE_API_KEY")?),
                index: required("PINECONE_INDEX")?,
                controller_url: std::env::var("PINECONE_CONTROLLER_URL")
                    .unwrap_or_else(|_| DEFAULT_PINECONE_CONTROLLER_URL.to_string()),
                text_key: std::env::var("PINECONE_TEXT_KEY").unwrap_or_else(|_| "text".to_string()),
            },
            openai: OpenAIConfig {
                api_key: SecretString::from(required("OPENAI_API_KEY")?),
                base_url: std::env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
                embedding_model: std::env::var("OPENAI_EMBEDDING_MODEL")
                    .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            },
            retrieval: RetrievalConfig {
                top_k: std::env::var("MEMORY_SEARCH_TOP_K")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TOP_K),
            },
            http: HttpConfig {
                timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            log: LogConfig {
                level: std::env::var("RUST_LOG")
                    .unwrap_or_else(|_| "info,companion_memory=debug".to_string()),
                format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Create a minimal config for testing; fails validation until secrets are filled in
    pub fn minimal() -> Self {
        Config {
            upstash: UpstashConfig {
                url: String::new(),
                token: SecretString::from(""),
            },
            pinecone: PineconeConfig {
                api_key: SecretString::from(""),
                index: String::new(),
                controller_url: DEFAULT_PINECONE_CONTROLLER_URL.to_string(),
                text_key: "text".to_string(),
            },
            openai: OpenAIConfig {
                api_key: SecretString::from(""),
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            },
            retrieval: RetrievalConfig {
                top_k: DEFAULT_TOP_K,
            },
            http: HttpConfig { timeout_secs: 30 },
            log: LogConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    /// Validate that all required configuration is present and well-formed
    pub fn validate(&self) -> Result<()> {
        if self.upstash.url.is_empty() {
            return Err(Error::Config("UPSTASH_REDIS_REST_URL is required".to_string()));
        }
        if self.upstash.token.expose_secret().is_empty() {
            return Err(Error::Config("UPSTASH_REDIS_REST_TOKEN is required".to_string()));
        }
        if self.pinecone.api_key.expose_secret().is_empty() {
            return Err(Error::Config("PINECONE_API_KEY is required".to_string()));
        }
        if self.pinecone.index.is_empty() {
            return Err(Error::Config("PINECONE_INDEX is required".to_string()));
        }
        if self.openai.api_key.expose_secret().is_empty() {
            return Err(Error::Config("OPENAI_API_KEY is required".to_string()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("MEMORY_SEARCH_TOP_K must be at least 1".to_string()));
        }

        Url::parse(&self.upstash.url)?;
        Url::parse(&self.pinecone.controller_url)?;
        Url::parse(&self.openai.base_url)?;
        Ok(())
    }
}
