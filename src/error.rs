//! Error types for companion memory

use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for companion memory
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Short-term history store error (Upstash / Redis)
    #[error("History store error: {0}")]
    Store(String),

    /// Vector index error (Pinecone)
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Embedding provider error (OpenAI)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Store(_) | Error::VectorIndex(_) | Error::Embedding(_)
        )
    }

    /// Check if error is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::Config(_) | Error::Env(_))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("Invalid URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::Store("connection reset".into()).is_retryable());
        assert!(Error::VectorIndex("503".into()).is_retryable());
        assert!(!Error::InvalidInput("empty user".into()).is_retryable());

        assert!(Error::InvalidInput("empty user".into()).is_client_error());
        assert!(Error::Config("missing key".into()).is_client_error());
        assert!(!Error::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn test_url_parse_error_maps_to_config() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::Config(_)));
    }
}
