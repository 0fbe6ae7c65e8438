//! Query embedding via the OpenAI embeddings API
//!
//! Long-term documents were indexed with an OpenAI model, so queries must be
//! embedded with the same one (`text-embedding-ada-002` unless configured).

use crate::config::OpenAIConfig;
use crate::core::EmbeddingProvider;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// OpenAI embeddings client
#[derive(Clone)]
pub struct OpenAiEmbeddings {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAiEmbeddings {
    /// Create a new embeddings client
    pub fn new(config: &OpenAIConfig, timeout_secs: u64) -> Result<Self> {
        let mut auth = header::HeaderValue::from_str(&format!(
            "Bearer {}",
            config.api_key.expose_secret()
        ))
        .map_err(|e| Error::Config(format!("Invalid API key format: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(OpenAiEmbeddings {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.embedding_model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);

        debug!("Requesting embedding: model={} chars={}", self.model, text.len());

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::Embedding(format!(
                "OpenAI embeddings failed with status {}: {}",
                status, message
            )));
        }

        let body = response.json::<EmbeddingResponse>().await?;
        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("No embedding returned".into()))
    }
}
