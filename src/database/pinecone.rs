//! Pinecone client for long-term semantic memory
//!
//! The control plane resolves an index name to its data-plane host; queries go
//! to `https://{host}/query`. Document text is stored in match metadata under a
//! configurable key (`text` by default).

use crate::config::PineconeConfig;
use crate::core::{EmbeddingProvider, Metadata, SemanticDocument, VectorStore};
use crate::error::{Error, Result};
use crate::memory::cache::EmbeddingCache;
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

/// Pinecone REST API version sent with every request
const API_VERSION: &str = "2024-07";

/// Index description from the control plane
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    /// Index name
    pub name: String,
    /// Data-plane host (usually without scheme)
    pub host: String,
    /// Vector dimension
    #[serde(default)]
    pub dimension: Option<u32>,
    /// Readiness status
    #[serde(default)]
    pub status: Option<IndexStatus>,
}

/// Index readiness
#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    /// Whether the index accepts queries
    pub ready: bool,
    /// Lifecycle state (Ready, Initializing, ...)
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

/// A single match from a data-plane query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    /// Vector ID
    pub id: String,
    /// Similarity score
    #[serde(default)]
    pub score: Option<f32>,
    /// Stored metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Pinecone REST client bound to a single index
#[derive(Clone)]
pub struct PineconeClient {
    client: Client,
    controller_url: Url,
    index: String,
    host: Arc<OnceCell<Url>>,
}

impl PineconeClient {
    /// Create a new Pinecone client
    pub fn new(config: &PineconeConfig, timeout_secs: u64) -> Result<Self> {
        let controller_url = as_base(Url::parse(&config.controller_url)?);
        if config.index.is_empty() {
            return Err(Error::Config("PINECONE_INDEX is required".to_string()));
        }

        let mut api_key = header::HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| Error::Config(format!("Invalid Pinecone API key format: {}", e)))?;
        api_key.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert("api-key", api_key);
        headers.insert(
            "x-pinecone-api-version",
            header::HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(PineconeClient {
            client,
            controller_url,
            index: config.index.clone(),
            host: Arc::new(OnceCell::new()),
        })
    }

    /// Name of the index this client queries
    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Describe the configured index via the control plane
    pub async fn describe_index(&self) -> Result<IndexDescription> {
        let url = self
            .controller_url
            .join(&format!("indexes/{}", self.index))?;

        debug!("Describing Pinecone index {}", self.index);

        let response = self.client.get(url).send().await?;
        let response = check_status(response, "describe index").await?;
        Ok(response.json::<IndexDescription>().await?)
    }

    /// Resolve (once) the data-plane host for the index
    async fn host(&self) -> Result<&Url> {
        self.host
            .get_or_try_init(|| async {
                let description = self.describe_index().await?;
                let url = parse_host(&description.host)?;
                info!("Resolved Pinecone index {} to {}", self.index, url);
                Ok::<Url, Error>(url)
            })
            .await
    }

    /// Run a similarity query against the index
    pub async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &Metadata,
    ) -> Result<Vec<QueryMatch>> {
        let url = self.host().await?.join("query")?;

        let request = QueryRequest {
            vector,
            top_k,
            filter: equality_filter(filter),
            include_metadata: true,
            include_values: false,
        };

        let response = self.client.post(url).json(&request).send().await?;
        let response = check_status(response, "query").await?;
        let body = response.json::<QueryResponse>().await?;

        debug!("Pinecone query returned {} matches", body.matches.len());
        Ok(body.matches)
    }

    /// Verify the index exists and is ready, caching its host
    pub async fn health_check(&self) -> Result<()> {
        let description = self.describe_index().await?;

        if let Some(status) = &description.status {
            if !status.ready {
                return Err(Error::VectorIndex(format!(
                    "Index {} is not ready (state: {})",
                    description.name,
                    status.state.as_deref().unwrap_or("unknown")
                )));
            }
        }

        let url = parse_host(&description.host)?;
        // A concurrent query may already have filled the cell
        let _ = self.host.set(url);
        Ok(())
    }
}

async fn check_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(Error::VectorIndex(format!(
        "Pinecone {} failed with status {}: {}",
        operation, status, text
    )))
}

fn parse_host(host: &str) -> Result<Url> {
    let host = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };
    Ok(as_base(Url::parse(&host)?))
}

/// Give `url` a trailing slash so `join` appends to its path instead of replacing the last segment
fn as_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Translate `{field: value}` pairs into Pinecone `$eq` filters
fn equality_filter(filter: &Metadata) -> Option<Value> {
    if filter.is_empty() {
        return None;
    }

    let clauses: Map<String, Value> = filter
        .iter()
        .map(|(field, value)| (field.clone(), json!({ "$eq": value })))
        .collect();
    Some(Value::Object(clauses))
}

/// Vector store over a Pinecone index, embedding queries with an external provider
pub struct PineconeStore {
    client: PineconeClient,
    embeddings: Arc<dyn EmbeddingProvider>,
    cache: EmbeddingCache,
    text_key: String,
}

impl PineconeStore {
    /// Create a new store
    pub fn new(
        client: PineconeClient,
        embeddings: Arc<dyn EmbeddingProvider>,
        text_key: impl Into<String>,
    ) -> Self {
        PineconeStore {
            client,
            embeddings,
            cache: EmbeddingCache::new(),
            text_key: text_key.into(),
        }
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let model = self.embeddings.model();
        if let Some(cached) = self.cache.get(model, query).await {
            return Ok(cached);
        }

        let embedding = self.embeddings.embed(query).await?;
        self.cache.put(model, query, embedding.clone()).await;
        Ok(embedding)
    }

    fn to_document(&self, matched: QueryMatch) -> Option<SemanticDocument> {
        let mut metadata = matched.metadata.unwrap_or_default();

        let page_content = match metadata.remove(&self.text_key) {
            Some(Value::String(text)) => text,
            _ => {
                warn!(
                    "Pinecone match {} has no '{}' metadata, skipping",
                    matched.id, self.text_key
                );
                return None;
            }
        };

        Some(SemanticDocument {
            page_content,
            metadata,
            score: matched.score,
        })
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    fn id(&self) -> &str {
        "pinecone"
    }

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: &Metadata,
    ) -> Result<Vec<SemanticDocument>> {
        let vector = self.embed_query(query).await?;
        let matches = self.client.query(&vector, k, filter).await?;

        Ok(matches
            .into_iter()
            .filter_map(|m| self.to_document(m))
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        self.client.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scope_filter;

    #[test]
    fn test_parse_host_adds_scheme() {
        let url = parse_host("companion-abc123.svc.us-east1-gcp.pinecone.io").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(
            url.join("query").unwrap().as_str(),
            "https://companion-abc123.svc.us-east1-gcp.pinecone.io/query"
        );

        let url = parse_host("http://127.0.0.1:8080").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_path_prefix_survives_join() {
        let url = as_base(Url::parse("https://proxy.internal/pinecone").unwrap());
        assert_eq!(
            url.join("indexes/companion").unwrap().as_str(),
            "https://proxy.internal/pinecone/indexes/companion"
        );

        let url = as_base(Url::parse("https://api.pinecone.io").unwrap());
        assert_eq!(
            url.join("indexes/companion").unwrap().as_str(),
            "https://api.pinecone.io/indexes/companion"
        );

        let url = parse_host("http://127.0.0.1:8080/data/").unwrap();
        assert_eq!(url.join("query").unwrap().as_str(), "http://127.0.0.1:8080/data/query");
    }

    #[test]
    fn test_equality_filter() {
        assert!(equality_filter(&Metadata::new()).is_none());

        let filter = equality_filter(&scope_filter("Elon.txt")).unwrap();
        assert_eq!(filter, json!({ "fileName": { "$eq": "Elon.txt" } }));
    }

    #[test]
    fn test_query_request_shape() {
        let request = QueryRequest {
            vector: &[0.1, 0.2],
            top_k: 3,
            filter: equality_filter(&scope_filter("a.txt")),
            include_metadata: true,
            include_values: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["topK"], json!(3));
        assert_eq!(value["includeMetadata"], json!(true));
        assert_eq!(value["filter"]["fileName"]["$eq"], json!("a.txt"));
    }

    #[test]
    fn test_client_requires_index_name() {
        let config = PineconeConfig {
            api_key: "pc-key".into(),
            index: String::new(),
            controller_url: "https://api.pinecone.io".to_string(),
            text_key: "text".to_string(),
        };
        assert!(matches!(PineconeClient::new(&config, 5), Err(Error::Config(_))));
    }
}
