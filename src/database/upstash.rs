//! Upstash Redis REST client for short-term chat history
//!
//! Every command is a `POST` of a JSON array (`["ZADD", key, score, member]`)
//! to the database URL, authenticated with a bearer token.

use crate::config::UpstashConfig;
use crate::core::SortedSetStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Upstash REST response envelope
#[derive(Debug, Deserialize)]
struct UpstashResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Upstash Redis REST client
#[derive(Clone)]
pub struct UpstashClient {
    client: Client,
    endpoint: Url,
}

impl UpstashClient {
    /// Create a new Upstash client
    pub fn new(config: &UpstashConfig, timeout_secs: u64) -> Result<Self> {
        let endpoint = Url::parse(&config.url)?;

        let mut auth = header::HeaderValue::from_str(&format!(
            "Bearer {}",
            config.token.expose_secret()
        ))
        .map_err(|e| Error::Config(format!("Invalid Upstash token format: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(UpstashClient { client, endpoint })
    }

    /// Send one Redis command and return its `result` payload
    async fn command(&self, args: &[&str]) -> Result<Value> {
        debug!("Upstash command: {}", args.first().copied().unwrap_or_default());

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&args)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let body: UpstashResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(Error::Store(format!(
                    "Upstash request failed with status {}: {}",
                    status, text
                )))
            }
        };

        if let Some(error) = body.error {
            return Err(Error::Store(format!("{} (status {})", error, status)));
        }
        if !status.is_success() {
            return Err(Error::Store(format!("Upstash request failed with status {}", status)));
        }

        Ok(body.result.unwrap_or(Value::Null))
    }
}

fn as_integer(command: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| Error::Store(format!("{} returned a non-integer: {}", command, n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| Error::Store(format!("{} returned a non-integer: {}", command, s))),
        other => Err(Error::Store(format!("{} returned unexpected payload: {}", command, other))),
    }
}

#[async_trait]
impl SortedSetStore for UpstashClient {
    fn id(&self) -> &str {
        "upstash"
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<i64> {
        let score = score.to_string();
        let result = self.command(&["ZADD", key, &score, member]).await?;
        as_integer("ZADD", &result)
    }

    async fn zrange_by_score(&self, key: &str, min: i64, max: i64) -> Result<Vec<String>> {
        let (min, max) = (min.to_string(), max.to_string());
        let result = self
            .command(&["ZRANGE", key, &min, &max, "BYSCORE"])
            .await?;

        match result {
            Value::Null => Ok(Vec::new()),
            Value::Array(members) => Ok(members
                .into_iter()
                .map(|member| match member {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()),
            other => Err(Error::Store(format!("ZRANGE returned unexpected payload: {}", other))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let result = self.command(&["EXISTS", key]).await?;
        Ok(as_integer("EXISTS", &result)? > 0)
    }
}
