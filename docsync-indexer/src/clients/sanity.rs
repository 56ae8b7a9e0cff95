//! Sanity document store.
//!
//! Runs GROQ queries against the HTTP query API, passing ids and types as
//! bound parameters.

use super::check_status;
use crate::error::{ClientError, ClientResult};
use crate::store::{DocumentQuery, DocumentStore};
use async_trait::async_trait;
use docsync_types::Document;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Sanity connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    /// Project id (the subdomain of the API host).
    pub project_id: String,
    /// Dataset name, e.g. `production`.
    pub dataset: String,
    /// API version date, without the leading `v`.
    pub api_version: String,
    /// Read token. Required for private datasets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Query the CDN host instead of the live API.
    pub use_cdn: bool,
    /// Overrides the API host (tests, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2021-03-25".to_string(),
            token: None,
            use_cdn: false,
            api_base_url: None,
            timeout_secs: 30,
        }
    }
}

impl SanityConfig {
    /// API host, derived from the project id unless overridden.
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.api_base_url {
            return url.trim_end_matches('/').to_string();
        }
        let host = if self.use_cdn { "apicdn" } else { "api" };
        format!("https://{}.{host}.sanity.io", self.project_id)
    }

    /// Full query endpoint for the configured dataset.
    pub fn query_url(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.base_url(),
            self.api_version,
            urlencoding::encode(&self.dataset)
        )
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: Vec<serde_json::Value>,
}

/// Sanity HTTP client.
#[derive(Debug, Clone)]
pub struct SanityClient {
    config: SanityConfig,
    client: Client,
}

impl SanityClient {
    /// Creates a client. Fails when neither a project id nor an API base URL
    /// is configured.
    pub fn new(config: SanityConfig) -> ClientResult<Self> {
        if config.project_id.is_empty() && config.api_base_url.is_none() {
            return Err(ClientError::Config("sanity project_id is required".to_string()));
        }
        if config.dataset.is_empty() {
            return Err(ClientError::Config("sanity dataset is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// The client's settings.
    pub fn config(&self) -> &SanityConfig {
        &self.config
    }

    /// Runs an arbitrary query with bound `params`, returning the raw result.
    pub async fn query(
        &self,
        query: &str,
        params: serde_json::Value,
    ) -> ClientResult<Vec<serde_json::Value>> {
        let mut request = self
            .client
            .post(self.config.query_url())
            .json(&QueryRequest { query, params });
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("sanity query failed: {e}")))?;
        let response = check_status(response).await?;

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Codec(format!("failed to parse query response: {e}")))?;
        Ok(body.result)
    }
}

#[async_trait]
impl DocumentStore for SanityClient {
    async fn fetch(&self, query: &DocumentQuery) -> ClientResult<Vec<Document>> {
        let raw = self.query(query.query(), query.params()).await?;
        debug!("Sanity returned {} documents", raw.len());

        raw.into_iter()
            .map(|value| {
                Document::from_value(value)
                    .map_err(|e| ClientError::Codec(format!("unexpected document shape: {e}")))
            })
            .collect()
    }
}
