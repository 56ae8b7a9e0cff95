//! Algolia search index.
//!
//! Writes go through the batch endpoint: `updateObject` to upsert a record
//! and `deleteObject` to remove one. Large writes are split into chunks of
//! `batch_size` operations.

use super::check_status;
use crate::error::{ClientError, ClientResult};
use crate::index::SearchIndex;
use async_trait::async_trait;
use docsync_types::{DocumentId, IndexRecord};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Algolia credentials and transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgoliaConfig {
    /// Application id.
    pub app_id: String,
    /// Admin or write API key.
    pub api_key: String,
    /// Overrides the API host (tests, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Maximum operations per batch request.
    pub batch_size: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AlgoliaConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            api_key: String::new(),
            api_base_url: None,
            batch_size: 1000,
            timeout_secs: 30,
        }
    }
}

impl AlgoliaConfig {
    /// API host, derived from the application id unless overridden.
    pub fn base_url(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.algolia.net", self.app_id),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchRequest {
    requests: Vec<BatchOperation>,
}

#[derive(Debug, Serialize)]
struct BatchOperation {
    action: &'static str,
    body: serde_json::Value,
}

/// Shared Algolia connection. Hand out one [`AlgoliaIndex`] per index name.
#[derive(Debug, Clone)]
pub struct AlgoliaClient {
    config: Arc<AlgoliaConfig>,
    client: Client,
}

impl AlgoliaClient {
    /// Creates a client. Fails on missing credentials or a zero batch size.
    pub fn new(config: AlgoliaConfig) -> ClientResult<Self> {
        if config.app_id.is_empty() || config.api_key.is_empty() {
            return Err(ClientError::Config(
                "algolia app_id and api_key are required".to_string(),
            ));
        }
        if config.batch_size == 0 {
            return Err(ClientError::Config("algolia batch_size must be positive".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Returns a handle to the index called `name`.
    pub fn init_index(&self, name: impl Into<String>) -> AlgoliaIndex {
        AlgoliaIndex {
            client: self.clone(),
            name: name.into(),
        }
    }

    async fn batch(&self, index: &str, operations: Vec<BatchOperation>) -> ClientResult<()> {
        let url = format!(
            "{}/1/indexes/{}/batch",
            self.config.base_url(),
            urlencoding::encode(index)
        );

        let mut operations = operations.into_iter().peekable();
        while operations.peek().is_some() {
            let chunk: Vec<BatchOperation> = operations.by_ref().take(self.config.batch_size).collect();
            debug!("Sending {} operations to Algolia index {}", chunk.len(), index);

            let response = self
                .client
                .post(&url)
                .header("X-Algolia-Application-Id", &self.config.app_id)
                .header("X-Algolia-API-Key", &self.config.api_key)
                .json(&BatchRequest { requests: chunk })
                .send()
                .await
                .map_err(|e| ClientError::Network(format!("algolia batch failed: {e}")))?;
            check_status(response).await?;
        }
        Ok(())
    }
}

/// One Algolia index.
#[derive(Debug, Clone)]
pub struct AlgoliaIndex {
    client: AlgoliaClient,
    name: String,
}

#[async_trait]
impl SearchIndex for AlgoliaIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn save_objects(&self, records: &[IndexRecord]) -> ClientResult<()> {
        let operations = records
            .iter()
            .map(|record| {
                serde_json::to_value(record)
                    .map(|body| BatchOperation {
                        action: "updateObject",
                        body,
                    })
                    .map_err(|e| ClientError::Codec(format!("failed to encode {}: {e}", record.id)))
            })
            .collect::<ClientResult<Vec<_>>>()?;

        self.client.batch(&self.name, operations).await
    }

    async fn delete_objects(&self, ids: &[DocumentId]) -> ClientResult<()> {
        let operations = ids
            .iter()
            .map(|id| BatchOperation {
                action: "deleteObject",
                body: serde_json::json!({ "objectID": id }),
            })
            .collect();

        self.client.batch(&self.name, operations).await
    }
}
