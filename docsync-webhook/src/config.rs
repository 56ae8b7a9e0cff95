//! Service configuration, read from a JSON file.
//!
//! ```json
//! {
//!   "sanity": { "project_id": "abc123", "dataset": "production" },
//!   "algolia": { "app_id": "APP" },
//!   "indexes": { "post": "posts", "page": "pages" },
//!   "projections": {
//!     "post": { "fields": ["title", "slug"], "blocks": ["body"] },
//!     "page": { "fields": ["title"] }
//!   },
//!   "visibility": { "pointer": "/isHidden", "visible_when": false }
//! }
//! ```
//!
//! Secrets (`sanity.token`, `algolia.api_key`) may be left out of the file
//! and supplied on the command line or through the environment instead.

use crate::AppState;
use anyhow::{Context, Result, bail};
use docsync_indexer::{
    AlgoliaClient, AlgoliaConfig, FieldFlagVisibility, Indexer, ProjectionSerializer,
    SanityClient, SanityConfig, SearchIndex, TypeIndexMap, TypeProjection,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub sanity: SanityConfig,
    pub algolia: AlgoliaConfig,
    /// Document type -> index name.
    pub indexes: BTreeMap<String, String>,
    /// Document type -> fields copied into its records.
    pub projections: BTreeMap<String, TypeProjection>,
    /// Without a policy every fetched document is indexed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<FieldFlagVisibility>,
}

impl ServiceConfig {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parses a config document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        if config.indexes.is_empty() {
            bail!("at least one entry in `indexes` is required");
        }
        Ok(config)
    }

    /// The serializer described by `projections`.
    pub fn serializer(&self) -> ProjectionSerializer {
        ProjectionSerializer::new(self.projections.clone())
    }
}

/// Wires the Sanity store, the Algolia indices and the indexer together.
pub fn build_state(config: ServiceConfig) -> Result<AppState> {
    let store = SanityClient::new(config.sanity.clone()).context("Invalid sanity settings")?;
    let algolia = AlgoliaClient::new(config.algolia.clone()).context("Invalid algolia settings")?;

    let indexes: TypeIndexMap = config
        .indexes
        .iter()
        .map(|(doc_type, name)| {
            let index: Arc<dyn SearchIndex> = Arc::new(algolia.init_index(name));
            (doc_type.clone(), index)
        })
        .collect();

    let mut builder = Indexer::builder(indexes, Arc::new(config.serializer()));
    if let Some(policy) = config.visibility {
        builder = builder.visibility(Arc::new(policy));
    }
    let indexer = builder.build().context("Invalid indexer settings")?;

    Ok(AppState::new(indexer, Arc::new(store)))
}
