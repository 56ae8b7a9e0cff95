//! The indexer - one entry point bundling the type table, serializer and
//! visibility policy.

use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::error::{IndexerError, IndexerResult};
use crate::index::TypeIndexMap;
use crate::reconciler::{ChangeSet, Reconciler};
use crate::serializer::{RecordSerializer, RecordTransformer};
use crate::store::DocumentStore;
use crate::visibility::{AlwaysVisible, VisibilityPolicy};
use docsync_types::{ChangeNotification, Document, IndexRecord};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one [`Indexer::webhook_sync`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records written across all indices.
    pub saved: usize,
    /// Ids swept from every index.
    pub deleted: usize,
    /// Per-index detail.
    pub dispatch: DispatchReport,
}

/// Builder for [`Indexer`].
pub struct IndexerBuilder {
    indexes: TypeIndexMap,
    serializer: Arc<dyn RecordSerializer>,
    visibility: Option<Arc<dyn VisibilityPolicy>>,
}

impl IndexerBuilder {
    /// Sets the visibility policy. Without one every document is visible.
    #[must_use]
    pub fn visibility(mut self, policy: Arc<dyn VisibilityPolicy>) -> Self {
        self.visibility = Some(policy);
        self
    }

    /// Validates the parts and builds the indexer.
    ///
    /// Fails when no type is registered or when the serializer does not
    /// handle one of the registered types.
    pub fn build(self) -> IndexerResult<Indexer> {
        if self.indexes.is_empty() {
            return Err(IndexerError::Config("no document types registered".to_string()));
        }
        if let Some(missing) = self
            .indexes
            .types()
            .into_iter()
            .find(|t| !self.serializer.handles(t))
        {
            return Err(IndexerError::Config(format!(
                "serializer does not handle type `{missing}`"
            )));
        }

        let indexes = Arc::new(self.indexes);
        let transformer = RecordTransformer::new(self.serializer);
        let visibility = self.visibility.unwrap_or_else(|| Arc::new(AlwaysVisible));
        debug!("Indexer built for types {:?}", indexes.types());

        Ok(Indexer {
            reconciler: Reconciler::new(indexes.types(), visibility, transformer.clone()),
            dispatcher: Dispatcher::new(Arc::clone(&indexes)),
            transformer,
            indexes,
        })
    }
}

/// Synchronizes store documents into per-type search indices.
///
/// Cheap to clone; clones share the same index handles.
#[derive(Clone)]
pub struct Indexer {
    indexes: Arc<TypeIndexMap>,
    transformer: RecordTransformer,
    reconciler: Reconciler,
    dispatcher: Dispatcher,
}

impl Indexer {
    /// Starts building an indexer over `indexes` using `serializer`.
    pub fn builder(indexes: TypeIndexMap, serializer: Arc<dyn RecordSerializer>) -> IndexerBuilder {
        IndexerBuilder {
            indexes,
            serializer,
            visibility: None,
        }
    }

    /// The type table.
    pub fn indexes(&self) -> &TypeIndexMap {
        &self.indexes
    }

    /// Registered document types.
    pub fn types(&self) -> Vec<String> {
        self.indexes.types()
    }

    /// Converts documents to records without touching any index.
    pub fn transform(&self, documents: &[Document]) -> IndexerResult<Vec<IndexRecord>> {
        self.transformer.transform(documents)
    }

    /// Computes the writes for `notification` without applying them.
    pub async fn reconcile(
        &self,
        store: &dyn DocumentStore,
        notification: &ChangeNotification,
    ) -> IndexerResult<ChangeSet> {
        self.reconciler.reconcile(store, notification).await
    }

    /// Applies precomputed writes.
    pub async fn dispatch(&self, changes: &ChangeSet) -> IndexerResult<DispatchReport> {
        self.dispatcher.dispatch(changes).await
    }

    /// Runs one synchronization for `notification`: fetch, classify,
    /// transform, then save and delete.
    pub async fn webhook_sync(
        &self,
        store: &dyn DocumentStore,
        notification: &ChangeNotification,
    ) -> IndexerResult<SyncReport> {
        let changes = self.reconcile(store, notification).await?;
        let dispatch = self.dispatch(&changes).await?;

        info!(
            "Synced notification: {} saved, {} deleted across {} indices",
            changes.to_save.len(),
            changes.to_delete.len(),
            self.indexes.len()
        );

        Ok(SyncReport {
            saved: changes.to_save.len(),
            deleted: changes.to_delete.len(),
            dispatch,
        })
    }
}
