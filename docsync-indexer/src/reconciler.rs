//! Change set reconciliation - turns a notification into save/delete sets.
//!
//! The notification only says which ids changed. The reconciler resolves
//! `created ∪ updated` against the store, keeps what is visible, and treats
//! every requested id that did not come back visible as something to remove.
//! That covers documents deleted out-of-band, unpublished documents, and
//! documents whose visibility flag flipped off since they were indexed.

use crate::error::{IndexerError, IndexerResult};
use crate::serializer::RecordTransformer;
use crate::store::{DocumentQuery, DocumentStore};
use crate::visibility::VisibilityPolicy;
use docsync_types::{ChangeNotification, Document, DocumentId, IndexRecord};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// The writes one notification resolves to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Records to upsert, in fetch order.
    pub to_save: Vec<IndexRecord>,
    /// Ids to remove from every index: explicit deletes first, then hidden
    /// ids, without duplicates.
    pub to_delete: Vec<DocumentId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.to_save.is_empty() && self.to_delete.is_empty()
    }
}

/// Computes [`ChangeSet`]s for the registered types.
#[derive(Clone)]
pub struct Reconciler {
    types: Vec<String>,
    visibility: Arc<dyn VisibilityPolicy>,
    transformer: RecordTransformer,
}

impl Reconciler {
    pub fn new(
        types: Vec<String>,
        visibility: Arc<dyn VisibilityPolicy>,
        transformer: RecordTransformer,
    ) -> Self {
        Self {
            types,
            visibility,
            transformer,
        }
    }

    /// Types the store query is restricted to.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Resolves `notification` against `store`.
    ///
    /// An id listed as deleted is never saved, even when it was also listed
    /// as created or updated and came back visible.
    pub async fn reconcile(
        &self,
        store: &dyn DocumentStore,
        notification: &ChangeNotification,
    ) -> IndexerResult<ChangeSet> {
        let requested = notification.requested_ids();
        let fetched = if requested.is_empty() {
            Vec::new()
        } else {
            let query = DocumentQuery::for_notification(notification, self.types.clone());
            store.fetch(&query).await.map_err(IndexerError::Fetch)?
        };
        debug!(
            "Fetched {} of {} requested documents",
            fetched.len(),
            requested.len()
        );

        let requested_set: HashSet<&str> = requested.iter().map(DocumentId::as_str).collect();
        let mut visible = Vec::with_capacity(fetched.len());
        for doc in fetched {
            // Only requested ids of registered types may reach an index.
            if !requested_set.contains(doc.id.as_str()) || !self.types.contains(&doc.doc_type) {
                debug!("Ignoring unrequested document {} (type={})", doc.id, doc.doc_type);
                continue;
            }
            if self.classify(&doc)? {
                visible.push(doc);
            }
        }

        let visible_ids: HashSet<&str> = visible.iter().map(|d| d.id.as_str()).collect();
        let hidden = requested
            .iter()
            .filter(|id| !visible_ids.contains(id.as_str()))
            .cloned();

        let mut seen = HashSet::new();
        let to_delete: Vec<DocumentId> = notification
            .ids
            .deleted
            .iter()
            .cloned()
            .chain(hidden)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let deleted: HashSet<&str> = notification.ids.deleted.iter().map(DocumentId::as_str).collect();
        visible.retain(|doc| !deleted.contains(doc.id.as_str()));

        let to_save = self.transformer.transform(&visible)?;
        debug!(
            "Reconciled: {} to save, {} to delete",
            to_save.len(),
            to_delete.len()
        );

        Ok(ChangeSet { to_save, to_delete })
    }

    fn classify(&self, document: &Document) -> IndexerResult<bool> {
        self.visibility
            .is_visible(document)
            .map_err(|reason| IndexerError::Classifier {
                id: document.id.clone(),
                reason,
            })
    }
}
