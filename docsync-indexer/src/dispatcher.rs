//! Index dispatch - applies a [`ChangeSet`] to the per-type indices.
//!
//! Saves are routed by record type, one batch per non-empty type. Deletes are
//! broadcast to every index because nothing tracks which index an id lives
//! in. Saves all finish before any delete is issued.

use crate::error::{IndexerError, IndexerResult, WriteOp};
use crate::index::{SearchIndex, TypeIndexMap};
use crate::reconciler::ChangeSet;
use docsync_types::IndexRecord;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// What a dispatch wrote, keyed by index name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Records saved per index. Indices without records are absent.
    pub saved: BTreeMap<String, usize>,
    /// Indices that received the delete batch.
    pub deleted_from: Vec<String>,
    /// Size of the delete batch sent to each index.
    pub deleted_ids: usize,
}

/// Routes change sets to the indices of a [`TypeIndexMap`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    indexes: Arc<TypeIndexMap>,
}

impl Dispatcher {
    pub fn new(indexes: Arc<TypeIndexMap>) -> Self {
        Self { indexes }
    }

    /// Applies `changes`.
    ///
    /// Every call of a phase runs to completion; the first failure is then
    /// returned. A failed save phase skips the delete phase. Writes that
    /// succeeded are not undone.
    pub async fn dispatch(&self, changes: &ChangeSet) -> IndexerResult<DispatchReport> {
        let mut report = DispatchReport::default();

        for (index, count) in self.save_all(&changes.to_save).await? {
            *report.saved.entry(index).or_default() += count;
        }

        if !changes.to_delete.is_empty() {
            report.deleted_from = self.delete_all(changes).await?;
            report.deleted_ids = changes.to_delete.len();
        }

        Ok(report)
    }

    async fn save_all(&self, records: &[IndexRecord]) -> IndexerResult<Vec<(String, usize)>> {
        let mut batches: BTreeMap<&str, Vec<IndexRecord>> = BTreeMap::new();
        for record in records {
            if self.indexes.contains_type(&record.record_type) {
                batches.entry(record.record_type.as_str()).or_default().push(record.clone());
            } else {
                debug!("No index for type {}, skipping {}", record.record_type, record.id);
            }
        }

        let calls = batches.into_iter().filter_map(|(doc_type, batch)| {
            let index = Arc::clone(self.indexes.get(doc_type)?);
            Some(async move {
                debug!("Saving {} records to {}", batch.len(), index.name());
                index
                    .save_objects(&batch)
                    .await
                    .map(|()| (index.name().to_string(), batch.len()))
                    .map_err(|source| write_error(index.as_ref(), WriteOp::Save, source))
            })
        });

        first_error(join_all(calls).await)
    }

    async fn delete_all(&self, changes: &ChangeSet) -> IndexerResult<Vec<String>> {
        let ids = &changes.to_delete;
        let calls = self.indexes.iter().map(|(_, index)| async move {
            debug!("Deleting {} ids from {}", ids.len(), index.name());
            index
                .delete_objects(ids)
                .await
                .map(|()| index.name().to_string())
                .map_err(|source| write_error(index.as_ref(), WriteOp::Delete, source))
        });

        first_error(join_all(calls).await)
    }
}

fn write_error(
    index: &dyn SearchIndex,
    op: WriteOp,
    source: crate::error::ClientError,
) -> IndexerError {
    IndexerError::IndexWrite {
        index: index.name().to_string(),
        op,
        source,
    }
}

fn first_error<T>(results: Vec<IndexerResult<T>>) -> IndexerResult<Vec<T>> {
    results.into_iter().collect()
}
