//! Search index abstraction and the per-type index table.

use crate::error::ClientResult;
use async_trait::async_trait;
use docsync_types::{DocumentId, IndexRecord};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Handle to one destination index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Index name, used in logs and error reports.
    fn name(&self) -> &str;

    /// Creates or replaces each record by id.
    async fn save_objects(&self, records: &[IndexRecord]) -> ClientResult<()>;

    /// Removes records by id. Absent ids are not an error.
    async fn delete_objects(&self, ids: &[DocumentId]) -> ClientResult<()>;
}

/// Fixed mapping from document type to destination index.
///
/// Built once at startup and read-only afterwards; its keys are the complete
/// set of types the indexer is responsible for.
#[derive(Clone, Default)]
pub struct TypeIndexMap {
    indexes: BTreeMap<String, Arc<dyn SearchIndex>>,
}

impl TypeIndexMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `index` for `doc_type`, replacing any previous entry.
    #[must_use]
    pub fn with_index(mut self, doc_type: impl Into<String>, index: Arc<dyn SearchIndex>) -> Self {
        self.indexes.insert(doc_type.into(), index);
        self
    }

    /// The index registered for `doc_type`.
    pub fn get(&self, doc_type: &str) -> Option<&Arc<dyn SearchIndex>> {
        self.indexes.get(doc_type)
    }

    /// Whether `doc_type` is registered.
    pub fn contains_type(&self, doc_type: &str) -> bool {
        self.indexes.contains_key(doc_type)
    }

    /// Registered types, sorted.
    pub fn types(&self) -> Vec<String> {
        self.indexes.keys().cloned().collect()
    }

    /// Iterates `(type, index)` pairs in type order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn SearchIndex>)> {
        self.indexes.iter().map(|(t, i)| (t.as_str(), i))
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl FromIterator<(String, Arc<dyn SearchIndex>)> for TypeIndexMap {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn SearchIndex>)>>(iter: I) -> Self {
        Self {
            indexes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for TypeIndexMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.indexes.iter().map(|(t, i)| (t, i.name())))
            .finish()
    }
}

/// An in-memory index for testing.
pub mod mock {
    use super::*;
    use crate::error::ClientError;
    use std::sync::{Mutex, PoisonError};

    /// Applies writes to an in-memory object map and records every call.
    #[derive(Debug, Default)]
    pub struct MockIndex {
        name: String,
        objects: Mutex<BTreeMap<DocumentId, IndexRecord>>,
        save_calls: Mutex<Vec<Vec<IndexRecord>>>,
        delete_calls: Mutex<Vec<Vec<DocumentId>>>,
        fail_saves: Mutex<Option<String>>,
        fail_deletes: Mutex<Option<String>>,
    }

    impl MockIndex {
        /// Creates an empty index called `name`.
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                ..Default::default()
            }
        }

        /// Convenience for building a [`TypeIndexMap`] entry.
        pub fn shared(name: impl Into<String>) -> Arc<Self> {
            Arc::new(Self::new(name))
        }

        /// Makes every subsequent save fail (or succeed again with `None`).
        pub fn fail_saves(&self, message: Option<&str>) {
            *self.fail_saves.lock().unwrap_or_else(PoisonError::into_inner) =
                message.map(str::to_string);
        }

        /// Makes every subsequent delete fail (or succeed again with `None`).
        pub fn fail_deletes(&self, message: Option<&str>) {
            *self.fail_deletes.lock().unwrap_or_else(PoisonError::into_inner) =
                message.map(str::to_string);
        }

        /// Records passed to each save call, oldest first.
        pub fn save_calls(&self) -> Vec<Vec<IndexRecord>> {
            self.save_calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Ids passed to each delete call, oldest first.
        pub fn delete_calls(&self) -> Vec<Vec<DocumentId>> {
            self.delete_calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Current contents of the index.
        pub fn objects(&self) -> BTreeMap<DocumentId, IndexRecord> {
            self.objects.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Looks up a stored record.
        pub fn object(&self, id: &str) -> Option<IndexRecord> {
            self.objects
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(id)
                .cloned()
        }
    }

    #[async_trait]
    impl SearchIndex for MockIndex {
        fn name(&self) -> &str {
            &self.name
        }

        async fn save_objects(&self, records: &[IndexRecord]) -> ClientResult<()> {
            self.save_calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(records.to_vec());

            if let Some(message) = self.fail_saves.lock().unwrap_or_else(PoisonError::into_inner).clone() {
                return Err(ClientError::Api { status: 500, body: message });
            }

            let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
            for record in records {
                objects.insert(record.id.clone(), record.clone());
            }
            Ok(())
        }

        async fn delete_objects(&self, ids: &[DocumentId]) -> ClientResult<()> {
            self.delete_calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(ids.to_vec());

            if let Some(message) = self.fail_deletes.lock().unwrap_or_else(PoisonError::into_inner).clone() {
                return Err(ClientError::Api { status: 500, body: message });
            }

            let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
            for id in ids {
                objects.remove(id);
            }
            Ok(())
        }
    }
}
