//! Document store abstraction.
//!
//! The store resolves created/updated ids into full documents. Ids and types
//! always travel as bound query parameters, never spliced into query text.

use crate::error::ClientResult;
use async_trait::async_trait;
use docsync_types::{ChangeNotification, Document, DocumentId};
use serde::Serialize;

/// Filter selecting every requested document of a registered type.
pub const DOCUMENTS_BY_IDS_AND_TYPES: &str = "*[(_id in $created + $updated) && _type in $types]";

/// A parameterized fetch: ids from a notification plus the registered types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentQuery {
    pub created: Vec<DocumentId>,
    pub updated: Vec<DocumentId>,
    pub types: Vec<String>,
}

impl DocumentQuery {
    /// Builds the fetch for a notification's created and updated ids.
    pub fn for_notification(notification: &ChangeNotification, types: Vec<String>) -> Self {
        Self {
            created: notification.ids.created.clone(),
            updated: notification.ids.updated.clone(),
            types,
        }
    }

    /// Query text. Only references the bound parameters.
    pub fn query(&self) -> &'static str {
        DOCUMENTS_BY_IDS_AND_TYPES
    }

    /// Bound parameters: `$created`, `$updated`, `$types`.
    pub fn params(&self) -> serde_json::Value {
        serde_json::json!({
            "created": self.created,
            "updated": self.updated,
            "types": self.types,
        })
    }

    /// Whether a document satisfies this query.
    pub fn matches(&self, document: &Document) -> bool {
        self.types.iter().any(|t| *t == document.doc_type)
            && (self.created.contains(&document.id) || self.updated.contains(&document.id))
    }
}

/// Source of truth for document content.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the documents matching `query`. Ids that no longer exist or
    /// whose type is not in `query.types` are silently omitted.
    async fn fetch(&self, query: &DocumentQuery) -> ClientResult<Vec<Document>>;
}

/// An in-memory store for testing.
pub mod mock {
    use super::*;
    use crate::error::ClientError;
    use std::sync::{Mutex, PoisonError};

    /// Holds documents in memory and records every query it answers.
    #[derive(Debug, Default)]
    pub struct MockDocumentStore {
        documents: Mutex<Vec<Document>>,
        queries: Mutex<Vec<DocumentQuery>>,
        failure: Mutex<Option<String>>,
    }

    impl MockDocumentStore {
        /// Creates an empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a store holding `documents`.
        pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
            let store = Self::new();
            for doc in documents {
                store.insert(doc);
            }
            store
        }

        /// Inserts or replaces a document by id.
        pub fn insert(&self, document: Document) {
            let mut docs = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
            docs.retain(|d| d.id != document.id);
            docs.push(document);
        }

        /// Removes a document, as if it were deleted out-of-band.
        pub fn remove(&self, id: &str) {
            self.documents
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|d| d.id.as_str() != id);
        }

        /// Makes every subsequent fetch fail with `message` (or succeed again
        /// with `None`).
        pub fn set_failure(&self, message: Option<&str>) {
            *self.failure.lock().unwrap_or_else(PoisonError::into_inner) =
                message.map(str::to_string);
        }

        /// Every query answered so far, oldest first.
        pub fn queries(&self) -> Vec<DocumentQuery> {
            self.queries.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Number of fetch calls received.
        pub fn fetch_count(&self) -> usize {
            self.queries.lock().unwrap_or_else(PoisonError::into_inner).len()
        }
    }

    #[async_trait]
    impl DocumentStore for MockDocumentStore {
        async fn fetch(&self, query: &DocumentQuery) -> ClientResult<Vec<Document>> {
            self.queries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(query.clone());

            if let Some(message) = self.failure.lock().unwrap_or_else(PoisonError::into_inner).clone() {
                return Err(ClientError::Network(message));
            }

            Ok(self
                .documents
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|doc| query.matches(doc))
                .cloned()
                .collect())
        }
    }
}
