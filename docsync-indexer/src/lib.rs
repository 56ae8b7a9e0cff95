//! Change-driven synchronization from a document store into search indices.
//!
//! A change notification lists ids that were created, updated or deleted.
//! The indexer turns it into the writes that bring every per-type index in
//! line with the store.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Visibility**: decides whether a fetched document belongs in search
//! - **Serializer**: turns a document into an index record
//! - **Reconciler**: computes the save/delete sets for a notification
//! - **Dispatcher**: routes saves by type and broadcasts deletes
//!
//! ## Sync Process
//!
//! 1. **Fetch**: resolve `created ∪ updated` against the store, restricted
//!    to the registered types
//! 2. **Classify**: keep the visible documents
//! 3. **Diff**: requested ids that did not come back visible are hidden
//! 4. **Transform**: visible documents become records
//! 5. **Write**: save records per type, then delete `deleted ∪ hidden` from
//!    every index
//!
//! # Example
//!
//! ```
//! use docsync_indexer::index::mock::MockIndex;
//! use docsync_indexer::{FnSerializer, Indexer, TypeIndexMap};
//! use docsync_types::FieldMap;
//! use std::sync::Arc;
//!
//! let indexes = TypeIndexMap::new()
//!     .with_index("post", MockIndex::shared("posts"))
//!     .with_index("page", MockIndex::shared("pages"));
//! let serializer = FnSerializer::new(|_doc: &docsync_types::Document| FieldMap::new());
//!
//! let indexer = Indexer::builder(indexes, Arc::new(serializer)).build().unwrap();
//! assert_eq!(indexer.types(), vec!["page", "post"]);
//! ```

pub mod clients;
mod dispatcher;
mod error;
pub mod index;
mod indexer;
mod reconciler;
pub mod serializer;
pub mod store;
pub mod visibility;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{ClientError, ClientResult, IndexerError, IndexerResult, WriteOp};
pub use index::{SearchIndex, TypeIndexMap};
pub use indexer::{Indexer, IndexerBuilder, SyncReport};
pub use reconciler::{ChangeSet, Reconciler};
pub use serializer::{
    flatten_blocks, standard_values, FnSerializer, ProjectionSerializer, RecordSerializer,
    RecordTransformer, TypeProjection,
};
pub use store::{DocumentQuery, DocumentStore, DOCUMENTS_BY_IDS_AND_TYPES};
pub use visibility::{AlwaysVisible, FieldFlagVisibility, VisibilityPolicy};

// HTTP collaborators
pub use clients::{AlgoliaClient, AlgoliaConfig, AlgoliaIndex, SanityClient, SanityConfig};
