//! Core type definitions for docsync.
//!
//! This crate defines the transient values that flow through one
//! synchronization run:
//! - Document identifiers and fetched documents (store side)
//! - Index records (search-index side)
//! - Change notifications (the inbound webhook body)
//!
//! Nothing here is persisted; every value lives for the duration of a
//! single run.

mod document;
mod ids;
mod notification;
mod record;

pub use document::{Document, DocumentRef, FieldMap};
pub use ids::DocumentId;
pub use notification::{ChangeIds, ChangeNotification};
pub use record::{IndexRecord, OBJECT_ID_KEY, TYPE_KEY};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
