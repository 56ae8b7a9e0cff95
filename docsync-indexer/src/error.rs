//! Error types for the indexer.

use docsync_types::DocumentId;
use std::fmt;
use thiserror::Error;

/// Result type for a synchronization run.
pub type IndexerResult<T> = Result<T, IndexerError>;

/// Result type for store and index client calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Which index write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Save,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Save => f.write_str("save"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// Errors raised by the store and index collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The remote API answered with a non-success status.
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// A request or response body could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The client was constructed with unusable settings.
    #[error("client configuration error: {0}")]
    Config(String),
}

/// Errors that fail a synchronization run.
///
/// Every variant is fatal to the run that raised it. Writes already issued
/// to other indices are not rolled back.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// The document store query failed. Nothing was written.
    #[error("document fetch failed: {0}")]
    Fetch(#[source] ClientError),

    /// The visibility policy rejected a document with an error.
    #[error("visibility check failed for {id}: {reason}")]
    Classifier { id: DocumentId, reason: String },

    /// The serializer could not produce fields for a document.
    #[error("serialization failed for {id} (type={doc_type}): {reason}")]
    Serialization {
        id: DocumentId,
        doc_type: String,
        reason: String,
    },

    /// A save or delete call against one index failed.
    #[error("{op} on index {index} failed: {source}")]
    IndexWrite {
        index: String,
        op: WriteOp,
        #[source]
        source: ClientError,
    },

    /// The indexer was assembled from inconsistent parts.
    #[error("configuration error: {0}")]
    Config(String),
}
