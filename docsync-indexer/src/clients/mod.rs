//! HTTP implementations of the store and index collaborators.
//!
//! - Sanity query API as the document store
//! - Algolia batch API as the search index

pub mod algolia;
pub mod sanity;

pub use algolia::{AlgoliaClient, AlgoliaConfig, AlgoliaIndex};
pub use sanity::{SanityClient, SanityConfig};

use crate::error::ClientError;

/// Turns a non-success response into [`ClientError::Api`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}
