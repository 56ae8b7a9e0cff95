//! HTTP surface of the docsync service.
//!
//! The document store posts a change notification to `/webhook` after each
//! mutation; the handler runs one indexer sync and answers with its report.

pub mod config;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use docsync_indexer::{DocumentStore, Indexer, IndexerError, SyncReport};
use docsync_types::ChangeNotification;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a request handler needs.
#[derive(Clone)]
pub struct AppState {
    pub indexer: Indexer,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(indexer: Indexer, store: Arc<dyn DocumentStore>) -> Self {
        Self { indexer, store }
    }
}

/// Error body returned when a sync fails.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

struct SyncFailed(IndexerError);

impl IntoResponse for SyncFailed {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    Json(notification): Json<ChangeNotification>,
) -> Result<Json<SyncReport>, SyncFailed> {
    debug!(
        "Webhook: {} created, {} updated, {} deleted (transaction {:?})",
        notification.ids.created.len(),
        notification.ids.updated.len(),
        notification.ids.deleted.len(),
        notification.transaction_id
    );

    match state
        .indexer
        .webhook_sync(state.store.as_ref(), &notification)
        .await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            warn!("Sync failed: {}", e);
            Err(SyncFailed(e))
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Build the HTTP router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
