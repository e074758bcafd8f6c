//! JSON HTTP API hosting the sync pipelines.

pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::sync::SyncService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: SyncService,
}

/// Build the API router.
pub fn router(service: SyncService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/sheets/import", post(handlers::import))
        .route("/api/sheets/export", post(handlers::export))
        .route("/api/sheets/preview", post(handlers::preview))
        .with_state(state)
}
