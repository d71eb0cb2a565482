//! API Module
//!
//! HTTP API layer for the config service.

pub mod error;
pub mod health;
pub mod record;

use axum::{Router, routing::get};
use kvconf_client::{KvStore, RetryPolicy};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Store client, shared by every in-flight request
    pub store: Arc<dyn KvStore>,
    /// Retry policy for each key read
    pub read_retry: RetryPolicy,
    /// Version reported in every record
    pub app_version: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        read_retry: RetryPolicy,
        app_version: Option<String>,
    ) -> Self {
        Self {
            store,
            read_retry,
            app_version,
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(record::get_record))
        // Health checks
        .route("/health", get(health::health_check))
        .route("/health/store", get(health::store_health))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
