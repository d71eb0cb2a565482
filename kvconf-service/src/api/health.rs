//! Health Check API Handlers
//!
//! Liveness and store readiness endpoints for monitoring.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /health
/// Liveness check, never touches the store
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /health/store
/// Readiness check, pings the store
pub async fn store_health(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    state.store.ping().await?;

    Ok(Json(serde_json::json!({ "store": "up" })))
}
