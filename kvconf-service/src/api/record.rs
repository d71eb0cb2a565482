//! Record API Handler

use axum::{Json, extract::State};
use kvconf_core::dto::record::Record;

use crate::api::AppState;
use crate::service::record_service;

/// GET /
/// Serve the record assembled from the store
///
/// Always answers 200: store failures degrade field values, not the status.
pub async fn get_record(State(state): State<AppState>) -> Json<Record> {
    let record =
        record_service::load_record(state.store.as_ref(), &state.read_retry, state.app_version)
            .await;

    if record.is_degraded() {
        tracing::debug!("Serving degraded record");
    }

    Json(record)
}
