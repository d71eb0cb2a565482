//! API Error Handling
//!
//! Error responses for the operational endpoints. The record endpoint never
//! produces an error response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kvconf_client::StoreError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    StoreUnavailable(StoreError),
    StoreError(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::StoreUnavailable(err) => {
                tracing::warn!("Store unavailable: {}", err);
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            ApiError::StoreError(err) => {
                tracing::error!("Store error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_connection() {
            ApiError::StoreUnavailable(err)
        } else {
            ApiError::StoreError(err)
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
