/// Nested per-user device CRUD handlers.
pub mod devices;
/// Health and readiness probe handlers.
pub mod health;
/// Prometheus metrics exposition handler.
pub mod metrics;
/// Map tile and region catalog handlers.
pub mod places;
/// Queue send/receive/history handlers.
pub mod queue;
/// Search query and document management handlers.
pub mod search;
/// Object upload, metadata and listing handlers.
pub mod upload;
/// User CRUD handlers.
pub mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::StratusError;

/// Wrapper that converts `StratusError` into an HTTP response.
pub struct ApiError(pub StratusError);

/// Converts a `StratusError` into an `ApiError`.
impl From<StratusError> for ApiError {
    fn from(e: StratusError) -> Self {
        ApiError(e)
    }
}

/// Maps `ApiError` to an HTTP response with a JSON body and appropriate status code.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status_code.is_server_error() {
            tracing::error!(error = %self.0, status, "server error");
        } else if status_code.is_client_error() {
            tracing::warn!(error = %self.0, status, "client error");
        }
        let body = json!({
            "error": self.0.to_string(),
            "status": status,
        });
        (status_code, axum::Json(body)).into_response()
    }
}
