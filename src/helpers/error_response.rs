use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;
use crate::models::error::ModelError;

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong on our side, please try again later";

/// Logs the failure and renders it as `{ "error": .. }` under its status annotation.
/// Server-side details stay in the log.
pub fn error_response(action: &str, error: ModelError) -> Response {
    let status = error.status();
    let message = if status.is_server_error() {
        warn!("Something went wrong {} due to: {:?}", action, error);
        INTERNAL_ERROR_MESSAGE.to_string()
    } else {
        warn!("Rejected request {}: {}", action, error);
        error.to_string()
    };

    (status, Json(json!({ "error": message }))).into_response()
}
