use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

pub fn router() -> Router {
    Router::new().route("/health", get(get_health_check))
}

/// Liveness check, does not touch the database
async fn get_health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": "lunchly" })))
}
