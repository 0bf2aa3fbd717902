use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::info;

use crate::response;

/// GET /health
pub async fn health() -> Response {
    info!("Health check requested");
    response::success(Some(json!({"status": "OK"}))).into_response()
}
