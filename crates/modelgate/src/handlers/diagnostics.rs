//! Operator-facing diagnostics endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::info;

use crate::llm::Provider;
use crate::response;
use crate::server::AppState;

/// GET /test
///
/// Plain-text liveness check for manual use.
pub async fn smoke_test() -> (StatusCode, &'static str) {
    info!("Test endpoint requested");
    (StatusCode::OK, "Server is working correctly!")
}

/// GET /api/check-keys
pub async fn check_keys(State(state): State<AppState>) -> Response {
    info!("API key check requested");
    let openai = mask_key(state.providers.api_key(Provider::OpenAI));
    let anthropic = mask_key(state.providers.api_key(Provider::Anthropic));

    response::success(Some(json!({
        "openai_key": openai,
        "anthropic_key": anthropic,
    })))
    .into_response()
}

/// Show the first and last five characters of a key.
pub fn mask_key(key: Option<&str>) -> String {
    let Some(key) = key.filter(|k| !k.is_empty()) else {
        return "Not set".to_string();
    };
    let chars: Vec<char> = key.chars().collect();
    let head: String = chars.iter().take(5).collect();
    let tail: String = chars[chars.len().saturating_sub(5)..].iter().collect();
    format!("{head}...{tail}")
}
