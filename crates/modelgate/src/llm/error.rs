//! LLM error types.

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::Provider;

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("failed to decode provider response: {0}")]
    Decode(String),

    /// No credential configured for the provider
    #[error("no api key configured for {0}")]
    MissingApiKey(Provider),

    /// Generation attempted before a model was selected
    #[error("model is not set")]
    ModelNotSet,
}

/// Turn a non-2xx response into `LLMError::Api`.
pub(crate) async fn check_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, LLMError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(LLMError::Api { status, message })
}

/// Read a response body and parse it as JSON.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, LLMError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| LLMError::Decode(e.to_string()))
}
