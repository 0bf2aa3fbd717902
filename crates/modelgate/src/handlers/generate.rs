//! Text generation handler.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::llm::Provider;
use crate::response;
use crate::server::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// A validated generation request body.
///
/// Values are kept as sent. Validation only checks presence; whether a value
/// can be handed to a provider is decided at dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: Value,
    pub prompt: Value,
    pub system_prompt: Value,
}

#[derive(Serialize)]
struct GenerationResponse<'a> {
    response: String,
    model: &'a str,
    provider: Provider,
}

/// Why a generation request body was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no request data provided")]
    EmptyBody,

    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("request body is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// A present field whose value is not text and cannot reach a provider.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("field is not a string: {0}")]
pub struct UnsupportedValue(pub &'static str);

impl GenerationRequest {
    /// Validate a raw request body.
    ///
    /// `model` and `prompt` must be present and non-null. Any other value
    /// passes, including empty strings, `0` and `false`. `system_prompt`
    /// defaults to empty when absent or null.
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::EmptyBody);
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(ValidationError::NotAnObject);
        };

        Ok(Self {
            model: required(&fields, "model")?,
            prompt: required(&fields, "prompt")?,
            system_prompt: match fields.get("system_prompt") {
                None | Some(Value::Null) => Value::String(String::new()),
                Some(value) => value.clone(),
            },
        })
    }

    /// The fields as text, in `(model, prompt, system_prompt)` order.
    pub fn text_fields(&self) -> Result<(&str, &str, &str), UnsupportedValue> {
        Ok((
            as_text(&self.model, "model")?,
            as_text(&self.prompt, "prompt")?,
            as_text(&self.system_prompt, "system_prompt")?,
        ))
    }
}

fn required(fields: &Map<String, Value>, name: &'static str) -> Result<Value, ValidationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(name)),
        Some(value) => Ok(value.clone()),
    }
}

fn as_text<'a>(value: &'a Value, name: &'static str) -> Result<&'a str, UnsupportedValue> {
    value.as_str().ok_or(UnsupportedValue(name))
}

// ============================================================================
// Handler
// ============================================================================

/// POST /api/{provider}/generate
///
/// Request body: `{"model": "...", "prompt": "...", "system_prompt": "..."}`
pub async fn generate(
    state: AppState,
    provider: Provider,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    info!(%provider, "Response generation requested");

    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(%provider, reason = %e, "Failed to read request body");
            return response::bad_request().into_response();
        }
    };

    let request = match GenerationRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(%provider, reason = %e, "Rejecting generation request");
            return response::bad_request().into_response();
        }
    };

    let (model, prompt, system_prompt) = match request.text_fields() {
        Ok(fields) => fields,
        Err(e) => {
            error!(%provider, error = %e, "Cannot dispatch generation request");
            return response::internal_error().into_response();
        }
    };

    let Some(mut client) = state.providers.client(provider) else {
        error!(%provider, "Provider not registered");
        return response::internal_error().into_response();
    };

    info!(%provider, %model, "Generating response");
    if !system_prompt.is_empty() {
        info!("System prompt provided");
    }

    client.set_model(model, None);
    let text = match client.generate_response(prompt, system_prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!(%provider, error = %e, "Error generating response");
            return response::internal_error().into_response();
        }
    };

    let body = GenerationResponse {
        response: text,
        model,
        provider,
    };
    match serde_json::to_value(body) {
        Ok(data) => response::success(Some(data)).into_response(),
        Err(e) => {
            error!(%provider, error = %e, "Failed to serialize response");
            response::internal_error().into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_body() {
        let request = GenerationRequest::from_body(
            br#"{"model": "gpt-4o", "prompt": "Hi", "system_prompt": "Be terse."}"#,
        )
        .unwrap();
        assert_eq!(
            request.text_fields().unwrap(),
            ("gpt-4o", "Hi", "Be terse.")
        );
    }

    #[test]
    fn test_system_prompt_defaults_to_empty() {
        let request = GenerationRequest::from_body(br#"{"model": "m", "prompt": "p"}"#).unwrap();
        assert_eq!(request.system_prompt, json!(""));

        let request =
            GenerationRequest::from_body(br#"{"model": "m", "prompt": "p", "system_prompt": null}"#)
                .unwrap();
        assert_eq!(request.system_prompt, json!(""));
    }

    #[test]
    fn test_empty_strings_pass() {
        let request = GenerationRequest::from_body(br#"{"model": "", "prompt": ""}"#).unwrap();
        assert_eq!(request.text_fields().unwrap(), ("", "", ""));
    }

    #[test]
    fn test_rejections() {
        let cases: [(&[u8], ValidationError); 7] = [
            (b"", ValidationError::EmptyBody),
            (b"  \n", ValidationError::EmptyBody),
            (b"[1, 2]", ValidationError::NotAnObject),
            (b"{}", ValidationError::MissingField("model")),
            (br#"{"prompt": "p"}"#, ValidationError::MissingField("model")),
            (br#"{"model": "m"}"#, ValidationError::MissingField("prompt")),
            (
                br#"{"model": null, "prompt": "p"}"#,
                ValidationError::MissingField("model"),
            ),
        ];
        for (body, expected) in cases {
            assert_eq!(GenerationRequest::from_body(body).unwrap_err(), expected);
        }
        assert!(matches!(
            GenerationRequest::from_body(b"{not json").unwrap_err(),
            ValidationError::InvalidJson(_)
        ));
    }

    #[test]
    fn test_falsy_values_pass_validation() {
        let request = GenerationRequest::from_body(br#"{"model": 0, "prompt": "p"}"#).unwrap();
        assert_eq!(request.model, json!(0));
        assert_eq!(request.text_fields().unwrap_err(), UnsupportedValue("model"));

        let request =
            GenerationRequest::from_body(br#"{"model": "m", "prompt": false}"#).unwrap();
        assert_eq!(request.prompt, json!(false));
        assert_eq!(request.text_fields().unwrap_err(), UnsupportedValue("prompt"));

        let request = GenerationRequest::from_body(
            br#"{"model": "m", "prompt": "p", "system_prompt": ["x"]}"#,
        )
        .unwrap();
        assert_eq!(
            request.text_fields().unwrap_err(),
            UnsupportedValue("system_prompt")
        );
    }
}
