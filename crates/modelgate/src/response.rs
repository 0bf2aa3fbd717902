//! Uniform JSON envelopes returned by every endpoint.
//!
//! Success bodies look like `{"code": 200, "message": "success", "data": ...}`
//! and error bodies like `{"code": 404, "message": "Not Found", "timestamp": 12.5}`.

use std::sync::LazyLock;
use std::time::Instant;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

const SUCCESS_MESSAGE: &str = "success";

/// Reference point for error timestamps.
static CLOCK_EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Monotonic seconds since the process clock epoch.
///
/// Only meaningful for ordering errors within a single process run.
pub fn monotonic_seconds() -> f64 {
    CLOCK_EPOCH.elapsed().as_secs_f64()
}

// ============================================================================
// Success
// ============================================================================

/// A successful response with an optional payload.
#[derive(Debug, Clone)]
pub struct SuccessEnvelope {
    status: StatusCode,
    data: Option<Value>,
}

#[derive(Serialize)]
struct SuccessBody<'a> {
    code: u16,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
}

impl SuccessEnvelope {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Body and status code pair. `data` is left out of the body when absent.
    pub fn serialize(&self) -> (Value, StatusCode) {
        let body = SuccessBody {
            code: self.status.as_u16(),
            message: SUCCESS_MESSAGE,
            data: self.data.as_ref(),
        };
        let body = serde_json::to_value(body).unwrap_or(Value::Null);
        (body, self.status)
    }
}

impl IntoResponse for SuccessEnvelope {
    fn into_response(self) -> Response {
        let (body, status) = self.serialize();
        (status, Json(body)).into_response()
    }
}

/// 200 OK envelope, optionally carrying `data`.
pub fn success(data: Option<Value>) -> SuccessEnvelope {
    success_with_status(data, StatusCode::OK)
}

pub fn success_with_status(data: Option<Value>, status: StatusCode) -> SuccessEnvelope {
    SuccessEnvelope { status, data }
}

// ============================================================================
// Error
// ============================================================================

/// Client-visible error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    /// Reserved; no handler currently produces it.
    Unauthorized,
    NotFound,
    InternalServerError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::InternalServerError => "Internal Server Error",
        }
    }
}

/// An error response. The timestamp is captured when the envelope is built.
#[derive(Debug, Clone)]
pub struct ErrorEnvelope {
    kind: ErrorKind,
    timestamp: f64,
    details: Option<Value>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: u16,
    message: &'static str,
    timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl ErrorEnvelope {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn serialize(&self) -> (Value, StatusCode) {
        let status = self.kind.status();
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.kind.message(),
            timestamp: self.timestamp,
            details: self.details.as_ref(),
        };
        let body = serde_json::to_value(body).unwrap_or(Value::Null);
        (body, status)
    }
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}: {}",
            self.timestamp,
            self.kind.status().as_u16(),
            self.kind.message()
        )
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        let (body, status) = self.serialize();
        (status, Json(body)).into_response()
    }
}

/// Build an error envelope. Empty details (`null`, `false`, `0`, `""`, `[]`,
/// `{}`) are dropped.
pub fn error(kind: ErrorKind, details: Option<Value>) -> ErrorEnvelope {
    ErrorEnvelope {
        kind,
        timestamp: monotonic_seconds(),
        details: details.filter(|d| !is_empty_detail(d)),
    }
}

fn is_empty_detail(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

pub fn bad_request() -> ErrorEnvelope {
    error(ErrorKind::BadRequest, None)
}

pub fn unauthorized() -> ErrorEnvelope {
    error(ErrorKind::Unauthorized, None)
}

pub fn not_found() -> ErrorEnvelope {
    error(ErrorKind::NotFound, None)
}

pub fn internal_error() -> ErrorEnvelope {
    error(ErrorKind::InternalServerError, None)
}
