//! Handlers for requests no route claims and for handler panics.

use std::any::Any;

use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::response;

/// Fallback for unmatched paths and methods.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    warn!(%method, path = %uri.path(), "Not found");
    response::not_found().into_response()
}

/// Converts a handler panic into an error envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    error!(detail, "Server error");
    response::internal_error().into_response()
}
