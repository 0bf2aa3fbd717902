use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::llm::{Provider, ProviderRegistry};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub providers: ProviderRegistry,
}

/// Build the CORS layer. An empty origin list allows any origin, as does a
/// list where no origin parses.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        warn!("No valid CORS origins configured, allowing any origin");
        return layer.allow_origin(Any);
    }
    layer.allow_origin(allowed)
}

/// Per-provider routes, bound from the fixed provider table.
fn provider_routes() -> Router<AppState> {
    let mut router = Router::new();
    for provider in Provider::ALL {
        router = router
            .route(
                &format!("/api/{provider}/models"),
                get(move |State(state): State<AppState>| {
                    handlers::list_models(state, provider)
                }),
            )
            .route(
                &format!("/api/{provider}/generate"),
                post(
                    move |State(state): State<AppState>,
                          body: Result<Bytes, BytesRejection>| {
                        handlers::generate(state, provider, body)
                    },
                )
                .layer(DefaultBodyLimit::disable()),
            );
    }
    router
}

pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/test", get(handlers::smoke_test))
        .route("/api/check-keys", get(handlers::check_keys))
        .merge(provider_routes())
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}
