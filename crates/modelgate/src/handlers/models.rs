use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::llm::Provider;
use crate::response;
use crate::server::AppState;

/// GET /api/{provider}/models
pub async fn list_models(state: AppState, provider: Provider) -> Response {
    info!(%provider, "Model listing requested");

    let Some(client) = state.providers.client(provider) else {
        error!(%provider, "Provider not registered");
        return response::internal_error().into_response();
    };

    let models = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            error!(%provider, error = %e, "Error listing models");
            return response::internal_error().into_response();
        }
    };

    info!(%provider, count = models.len(), "Returning models");
    match serde_json::to_value(models) {
        Ok(data) => response::success(Some(data)).into_response(),
        Err(e) => {
            error!(%provider, error = %e, "Failed to serialize models");
            response::internal_error().into_response()
        }
    }
}
