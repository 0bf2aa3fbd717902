//! Per-request model selection over a shared provider.

use std::sync::Arc;

use tracing::{error, info};

use super::error::LLMError;
use super::provider::LLMProvider;
use super::types::{GenerateRequest, ModelDescriptor, Provider};

/// A provider handle with its own active model.
///
/// Each request gets a fresh client, so selecting a model never affects
/// another in-flight request on the same provider.
#[derive(Clone)]
pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
    active_model: Option<String>,
    active_model_display_name: Option<String>,
}

impl ProviderClient {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            active_model: None,
            active_model_display_name: None,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider.provider()
    }

    pub fn active_model(&self) -> Option<&str> {
        self.active_model.as_deref()
    }

    pub fn active_model_display_name(&self) -> Option<&str> {
        self.active_model_display_name.as_deref()
    }

    /// Select the model for the next generate call. The id is not validated.
    pub fn set_model(&mut self, id: impl Into<String>, display_name: Option<String>) {
        let id = id.into();
        info!(provider = %self.provider(), model = %id, "Setting active model");
        self.active_model = Some(id);
        self.active_model_display_name = display_name;
    }

    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        info!(provider = %self.provider(), "Listing available models");
        self.provider.list_models().await
    }

    pub async fn generate_response(
        &self,
        prompt: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Result<String, LLMError> {
        let Some(model) = self.active_model.clone() else {
            error!(provider = %self.provider(), "Cannot generate response: model is not set");
            return Err(LLMError::ModelNotSet);
        };

        info!(provider = %self.provider(), model = %model, "Generating response");
        self.provider
            .generate(GenerateRequest {
                model,
                prompt: prompt.into(),
                system_prompt: system_prompt.into(),
            })
            .await
    }
}
