//! LLM provider trait.

use async_trait::async_trait;

use super::error::LLMError;
use super::types::{GenerateRequest, ModelDescriptor, Provider};

/// Capabilities every provider exposes.
///
/// Implementations hold only a transport handle and credentials, so one
/// instance is shared by all requests.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Which provider this is.
    fn provider(&self) -> Provider;

    /// List the models the provider offers.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError>;

    /// Make a single generation call and return its plain text.
    async fn generate(&self, request: GenerateRequest) -> Result<String, LLMError>;
}
