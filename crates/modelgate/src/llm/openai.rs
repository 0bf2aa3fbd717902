//! OpenAI provider over the Responses API.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::error::{LLMError, check_response, decode_json};
use super::provider::LLMProvider;
use super::types::{GenerateRequest, ModelDescriptor, Provider};

/// OpenAI provider.
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAIProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, LLMError> {
        self.api_key
            .as_deref()
            .ok_or(LLMError::MissingApiKey(Provider::OpenAI))
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key()?)
            .send()
            .await?;
        let response = check_response(response).await?;

        let list: ModelList = decode_json(response).await?;
        let models: Vec<ModelDescriptor> = list
            .data
            .into_iter()
            .map(|m| ModelDescriptor {
                name: m.id.clone(),
                id: m.id,
                provider: Provider::OpenAI,
            })
            .collect();

        info!(count = models.len(), "Retrieved models from OpenAI");
        Ok(models)
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, LLMError> {
        let url = format!("{}/responses", self.base_url);
        let body = to_request(&request);
        if body.instructions.is_some() {
            debug!("Including system prompt in request");
        }

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(self.api_key()?)
            .json(&body)
            .send()
            .await?;
        let response = check_response(response).await?;

        let parsed: Response = decode_json(response).await?;
        info!(model = %request.model, "Response received from OpenAI");
        Ok(output_text(parsed))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(serde::Serialize)]
struct Request<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
}

#[derive(serde::Deserialize)]
struct Response {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(serde::Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(serde::Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(serde::Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(serde::Deserialize)]
struct ModelEntry {
    id: String,
}

// ============================================================================
// Conversions
// ============================================================================

fn to_request(request: &GenerateRequest) -> Request<'_> {
    Request {
        model: &request.model,
        input: &request.prompt,
        instructions: request.system(),
    }
}

/// Concatenate every `output_text` block, in order.
fn output_text(response: Response) -> String {
    response
        .output
        .into_iter()
        .flat_map(|item| item.content)
        .filter(|c| c.content_type == "output_text")
        .filter_map(|c| c.text)
        .collect()
}
