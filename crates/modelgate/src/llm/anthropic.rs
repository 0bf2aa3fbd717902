//! Anthropic LLM provider with native API format.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use super::error::{LLMError, check_response, decode_json};
use super::provider::LLMProvider;
use super::types::{GenerateRequest, ModelDescriptor, Provider};

/// Returned when a response carries no text in its first content block.
pub const FALLBACK_TEXT: &str = "Response received but could not extract text content.";

/// Anthropic provider with native API format.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    api_version: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_API_VERSION: &'static str = "2023-06-01";
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build a request with the auth and version headers.
    fn build_request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder, LLMError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(LLMError::MissingApiKey(Provider::Anthropic))?;

        Ok(self
            .client
            .request(method, url)
            .header("x-api-key", key)
            .header("anthropic-version", &self.api_version))
    }

    async fn fetch_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self.build_request(reqwest::Method::GET, &url)?.send().await?;
        let response = check_response(response).await?;

        let list: ModelList = decode_json(response).await?;
        Ok(list
            .data
            .into_iter()
            .map(|m| ModelDescriptor {
                name: m.display_name.unwrap_or_else(|| m.id.clone()),
                id: m.id,
                provider: Provider::Anthropic,
            })
            .collect())
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    /// Failures are logged and degrade to an empty list.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        match self.fetch_models().await {
            Ok(models) => {
                info!(count = models.len(), "Retrieved models from Anthropic");
                Ok(models)
            }
            Err(e) => {
                error!(error = %e, "Error listing Anthropic models");
                Ok(Vec::new())
            }
        }
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, LLMError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = to_request(&request, self.max_tokens);
        if body.system.is_some() {
            debug!("Including system prompt in request");
        }

        let response = self
            .build_request(reqwest::Method::POST, &url)?
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        let response = check_response(response).await?;

        let parsed: Response = decode_json(response).await?;
        info!(model = %request.model, "Response received from Anthropic");
        Ok(first_text(parsed))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(serde::Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(serde::Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct Response {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

/// Any content block; only text blocks carry `text`.
#[derive(serde::Deserialize)]
struct ResponseContent {
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
    #[serde(default)]
    display_name: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

fn to_request(request: &GenerateRequest, max_tokens: u32) -> Request<'_> {
    Request {
        model: &request.model,
        max_tokens,
        messages: [RequestMessage {
            role: "user",
            content: &request.prompt,
        }],
        system: request.system(),
    }
}

fn first_text(response: Response) -> String {
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .unwrap_or_else(|| FALLBACK_TEXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::Json;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn provider(base_url: String) -> AnthropicProvider {
        AnthropicProvider::new(Client::new(), base_url, Some("sk-ant-test".to_string()))
    }

    fn request(system_prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "claude-3-5-haiku-latest".to_string(),
            prompt: "Hello".to_string(),
            system_prompt: system_prompt.to_string(),
        }
    }

    #[test]
    fn test_request_shape() {
        let req = request("");
        let json = serde_json::to_value(to_request(&req, 1024)).unwrap();
        assert_eq!(
            json,
            json!({
                "model": "claude-3-5-haiku-latest",
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": "Hello"}]
            })
        );

        let req = request("Be terse.");
        let json = serde_json::to_value(to_request(&req, 1024)).unwrap();
        assert_eq!(json["system"], "Be terse.");
    }

    #[test]
    fn test_first_text_uses_first_block_only() {
        let response: Response = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ]
        }))
        .unwrap();
        assert_eq!(first_text(response), "first");
    }

    #[test]
    fn test_first_text_fallback() {
        let empty: Response = serde_json::from_value(json!({"content": []})).unwrap();
        assert_eq!(first_text(empty), FALLBACK_TEXT);

        let tool_use: Response = serde_json::from_value(json!({
            "content": [
                {"type": "tool_use", "id": "tu_1", "name": "lookup", "input": {}},
                {"type": "text", "text": "ignored"}
            ]
        }))
        .unwrap();
        assert_eq!(first_text(tool_use), FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn test_generate_sends_headers_and_body() {
        let seen: Arc<Mutex<Option<(HeaderMap, Value)>>> = Arc::default();
        let app = {
            let seen = seen.clone();
            Router::new().route(
                "/v1/messages",
                post(move |headers: HeaderMap, Json(body): Json<Value>| {
                    let seen = seen.clone();
                    async move {
                        *seen.lock().await = Some((headers, body));
                        Json(json!({
                            "id": "msg_1",
                            "type": "message",
                            "role": "assistant",
                            "content": [{"type": "text", "text": "Hi there"}],
                            "stop_reason": "end_turn"
                        }))
                    }
                }),
            )
        };
        let base = serve(app).await;

        let text = provider(base)
            .with_max_tokens(256)
            .generate(request("You are a test."))
            .await
            .unwrap();
        assert_eq!(text, "Hi there");

        let (headers, body) = seen.lock().await.take().unwrap();
        assert_eq!(headers["x-api-key"], "sk-ant-test");
        assert_eq!(headers["anthropic-version"], "2023-06-01");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["system"], "You are a test.");
        assert_eq!(body["messages"][0]["content"], "Hello");
    }

    #[tokio::test]
    async fn test_generate_maps_api_error() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::BAD_REQUEST, "unknown model") }),
        );
        let base = serve(app).await;

        let result = provider(base).generate(request("")).await;
        assert!(matches!(result, Err(LLMError::Api { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_list_models_uses_display_name() {
        let app = Router::new().route(
            "/v1/models",
            get(|| async {
                Json(json!({
                    "data": [
                        {"id": "claude-3-opus-20240229", "display_name": "Claude 3 Opus", "type": "model"},
                        {"id": "claude-legacy", "type": "model"}
                    ],
                    "has_more": false
                }))
            }),
        );
        let base = serve(app).await;

        let models = provider(base).list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "Claude 3 Opus");
        assert_eq!(models[1].name, "claude-legacy");
        assert!(models.iter().all(|m| m.provider == Provider::Anthropic));
    }

    #[tokio::test]
    async fn test_list_models_failure_yields_empty() {
        let app = Router::new().route(
            "/v1/models",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "overloaded") }),
        );
        let base = serve(app).await;

        let models = provider(base).list_models().await.unwrap();
        assert!(models.is_empty());
    }

    #[tokio::test]
    async fn test_list_models_unreachable_yields_empty() {
        let provider = provider("http://127.0.0.1:9".to_string());
        assert!(provider.list_models().await.unwrap().is_empty());

        let keyless = AnthropicProvider::new(Client::new(), "http://127.0.0.1:9".to_string(), None);
        assert!(keyless.list_models().await.unwrap().is_empty());
    }
}
