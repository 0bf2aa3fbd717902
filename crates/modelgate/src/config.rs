use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

use crate::llm::{AnthropicProvider, OpenAIProvider};

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

// ============================================================================
// ProvidersConfig
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAIConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key_env: default_openai_key_env(),
        }
    }
}

fn default_openai_base_url() -> String {
    OpenAIProvider::DEFAULT_BASE_URL.to_string()
}

fn default_openai_key_env() -> String {
    "OPEN_AI_KEY".to_string()
}

#[derive(Debug, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_anthropic_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_anthropic_api_version")]
    pub api_version: String,
    #[serde(default = "default_anthropic_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: default_anthropic_base_url(),
            api_key_env: default_anthropic_key_env(),
            api_version: default_anthropic_api_version(),
            max_tokens: default_anthropic_max_tokens(),
        }
    }
}

fn default_anthropic_base_url() -> String {
    AnthropicProvider::DEFAULT_BASE_URL.to_string()
}

fn default_anthropic_key_env() -> String {
    "ANTHROPIC_KEY".to_string()
}

fn default_anthropic_api_version() -> String {
    AnthropicProvider::DEFAULT_API_VERSION.to_string()
}

fn default_anthropic_max_tokens() -> u32 {
    AnthropicProvider::DEFAULT_MAX_TOKENS
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================
