//! Provider registry for managing LLM provider instances.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use super::anthropic::AnthropicProvider;
use super::client::ProviderClient;
use super::openai::OpenAIProvider;
use super::provider::LLMProvider;
use super::types::Provider;
use crate::config::ProvidersConfig;

struct Entry {
    implementation: Arc<dyn LLMProvider>,
    api_key: Option<String>,
}

/// Fixed table of provider implementations, built once at startup.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<Entry>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize providers, reading API keys from the process environment.
    pub fn from_env(config: &ProvidersConfig) -> Self {
        Self::from_config(config, |name| std::env::var(name).ok())
    }

    /// Initialize providers, resolving API key variable names with `lookup`.
    ///
    /// A missing key is not fatal: the provider is still registered and its
    /// calls fail until a key is configured.
    pub fn from_config(config: &ProvidersConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let client = Client::new();
        let mut registry = Self::new();

        let openai_key = lookup(&config.openai.api_key_env).filter(|k| !k.is_empty());
        if openai_key.is_none() {
            warn!(var = %config.openai.api_key_env, "No OpenAI API key found in environment");
        }
        let openai = OpenAIProvider::new(
            client.clone(),
            config.openai.base_url.clone(),
            openai_key.clone(),
        );
        registry.register(Arc::new(openai), openai_key);
        info!("Registered OpenAI provider");

        let anthropic_key = lookup(&config.anthropic.api_key_env).filter(|k| !k.is_empty());
        if anthropic_key.is_none() {
            warn!(var = %config.anthropic.api_key_env, "No Anthropic API key found in environment");
        }
        let anthropic = AnthropicProvider::new(
            client,
            config.anthropic.base_url.clone(),
            anthropic_key.clone(),
        )
        .with_api_version(config.anthropic.api_version.clone())
        .with_max_tokens(config.anthropic.max_tokens);
        registry.register(Arc::new(anthropic), anthropic_key);
        info!("Registered Anthropic provider");

        registry
    }

    /// Register a provider implementation under its own provider type.
    pub fn register(&mut self, implementation: Arc<dyn LLMProvider>, api_key: Option<String>) {
        let provider = implementation.provider();
        self.providers.insert(
            provider,
            Arc::new(Entry {
                implementation,
                api_key,
            }),
        );
    }

    /// Get a provider by type.
    pub fn get(&self, provider: Provider) -> Option<Arc<dyn LLMProvider>> {
        self.providers
            .get(&provider)
            .map(|e| e.implementation.clone())
    }

    /// A fresh client with no model selected.
    pub fn client(&self, provider: Provider) -> Option<ProviderClient> {
        self.get(provider).map(ProviderClient::new)
    }

    /// The configured API key for a provider, if any.
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.providers
            .get(&provider)
            .and_then(|e| e.api_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_registers_both_providers() {
        let config = ProvidersConfig::default();
        let registry = ProviderRegistry::from_config(&config, |name| match name {
            "OPEN_AI_KEY" => Some("sk-openai".to_string()),
            _ => None,
        });

        for provider in Provider::ALL {
            let implementation = registry.get(provider).unwrap();
            assert_eq!(implementation.provider(), provider);
        }
        assert_eq!(registry.api_key(Provider::OpenAI), Some("sk-openai"));
        assert_eq!(registry.api_key(Provider::Anthropic), None);
    }

    #[test]
    fn test_empty_key_treated_as_missing() {
        let config = ProvidersConfig::default();
        let registry = ProviderRegistry::from_config(&config, |_| Some(String::new()));
        assert_eq!(registry.api_key(Provider::OpenAI), None);
        assert_eq!(registry.api_key(Provider::Anthropic), None);
    }

    #[test]
    fn test_client_starts_without_model() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default(), |_| None);
        let client = registry.client(Provider::Anthropic).unwrap();
        assert_eq!(client.provider(), Provider::Anthropic);
        assert_eq!(client.active_model(), None);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.get(Provider::OpenAI).is_none());
        assert!(registry.client(Provider::OpenAI).is_none());
    }
}
