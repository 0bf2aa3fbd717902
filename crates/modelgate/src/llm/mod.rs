//! LLM provider clients for model listing and text generation.

mod anthropic;
mod client;
mod error;
mod openai;
mod provider;
mod registry;
mod types;

pub use anthropic::{AnthropicProvider, FALLBACK_TEXT};
pub use client::ProviderClient;
pub use error::LLMError;
pub use openai::OpenAIProvider;
pub use provider::LLMProvider;
pub use registry::ProviderRegistry;
pub use types::{GenerateRequest, ModelDescriptor, Provider};
