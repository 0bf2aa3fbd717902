//! Modelgate - A thin HTTP gateway that puts OpenAI and Anthropic text
//! generation behind one JSON envelope.

pub mod config;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod server;
