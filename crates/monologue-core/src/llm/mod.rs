//! Language model abstraction used by the monologue.
//!
//! The memory only needs plain chat completion: a list of role/content
//! messages in, generated text out. Providers implement [`LLM`]; the
//! OpenAI-compatible HTTP client in [`providers::openai`] covers both the
//! hosted API and self-hosted endpoints speaking the same protocol.

pub use crate::core_types::{LLMResponse, Message};
use crate::errors::AgentError;
use async_trait::async_trait;

pub mod providers;
pub mod response_parser;

pub use providers::{create_llm_client, openai::OpenAIClient};
pub use response_parser::ResponseParser;

#[async_trait]
pub trait LLM: Send + Sync {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, AgentError>;
}

/// Extracts the generated text from a completion, failing when the model sent none.
pub fn response_text(response: LLMResponse) -> Result<String, AgentError> {
    response
        .content
        .ok_or_else(|| AgentError::ParsingError("LLM response has no content".to_string()))
}
