//! LLM provider implementations
//!
//! Every supported provider speaks the OpenAI chat-completions protocol; the
//! custom provider only swaps the base URL.

use std::sync::Arc;
use crate::config::{LlmConfig, LlmProvider};
use crate::llm::LLM;
use crate::errors::AgentError;

pub mod openai;

/// Create an LLM client based on the provider configuration
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LLM>, AgentError> {
    validate_provider_config(config)?;
    match &config.provider {
        LlmProvider::OpenAI => openai::create_client(config),
        LlmProvider::Custom { base_url } => openai::create_custom_client(config, base_url),
    }
}

/// Validate provider-specific configuration
pub fn validate_provider_config(config: &LlmConfig) -> Result<(), AgentError> {
    match &config.provider {
        LlmProvider::OpenAI => {
            if config.auth.api_key.is_none() && config.auth.api_key_env.is_none() {
                return Err(AgentError::ConfigError(
                    "OpenAI provider requires either 'api_key' or 'api_key_env'".to_string()
                ));
            }
        }
        LlmProvider::Custom { base_url } => {
            if base_url.is_empty() {
                return Err(AgentError::ConfigError(
                    "Custom provider requires a valid 'base_url'".to_string()
                ));
            }
        }
    }

    Ok(())
}
