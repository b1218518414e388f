use crate::core_types::{LLMResponse, Usage};
use crate::errors::AgentError;
use serde_json::Value;

pub struct ResponseParser;

impl ResponseParser {
    /// Reads `choices[0].message.content` out of a chat-completions body.
    pub fn parse_openai_response(response: Value) -> Result<LLMResponse, AgentError> {
        let choices = response["choices"]
            .as_array()
            .ok_or_else(|| AgentError::ParsingError("No choices in response".to_string()))?;

        if choices.is_empty() {
            return Err(AgentError::ParsingError("Empty choices array".to_string()));
        }

        let choice = &choices[0];
        let content = choice["message"]["content"].as_str().map(|s| s.to_string());

        if content.is_none() {
            return Err(AgentError::ParsingError(
                "Response message has no text content".to_string(),
            ));
        }

        let finish_reason = choice["finish_reason"].as_str().map(|s| s.to_string());
        let usage = Self::parse_usage(&response["usage"]);

        Ok(LLMResponse {
            content,
            finish_reason,
            usage,
        })
    }

    fn parse_usage(usage: &Value) -> Option<Usage> {
        let field = |name: &str| usage[name].as_u64().map(|n| n as u32);
        Some(Usage {
            prompt_tokens: field("prompt_tokens")?,
            completion_tokens: field("completion_tokens")?,
            total_tokens: field("total_tokens")?,
        })
    }
}
