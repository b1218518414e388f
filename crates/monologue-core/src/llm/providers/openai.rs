use crate::config::LlmConfig;
use crate::core_types::{LLMResponse, Message, Role};
use crate::errors::AgentError;
use crate::llm::{ResponseParser, LLM};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAIClient {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base: "https://api.openai.com/v1".to_string(),
            model,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn build_request_body(&self, messages: &[Message]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.format_messages(messages),
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = temp.into();
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }

        body
    }

    fn format_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": self.format_role(&msg.role),
                    "content": msg.content
                })
            })
            .collect()
    }

    fn format_role(&self, role: &Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[async_trait]
impl LLM for OpenAIClient {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, AgentError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request_body(&messages);

        log::debug!("OpenAI API request to {} with {} messages", url, messages.len());
        for (i, msg) in messages.iter().enumerate() {
            log::trace!("  Message #{}: role={:?}, content={}", i, msg.role, msg.content);
        }

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::LLMError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AgentError::LLMError(format!("Failed to read response: {}", e)))?;

        log::debug!("OpenAI API response ({}): {}", status, response_text);

        if !status.is_success() {
            return Err(AgentError::LLMError(format!(
                "API request failed with status {}: {}",
                status, response_text
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|e| AgentError::ParsingError(format!("Invalid JSON response: {}", e)))?;

        ResponseParser::parse_openai_response(response_json)
    }
}

fn resolve_api_key(config: &LlmConfig) -> Option<String> {
    config.auth.api_key.clone().or_else(|| {
        config
            .auth
            .api_key_env
            .as_ref()
            .and_then(|env_var| std::env::var(env_var).ok())
    })
}

fn apply_parameters(mut client: OpenAIClient, config: &LlmConfig) -> OpenAIClient {
    if let Some(temperature) = config.parameters.temperature {
        client = client.with_temperature(temperature);
    }
    if config.parameters.max_tokens > 0 {
        client = client.with_max_tokens(config.parameters.max_tokens);
    }
    client
}

/// Create an OpenAI LLM client from configuration
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LLM>, AgentError> {
    let api_key = resolve_api_key(config).ok_or_else(|| {
        AgentError::ConfigError("No API key found for OpenAI. Set api_key or api_key_env".to_string())
    })?;

    let client = apply_parameters(OpenAIClient::new(Some(api_key), config.model.clone()), config);
    Ok(Arc::new(client))
}

/// Create an OpenAI-compatible client for custom endpoints.
///
/// Self-hosted servers often run without authentication, so the key is optional here.
pub fn create_custom_client(config: &LlmConfig, base_url: &str) -> Result<Arc<dyn LLM>, AgentError> {
    let client = OpenAIClient::new(resolve_api_key(config), config.model.clone())
        .with_api_base(base_url.to_string());
    Ok(Arc::new(apply_parameters(client, config)))
}
