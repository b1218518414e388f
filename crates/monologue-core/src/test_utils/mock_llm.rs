use crate::core_types::{LLMResponse, Message};
use crate::errors::AgentError;
use crate::llm::LLM;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// In-process LLM answering from a queue, then from an optional fallback.
pub struct MockLLM {
    responses: Mutex<VecDeque<Result<LLMResponse, AgentError>>>,
    fallback: Option<String>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLLM {
    pub fn new(responses: Vec<Result<String, AgentError>>) -> Self {
        Self::from_responses(
            responses
                .into_iter()
                .map(|result| result.map(|content| Self::reply(Some(content))))
                .collect(),
        )
    }

    /// Queue raw responses, e.g. ones without any text content.
    pub fn from_responses(responses: Vec<Result<LLMResponse, AgentError>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(content: &str) -> Self {
        Self {
            fallback: Some(content.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn reply(content: Option<String>) -> LLMResponse {
        LLMResponse {
            content,
            finish_reason: None,
            usage: None,
        }
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LLM for MockLLM {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, AgentError> {
        self.calls.lock().unwrap().push(messages);

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => self
                .fallback
                .clone()
                .map(|content| Self::reply(Some(content)))
                .ok_or_else(|| AgentError::LLMError("mock ran out of responses".to_string())),
        }
    }
}
