//! Core type definitions shared by the monologue and its model clients
//!
//! Two families of types live here. The chat types (`Role`, `Message`,
//! `LLMResponse`) form the contract with language models and follow the
//! OpenAI chat-completions shape. `ThoughtEvent` is the unit of agent memory:
//! an open key/value record whose only structural requirement is that it is
//! a JSON object.

use crate::errors::AgentError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

// Usage statistics structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LLMResponse {
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One entry of the agent's monologue: an action, an observation or a thought.
///
/// Events carry no fixed schema. The only invariant is that they are JSON
/// objects, which is checked when converting from an arbitrary [`Value`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThoughtEvent(Map<String, Value>);

impl ThoughtEvent {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// The `action` or `observation` tag of the event, if it has one.
    pub fn kind(&self) -> Option<&str> {
        self.0
            .get("action")
            .or_else(|| self.0.get("observation"))
            .and_then(Value::as_str)
    }
}

impl TryFrom<Value> for ThoughtEvent {
    type Error = AgentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AgentError::InvalidEvent(json_kind(&other).to_string())),
        }
    }
}

impl fmt::Display for ThoughtEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
