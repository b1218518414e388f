//! Error types for the monologue memory and its language model plumbing
//!
//! Every fallible operation in the crate returns [`AgentError`]. Errors are
//! grouped by their source (model calls, response parsing, configuration,
//! event validation) so callers can decide which ones are worth retrying.
//! The enum is `Clone` because condensation logs a failure and then hands the
//! very same error back to the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("LLM interaction failed: {0}")]
    LLMError(String),
    #[error("Parsing error: {0}")]
    ParsingError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid event: expected a JSON object, got {0}")]
    InvalidEvent(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::LLMError(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::SerializationError(err.to_string())
    }
}
