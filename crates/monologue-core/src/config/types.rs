//! Configuration type definitions
//!
//! A minimal configuration names a model; everything else has defaults. The
//! `memory` section tunes the monologue itself, the `llm` section selects the
//! chat-completion backend used for relevance filtering and condensation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use crate::errors::AgentError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonologueConfig {
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    #[serde(default)]
    pub parameters: ModelParameters,
    #[serde(default)]
    pub auth: LlmAuth,
}

/// LLM provider types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAI,
    Custom {
        base_url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Sampling temperature, `0.0` unless set. `null` leaves it to the server.
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmAuth {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
}

/// How classifier answers other than `RELEVANT`/`IRRELEVANT` are treated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelevancePolicy {
    /// Anything but an exact `IRRELEVANT` keeps the event.
    #[default]
    Permissive,
    /// Unrecognized answers abort the filtering pass with a parsing error.
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Size above which `condense_if_needed` condenses, measured like
    /// `Monologue::estimate_size`: UTF-8 bytes of compact JSON (no spaces
    /// after `,` or `:`, non-ASCII text unescaped).
    #[serde(default = "default_max_monologue_length")]
    pub max_monologue_length: usize,
    #[serde(default)]
    pub relevance_policy: RelevancePolicy,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_monologue_length: default_max_monologue_length(),
            relevance_policy: RelevancePolicy::default(),
        }
    }
}

/// Environment configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub env_files: Vec<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_temperature() -> Option<f32> { Some(0.0) }
fn default_max_tokens() -> u32 { 1024 }
fn default_max_monologue_length() -> usize { 20000 }
fn default_log_level() -> String { "info".to_string() }

impl Default for MonologueConfig {
    fn default() -> Self {
        Self {
            llm: None,
            memory: MemoryConfig::default(),
            environment: EnvironmentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MonologueConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AgentError> {
        if let Some(ref llm_config) = self.llm {
            if llm_config.model.is_empty() {
                return Err(AgentError::ConfigError("LLM model cannot be empty".to_string()));
            }
            if let LlmProvider::Custom { base_url } = &llm_config.provider {
                if base_url.is_empty() {
                    return Err(AgentError::ConfigError(
                        "Custom provider requires a valid 'base_url'".to_string(),
                    ));
                }
            }
        }

        if self.memory.max_monologue_length == 0 {
            return Err(AgentError::ConfigError(
                "memory.max_monologue_length must be greater than 0".to_string(),
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(AgentError::ConfigError(format!("Unknown log level '{}'", other))),
        }
    }
}
