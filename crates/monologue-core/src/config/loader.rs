//! Configuration loader for YAML files and environment resolution

use crate::config::types::*;
use crate::errors::AgentError;
use std::env;
use std::path::Path;
use tokio::fs;

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<MonologueConfig, AgentError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            AgentError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<MonologueConfig, AgentError> {
        let mut config: MonologueConfig = serde_yaml::from_str(content)
            .map_err(|e| AgentError::ConfigError(format!("Failed to parse YAML config: {}", e)))?;

        Self::resolve_environment(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Resolve environment variables in the configuration
    fn resolve_environment(config: &mut MonologueConfig) -> Result<(), AgentError> {
        for env_file in &config.environment.env_files {
            if env_file.exists() {
                Self::load_env_file(env_file)?;
            } else {
                log::warn!("Env file {} does not exist, skipping", env_file.display());
            }
        }

        for (key, value) in &config.environment.variables {
            env::set_var(key, value);
        }

        if let Some(ref mut llm_config) = config.llm {
            Self::resolve_llm_auth(&mut llm_config.auth);
        }

        Ok(())
    }

    fn load_env_file<P: AsRef<Path>>(path: P) -> Result<(), AgentError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AgentError::ConfigError(format!(
                "Failed to read env file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                env::set_var(key, value);
            }
        }

        Ok(())
    }

    /// Resolve LLM authentication from environment
    fn resolve_llm_auth(auth: &mut LlmAuth) {
        if let Some(env_var) = &auth.api_key_env {
            if let Ok(api_key) = env::var(env_var) {
                auth.api_key = Some(api_key);
            }
        }

        if auth.api_key.is_none() && auth.api_key_env.is_none() {
            if let Ok(api_key) = env::var("OPENAI_API_KEY") {
                auth.api_key = Some(api_key);
            }
        }
    }
}
