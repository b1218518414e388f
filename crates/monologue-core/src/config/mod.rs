//! Configuration for the monologue and its language model backend
//!
//! Configuration is read from YAML, environment files and variables are
//! applied, API keys are resolved from the environment and the result is
//! validated before use.

pub mod types;
pub mod loader;

pub use types::*;
pub use loader::*;


use crate::errors::AgentError;
use std::path::Path;

/// Load a configuration from a YAML file
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<MonologueConfig, AgentError> {
    ConfigLoader::from_file(path).await
}
