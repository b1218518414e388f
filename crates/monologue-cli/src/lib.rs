//! Command-line front-end for the monologue memory
//!
//! Events are read from a JSON file holding an array of objects, replayed into
//! a fresh [`Monologue`], and the requested operation runs against the model
//! named in the configuration file.

use anyhow::{bail, Context, Result};
use monologue_core::{config::ConfigLoader, llm, MemoryConfig, Monologue, MonologueConfig, LLM};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Loads the configuration, or `None` when the file does not exist.
pub async fn load_config(path: &Path) -> Result<Option<MonologueConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let config = ConfigLoader::from_file(path)
        .await
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    Ok(Some(config))
}

pub fn create_llm(config: &MonologueConfig) -> Result<Arc<dyn LLM>> {
    let Some(llm_config) = &config.llm else {
        bail!("this command needs an `llm` section in the configuration");
    };
    Ok(llm::create_llm_client(llm_config)?)
}

pub async fn load_events(path: &Path) -> Result<Vec<Value>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading events from {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing events in {}", path.display()))?;

    match parsed {
        Value::Array(events) => Ok(events),
        _ => bail!("{} must contain a JSON array of events", path.display()),
    }
}

/// Replays `events` into a new monologue. The first invalid event aborts with its index.
pub fn replay(events: Vec<Value>, config: MemoryConfig) -> Result<Monologue> {
    let mut monologue = Monologue::with_config(config);
    for (idx, event) in events.into_iter().enumerate() {
        monologue
            .add_event(event)
            .with_context(|| format!("event #{} is not a JSON object", idx))?;
    }
    Ok(monologue)
}

pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
