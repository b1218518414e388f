//! Agent monologue memory with LLM-driven filtering and condensation.
//!
//! An agent records every action, observation and thought of a session as a
//! [`ThoughtEvent`]. The [`Monologue`] keeps that history and derives two
//! views from it through a language model:
//!
//! - **Organized thoughts**: the events the model judges relevant to the
//!   current task, recomputed whenever a new task starts
//! - **Condensation**: a model-written summary that replaces the whole
//!   history once it grows past a size budget
//!
//! The language model is any [`LLM`] implementation; an OpenAI-compatible
//! HTTP client is provided and configured through [`config`].

pub mod config;
pub mod core_types;
pub mod errors;
pub mod llm;
pub mod memory;
pub mod prompts;

pub use config::*;
pub use core_types::ThoughtEvent;
pub use errors::AgentError;
pub use llm::LLM;
pub use memory::{Monologue, MonologueState, MonologueStats, Relevance};

#[cfg(test)]
pub mod test_utils;
