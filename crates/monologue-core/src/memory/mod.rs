//! Agent monologue memory.
//!
//! The monologue keeps every thought event of a session and derives two views
//! from it with the help of a language model: a relevance-filtered subset for
//! the current task, and a condensed summary that replaces the history once it
//! grows too large.

pub mod monologue;
pub mod relevance;

pub use monologue::Monologue;
pub use relevance::{classify_relevance, Relevance};

/// Lifecycle of a monologue. There is no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonologueState {
    #[default]
    Empty,
    Accumulating,
    /// The history was just replaced by a summary; the next append resumes accumulating.
    Condensed,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MonologueStats {
    pub state: MonologueState,
    pub thoughts: usize,
    pub organized_thoughts: usize,
    pub size_bytes: usize,
    pub token_count: usize,
    pub condensations: usize,
}

impl MonologueStats {
    pub fn utilization_percentage(&self, max_monologue_length: usize) -> f64 {
        if max_monologue_length == 0 {
            return 0.0;
        }
        (self.size_bytes as f64 / max_monologue_length as f64) * 100.0
    }
}
