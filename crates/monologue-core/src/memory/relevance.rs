//! LLM-backed relevance classification of single monologue events.

use crate::config::RelevancePolicy;
use crate::core_types::{Message, Role, ThoughtEvent};
use crate::errors::AgentError;
use crate::llm::{response_text, LLM};
use crate::prompts;

pub const RELEVANT: &str = "RELEVANT";
pub const IRRELEVANT: &str = "IRRELEVANT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relevance {
    Relevant,
    Irrelevant,
    Unrecognized(String),
}

impl Relevance {
    /// Maps an already trimmed classifier answer. Matching is exact and case-sensitive.
    pub fn from_response(answer: &str) -> Self {
        match answer {
            RELEVANT => Relevance::Relevant,
            IRRELEVANT => Relevance::Irrelevant,
            other => Relevance::Unrecognized(other.to_string()),
        }
    }

    /// Whether an event with this classification stays in the organized view.
    pub fn keeps(&self, policy: RelevancePolicy) -> Result<bool, AgentError> {
        match (self, policy) {
            (Relevance::Relevant, _) => Ok(true),
            (Relevance::Irrelevant, _) => Ok(false),
            (Relevance::Unrecognized(answer), RelevancePolicy::Permissive) => {
                log::warn!("Unrecognized relevance answer {:?}, keeping event", answer);
                Ok(true)
            }
            (Relevance::Unrecognized(answer), RelevancePolicy::Strict) => Err(AgentError::ParsingError(
                format!("Expected RELEVANT or IRRELEVANT, got {:?}", answer),
            )),
        }
    }
}

/// Asks the model whether `event` is relevant to `task` and returns its trimmed answer.
pub async fn classify_relevance(
    task: &str,
    event: &ThoughtEvent,
    llm: &dyn LLM,
) -> Result<String, AgentError> {
    let messages = vec![
        Message {
            role: Role::System,
            content: prompts::RELEVANCE_INSTRUCTION.to_string(),
        },
        Message {
            role: Role::User,
            content: prompts::relevance_input(task, event),
        },
    ];

    let response = llm.generate(messages).await?;
    let answer = response_text(response)?;
    Ok(trim_answer(&answer).to_string())
}

fn trim_answer(answer: &str) -> &str {
    answer.trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '*' | '.'))
}
