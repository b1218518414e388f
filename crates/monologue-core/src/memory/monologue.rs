//! The agent's internal monologue.
//!
//! `Monologue` holds the full thought history of a session plus a cached,
//! relevance-filtered view of it. Callers drive recomputation through the
//! iteration number they pass in: iteration `0` means a new task starts,
//! which appends a start-task marker and (for the organized view) re-runs the
//! relevance pass. The store keeps its own `needs_recompute` flag so callers
//! can also request a fresh pass explicitly with [`Monologue::mark_stale`].
//!
//! Mutations that depend on model calls are applied only after every call
//! has succeeded, so a failed or dropped pass leaves the store untouched.

use std::time::Instant;

use serde_json::Value;

use crate::config::MemoryConfig;
use crate::core_types::{Message, Role, ThoughtEvent};
use crate::errors::AgentError;
use crate::llm::{response_text, LLM};
use crate::memory::relevance::{classify_relevance, Relevance};
use crate::memory::{MonologueState, MonologueStats};
use crate::prompts;

#[derive(Debug, Clone, Default)]
pub struct Monologue {
    thoughts: Vec<ThoughtEvent>,
    organized_thoughts: Vec<ThoughtEvent>,
    needs_recompute: bool,
    state: MonologueState,
    condensations: usize,
    config: MemoryConfig,
}

impl Monologue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Validates `event` as a JSON object and appends it to both views.
    pub fn add_event(&mut self, event: Value) -> Result<(), AgentError> {
        let event = ThoughtEvent::try_from(event)?;
        self.add_thought(event);
        Ok(())
    }

    pub fn add_thought(&mut self, event: ThoughtEvent) {
        self.organized_thoughts.push(event.clone());
        self.thoughts.push(event);
        self.state = MonologueState::Accumulating;
    }

    /// Full history. Iteration `0` first appends one start-task marker for `task`.
    pub fn get_thoughts(&mut self, task: &str, iteration: usize) -> &[ThoughtEvent] {
        if iteration == 0 {
            self.thoughts.push(prompts::start_task(task));
            self.state = MonologueState::Accumulating;
            for thought in &self.thoughts {
                log::debug!("{}", thought);
            }
        }
        &self.thoughts
    }

    /// Relevance-filtered history for `task`.
    ///
    /// On iteration `0` (or after [`mark_stale`](Self::mark_stale)) every event
    /// is classified by `llm`; kept events plus a fresh start-task marker become
    /// the new organized view, and the marker is appended to the full history
    /// as well. Otherwise the cached view is returned unchanged.
    pub async fn get_organized_thoughts(
        &mut self,
        task: &str,
        iteration: usize,
        llm: &dyn LLM,
    ) -> Result<&[ThoughtEvent], AgentError> {
        if iteration != 0 && !self.needs_recompute {
            return Ok(&self.organized_thoughts);
        }

        let started = Instant::now();
        let mut relevant = Vec::with_capacity(self.thoughts.len() + 1);
        for thought in &self.thoughts {
            let answer = classify_relevance(task, thought, llm).await?;
            if Relevance::from_response(&answer).keeps(self.config.relevance_policy)? {
                relevant.push(thought.clone());
            }
        }

        log::info!(
            "Organized monologue for task {:?}: kept {} of {} thoughts in {:?}",
            task,
            relevant.len(),
            self.thoughts.len(),
            started.elapsed()
        );

        let marker = prompts::start_task(task);
        relevant.push(marker.clone());
        self.thoughts.push(marker);
        self.organized_thoughts = relevant;
        self.needs_recompute = false;
        self.state = MonologueState::Accumulating;

        Ok(&self.organized_thoughts)
    }

    pub async fn classify_relevance(
        &self,
        task: &str,
        event: &ThoughtEvent,
        llm: &dyn LLM,
    ) -> Result<String, AgentError> {
        classify_relevance(task, event, llm).await
    }

    /// Total length of the JSON encoding of every thought, in UTF-8 bytes of
    /// compact `serde_json` output. Non-ASCII text is not escaped, so `é`
    /// counts as two bytes.
    pub fn estimate_size(&self) -> usize {
        self.thoughts
            .iter()
            .map(|thought| match serde_json::to_string(thought) {
                Ok(encoded) => encoded.len(),
                Err(e) => {
                    log::error!("Error serializing thought: {}", e);
                    0
                }
            })
            .sum()
    }

    pub fn estimate_tokens(&self) -> usize {
        // Rough approximation: 4 characters per token
        self.estimate_size() / 4
    }

    /// Replaces the history with a model-generated summary.
    ///
    /// Failures from the model or from parsing its answer are logged and
    /// returned as-is; the history is left unchanged in that case.
    pub async fn condense(&mut self, llm: &dyn LLM) -> Result<(), AgentError> {
        match self.summarize(llm).await {
            Ok(condensed) => {
                log::info!(
                    "Condensed monologue from {} to {} thoughts",
                    self.thoughts.len(),
                    condensed.len()
                );
                self.thoughts = condensed;
                self.condensations += 1;
                self.state = MonologueState::Condensed;
                Ok(())
            }
            Err(e) => {
                // TODO: condense chunk by chunk when the model rejects the prompt for context length
                log::error!("Error condensing thoughts: {}", e);
                Err(e)
            }
        }
    }

    /// Condenses once the history outgrows `max_monologue_length`. Returns whether it ran.
    pub async fn condense_if_needed(&mut self, llm: &dyn LLM) -> Result<bool, AgentError> {
        let size = self.estimate_size();
        if size <= self.config.max_monologue_length {
            return Ok(false);
        }
        log::info!(
            "Monologue size {} exceeds {}, condensing",
            size,
            self.config.max_monologue_length
        );
        self.condense(llm).await?;
        Ok(true)
    }

    async fn summarize(&self, llm: &dyn LLM) -> Result<Vec<ThoughtEvent>, AgentError> {
        let prompt = prompts::summarize_prompt(&self.thoughts)?;
        let messages = vec![Message {
            role: Role::User,
            content: prompt,
        }];

        let response = llm.generate(messages).await?;
        let summary = response_text(response)?;
        prompts::parse_summary_response(&summary)
    }

    /// Forces the next `get_organized_thoughts` call to recompute.
    pub fn mark_stale(&mut self) {
        self.needs_recompute = true;
    }

    pub fn needs_recompute(&self) -> bool {
        self.needs_recompute
    }

    pub fn thoughts(&self) -> &[ThoughtEvent] {
        &self.thoughts
    }

    pub fn organized_thoughts(&self) -> &[ThoughtEvent] {
        &self.organized_thoughts
    }

    pub fn len(&self) -> usize {
        self.thoughts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thoughts.is_empty()
    }

    pub fn state(&self) -> MonologueState {
        self.state
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        self.thoughts.clear();
        self.organized_thoughts.clear();
        self.needs_recompute = false;
        self.state = MonologueState::Empty;
    }

    pub fn stats(&self) -> MonologueStats {
        MonologueStats {
            state: self.state,
            thoughts: self.thoughts.len(),
            organized_thoughts: self.organized_thoughts.len(),
            size_bytes: self.estimate_size(),
            token_count: self.estimate_tokens(),
            condensations: self.condensations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelevancePolicy;
    use crate::test_utils::MockLLM;
    use serde_json::json;

    fn think(thought: &str) -> Value {
        json!({"action": "think", "args": {"thought": thought}})
    }

    fn store_with(events: &[Value]) -> Monologue {
        let mut monologue = Monologue::new();
        for event in events {
            monologue.add_event(event.clone()).unwrap();
        }
        monologue
    }

    #[test]
    fn test_add_event_grows_both_views() {
        let mut monologue = Monologue::new();
        assert_eq!(monologue.state(), MonologueState::Empty);

        monologue.add_event(think("a")).unwrap();
        monologue.add_event(json!({"observation": "run", "content": "ok"})).unwrap();

        assert_eq!(monologue.thoughts().len(), 2);
        assert_eq!(monologue.organized_thoughts().len(), 2);
        assert_eq!(monologue.state(), MonologueState::Accumulating);
    }

    #[test]
    fn test_add_event_rejects_non_objects() {
        let mut monologue = store_with(&[think("a")]);
        for bad in [json!("think"), json!([1, 2]), json!(null), json!(3.5)] {
            let err = monologue.add_event(bad).unwrap_err();
            assert!(matches!(err, AgentError::InvalidEvent(_)));
        }
        assert_eq!(monologue.thoughts().len(), 1);
        assert_eq!(monologue.organized_thoughts().len(), 1);
    }

    #[test]
    fn test_get_thoughts_marker_only_on_iteration_zero() {
        let mut monologue = store_with(&[think("a")]);

        assert_eq!(monologue.get_thoughts("task", 0).len(), 2);
        assert!(prompts::is_start_task(&monologue.thoughts()[1]));
        assert_eq!(monologue.get_thoughts("task", 0).len(), 3);

        let first = monologue.get_thoughts("task", 5).to_vec();
        let second = monologue.get_thoughts("task", 5).to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(monologue.organized_thoughts().len(), 1);
    }

    #[tokio::test]
    async fn test_organized_all_irrelevant_keeps_only_marker() {
        let mut monologue = store_with(&[think("a"), think("b"), think("c")]);
        let llm = MockLLM::always("IRRELEVANT");

        let organized = monologue.get_organized_thoughts("task", 0, &llm).await.unwrap().to_vec();
        assert_eq!(organized, vec![prompts::start_task("task")]);
        assert_eq!(llm.call_count(), 3);
        assert_eq!(monologue.thoughts().len(), 4);
    }

    #[tokio::test]
    async fn test_organized_all_relevant_keeps_everything() {
        let mut monologue = store_with(&[think("a"), think("b")]);
        let llm = MockLLM::always("RELEVANT");

        let organized = monologue.get_organized_thoughts("task", 0, &llm).await.unwrap();
        assert_eq!(organized.len(), 3);
        assert!(prompts::is_start_task(&organized[2]));
    }

    #[tokio::test]
    async fn test_organized_mixed_answers_fail_open() {
        let mut monologue = store_with(&[think("a"), think("b"), think("c")]);
        let llm = MockLLM::new(vec![
            Ok("IRRELEVANT".to_string()),
            Ok("I think this is relevant".to_string()),
            Ok("**IRRELEVANT**".to_string()),
        ]);

        let organized = monologue.get_organized_thoughts("task", 0, &llm).await.unwrap().to_vec();
        assert_eq!(organized.len(), 2);
        assert_eq!(organized[0].get("args").unwrap()["thought"], "b");
    }

    #[tokio::test]
    async fn test_organized_strict_policy_rejects_unrecognized() {
        let config = MemoryConfig {
            relevance_policy: RelevancePolicy::Strict,
            ..MemoryConfig::default()
        };
        let mut monologue = Monologue::with_config(config);
        monologue.add_event(think("a")).unwrap();
        monologue.add_event(think("b")).unwrap();
        let llm = MockLLM::new(vec![Ok("IRRELEVANT".to_string()), Ok("perhaps".to_string())]);

        let err = monologue.get_organized_thoughts("task", 0, &llm).await.unwrap_err();
        assert!(matches!(err, AgentError::ParsingError(_)));
        assert_eq!(monologue.thoughts().len(), 2);
        assert_eq!(monologue.organized_thoughts().len(), 2);
    }

    #[tokio::test]
    async fn test_organized_cached_on_non_zero_iteration() {
        let mut monologue = store_with(&[think("a")]);
        let llm = MockLLM::always("IRRELEVANT");

        monologue.get_organized_thoughts("task", 0, &llm).await.unwrap();
        monologue.add_event(think("b")).unwrap();

        let cached = monologue.get_organized_thoughts("task", 1, &llm).await.unwrap().to_vec();
        assert_eq!(llm.call_count(), 1);
        assert_eq!(cached.len(), 2);
        assert_eq!(monologue.thoughts().len(), 3);
    }

    #[tokio::test]
    async fn test_mark_stale_forces_recompute() {
        let mut monologue = store_with(&[think("a")]);
        let llm = MockLLM::always("RELEVANT");

        monologue.mark_stale();
        assert!(monologue.needs_recompute());
        let organized = monologue.get_organized_thoughts("task", 7, &llm).await.unwrap();
        assert_eq!(organized.len(), 2);
        assert!(!monologue.needs_recompute());
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_organized_model_failure_leaves_store_unchanged() {
        let mut monologue = store_with(&[think("a"), think("b")]);
        let llm = MockLLM::new(vec![
            Ok("RELEVANT".to_string()),
            Err(AgentError::LLMError("connection reset".to_string())),
        ]);

        let err = monologue.get_organized_thoughts("task", 0, &llm).await.unwrap_err();
        assert_eq!(err, AgentError::LLMError("connection reset".to_string()));
        assert_eq!(monologue.thoughts().len(), 2);
        assert_eq!(monologue.organized_thoughts().len(), 2);
    }

    #[tokio::test]
    async fn test_organized_empty_answer_leaves_store_unchanged() {
        let mut monologue = store_with(&[think("a"), think("b")]);
        let before = monologue.thoughts().to_vec();
        let llm = MockLLM::from_responses(vec![
            Ok(MockLLM::reply(Some("RELEVANT".to_string()))),
            Ok(MockLLM::reply(None)),
        ]);

        let err = monologue.get_organized_thoughts("task", 0, &llm).await.unwrap_err();
        assert!(matches!(err, AgentError::ParsingError(_)));
        assert_eq!(monologue.thoughts(), before.as_slice());
        assert_eq!(monologue.organized_thoughts(), before.as_slice());
    }

    #[test]
    fn test_estimate_size_counts_utf8_bytes() {
        let event = json!({"action": "think", "args": {"thought": "café"}});
        let encoded = serde_json::to_string(&event).unwrap();
        assert_eq!(encoded, r#"{"action":"think","args":{"thought":"café"}}"#);

        let monologue = store_with(&[event]);
        assert_eq!(monologue.estimate_size(), encoded.len());
        assert_eq!(monologue.estimate_size(), encoded.chars().count() + 1);
    }

    #[test]
    fn test_estimate_size() {
        assert_eq!(Monologue::new().estimate_size(), 0);

        let event = json!({"action": "think", "args": {"thought": "plan calculator"}});
        let expected = serde_json::to_string(&event).unwrap().len();
        let monologue = store_with(&[event]);
        assert_eq!(monologue.estimate_size(), expected);
        assert_eq!(monologue.estimate_tokens(), expected / 4);
    }

    #[tokio::test]
    async fn test_condense_replaces_history() {
        let mut monologue = store_with(&[think("a"), think("b"), think("c")]);
        let llm = MockLLM::new(vec![Ok(
            r#"{"new_monologue": [{"action": "summarize", "args": {"summary": "a, b and c"}}]}"#.to_string(),
        )]);

        monologue.condense(&llm).await.unwrap();

        assert_eq!(monologue.thoughts().len(), 1);
        assert_eq!(monologue.thoughts()[0].kind(), Some("summarize"));
        assert_eq!(monologue.state(), MonologueState::Condensed);
        assert_eq!(monologue.stats().condensations, 1);
        assert_eq!(monologue.organized_thoughts().len(), 3);

        let calls = llm.calls();
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[0][0].role, Role::User);
        assert!(calls[0][0].content.contains("old_monologue"));

        monologue.add_event(think("d")).unwrap();
        assert_eq!(monologue.state(), MonologueState::Accumulating);
    }

    #[tokio::test]
    async fn test_condense_failure_keeps_history() {
        let mut monologue = store_with(&[think("a"), think("b")]);
        let before = monologue.thoughts().to_vec();

        let failing = MockLLM::new(vec![Err(AgentError::LLMError("context window exceeded".to_string()))]);
        let err = monologue.condense(&failing).await.unwrap_err();
        assert_eq!(err, AgentError::LLMError("context window exceeded".to_string()));
        assert_eq!(monologue.thoughts(), before.as_slice());

        let garbled = MockLLM::always("Sorry, I cannot help with that.");
        let err = monologue.condense(&garbled).await.unwrap_err();
        assert!(matches!(err, AgentError::ParsingError(_)));
        assert_eq!(monologue.thoughts(), before.as_slice());
        assert_eq!(monologue.state(), MonologueState::Accumulating);
    }

    #[tokio::test]
    async fn test_condense_if_needed_respects_threshold() {
        let config = MemoryConfig {
            max_monologue_length: 60,
            ..MemoryConfig::default()
        };
        let mut monologue = Monologue::with_config(config);
        monologue.add_event(think("short")).unwrap();
        let llm = MockLLM::always(r#"{"new_monologue": []}"#);

        assert!(!monologue.condense_if_needed(&llm).await.unwrap());
        assert_eq!(llm.call_count(), 0);

        monologue.add_event(think("a much longer thought that pushes us over the limit")).unwrap();
        assert!(monologue.condense_if_needed(&llm).await.unwrap());
        assert!(monologue.is_empty());
    }

    #[test]
    fn test_clear_and_stats() {
        let mut monologue = store_with(&[think("a")]);
        let stats = monologue.stats();
        assert_eq!(stats.thoughts, 1);
        assert_eq!(stats.organized_thoughts, 1);
        assert!(stats.size_bytes > 0);

        monologue.clear();
        assert!(monologue.is_empty());
        assert_eq!(monologue.stats(), MonologueStats::default());
    }
}
