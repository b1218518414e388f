//! Prompt templates used by the monologue.
//!
//! Templates are plain constants with `{placeholder}` markers filled by
//! `str::replace`. The summary round-trip is JSON in both directions: the
//! monologue goes out as `{"old_monologue": [...]}` and must come back as
//! `{"new_monologue": [...]}`.

use crate::core_types::ThoughtEvent;
use crate::errors::AgentError;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

pub const RELEVANCE_INSTRUCTION: &str = r#"Your job is to determine whether the task and the history are relevant.
The task is a user request, while the history is one entry from the history log of a coding agent.
If the two are relevant to some extent, return RELEVANT.
If they are irrelevant, return IRRELEVANT.
If the history is about finalizing and confirming tasks, you MUST return IRRELEVANT.
You must return only one of the two words above, with nothing else.

Example 1:

Input: **task**describe about calculator.py. **history**{"content":"Here's what I want to do: Write a python file to convert temperature in Celsius to Fahrenheit.","extras":{"memories":[],"role":"assistant"},"observation":"recall"}

Output: IRRELEVANT

Example 2:

Input: **task**describe about calculator.py. **history**{"action":"think","args":{"thought":"I need to begin by planning the basic structure of a Python calculator. It will require a simple interface to take input and functions for basic arithmetic operations like addition, subtraction, multiplication, and division. An exception handling system will also be crucial to manage any input errors or arithmetic issues like division by zero."}}

Output: RELEVANT

Example 3:

Input: **task**describe about calculator.py. **history**{"action":"think","args":{"thought":"The tests for the calculator function passed successfully, which confirms that the basic functionality and error handling are working as expected. My task to implement a basic calculator in Python is now complete and fully tested. I should finalize my task and confirm completion."}}

Output: IRRELEVANT"#;

const RELEVANCE_INPUT: &str = "**task**{task} **history**{history}";

pub const MONOLOGUE_SUMMARY_PROMPT: &str = r#"Below is the internal monologue of an automated LLM agent. Each
thought is an item in a JSON array. The thoughts may be memories,
actions taken by the agent, or outputs from those actions.
Please return a new, smaller JSON array, which summarizes the
internal monologue. You can summarize individual thoughts, and
you can condense related thoughts together with a description
of their content.

{monologue}

Make the summaries as pithy and informative as possible.
Be specific about what happened and what was learned. The summary
will be used as keywords for searching for the original memory.
Be sure to preserve any key words or important information.

Your response must be in JSON format. It must be an object with the
key `new_monologue`, which is a JSON array containing the summarized monologue.
Each entry in the array must have an `action` key, and an `args` key.
The action key may be `summarize`, and `args.summary` should contain the summary.
You can also use the same action and args from the source monologue."#;

pub const START_TASK_ACTION: &str = "start_task";

/// Marker event recorded whenever a new task begins.
pub fn start_task(task: &str) -> ThoughtEvent {
    let mut event = ThoughtEvent::new();
    event.insert("action", json!(START_TASK_ACTION));
    event.insert(
        "args",
        json!({
            "task": task,
            "thought": format!("Here's what I want to do: {}", task),
        }),
    );
    event
}

pub fn is_start_task(event: &ThoughtEvent) -> bool {
    event.kind() == Some(START_TASK_ACTION)
}

pub fn relevance_input(task: &str, event: &ThoughtEvent) -> String {
    RELEVANCE_INPUT
        .replace("{task}", task)
        .replace("{history}", &event.to_string())
}

#[derive(Serialize)]
struct OldMonologue<'a> {
    old_monologue: &'a [ThoughtEvent],
}

pub fn summarize_prompt(thoughts: &[ThoughtEvent]) -> Result<String, AgentError> {
    let monologue = serde_json::to_string_pretty(&OldMonologue { old_monologue: thoughts })?;
    Ok(MONOLOGUE_SUMMARY_PROMPT.replace("{monologue}", &monologue))
}

/// Parses the model's summary into events.
///
/// The response is first parsed as-is. Models also like to wrap the JSON in
/// markdown fences or a sentence of prose, so fenced blocks and then every
/// embedded object carrying `new_monologue` are tried next.
pub fn parse_summary_response(response: &str) -> Result<Vec<ThoughtEvent>, AgentError> {
    let parsed = locate_summary(response).ok_or_else(|| {
        AgentError::ParsingError("Summary response contains no JSON object".to_string())
    })?;

    let entries = parsed
        .get("new_monologue")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AgentError::ParsingError("Summary response has no `new_monologue` array".to_string())
        })?;

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            ThoughtEvent::try_from(entry.clone()).map_err(|e| {
                AgentError::ParsingError(format!("Summary entry {} is not an event: {}", idx, e))
            })
        })
        .collect()
}

fn locate_summary(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    let fenced = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").ok()?;
    let from_fence = fenced
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|body| serde_json::from_str::<Value>(body.as_str().trim()).ok())
        .find(Value::is_object);
    if from_fence.is_some() {
        return from_fence;
    }

    text.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Value>()
            .next()?
            .ok()
            .filter(|value| value.get("new_monologue").is_some())
    })
}
