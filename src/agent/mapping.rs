//! Mapping tool execution output back onto the calls that requested it.
//!
//! The provider answers a batch of calls either with one value per call or
//! with a single value. The chat endpoint only accepts a tool result that
//! names the call it answers, so results are correlated by position where
//! the shapes line up, and degrade to an uncorrelated system note (or a
//! placeholder) where they don't.

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use crate::conversation::protocol::{ToolCall, WireMessage};
use crate::conversation::{MessageStore, Turn};
use crate::tools::ToolOutput;

/// Stand-in content when results cannot be mapped at all.
pub const PLACEHOLDER_RESULT: &str = "[tool executed]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelatedResult {
    pub call_id: String,
    pub content: String,
}

/// How one round's tool output is fed back to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResultMapping {
    /// One result per call, each carrying its call id.
    Correlated(Vec<CorrelatedResult>),
    /// Output whose shape does not line up with the calls.
    Uncorrelated(String),
    /// Mapping failed; the round is kept with a placeholder.
    Placeholder,
}

#[derive(Debug, thiserror::Error)]
enum MappingError {
    #[error("tool call has an empty id")]
    MissingCallId,
    #[error("duplicate tool call id {0}")]
    DuplicateCallId(String),
    #[error("could not render tool result: {0}")]
    Render(#[from] serde_json::Error),
}

/// Correlate `output` with `calls`. Never fails; see [`ToolResultMapping`].
pub fn map_tool_results(calls: &[ToolCall], output: &ToolOutput) -> ToolResultMapping {
    match try_map(calls, output) {
        Ok(mapping) => mapping,
        Err(e) => {
            warn!(error = %e, calls = calls.len(), "Tool result mapping failed, using placeholder");
            ToolResultMapping::Placeholder
        }
    }
}

fn try_map(calls: &[ToolCall], output: &ToolOutput) -> Result<ToolResultMapping, MappingError> {
    match output {
        ToolOutput::Batch(results) if results.len() == calls.len() && !calls.is_empty() => {
            check_call_ids(calls)?;
            let correlated = calls
                .iter()
                .zip(results)
                .map(|(call, result)| {
                    Ok(CorrelatedResult {
                        call_id: call.id.clone(),
                        content: render(result)?,
                    })
                })
                .collect::<Result<Vec<_>, MappingError>>()?;
            Ok(ToolResultMapping::Correlated(correlated))
        }
        _ if calls.len() == 1 => {
            check_call_ids(calls)?;
            Ok(ToolResultMapping::Correlated(vec![CorrelatedResult {
                call_id: calls[0].id.clone(),
                content: render_output(output)?,
            }]))
        }
        _ => Ok(ToolResultMapping::Uncorrelated(render_output(output)?)),
    }
}

fn check_call_ids(calls: &[ToolCall]) -> Result<(), MappingError> {
    let mut seen = HashSet::with_capacity(calls.len());
    for call in calls {
        if call.id.is_empty() {
            return Err(MappingError::MissingCallId);
        }
        if !seen.insert(call.id.as_str()) {
            return Err(MappingError::DuplicateCallId(call.id.clone()));
        }
    }
    Ok(())
}

/// Strings pass through as-is; anything else is JSON-encoded.
fn render(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other),
    }
}

fn render_output(output: &ToolOutput) -> Result<String, serde_json::Error> {
    match output {
        ToolOutput::Single(value) => render(value),
        ToolOutput::Batch(values) => serde_json::to_string(values),
    }
}

impl ToolResultMapping {
    /// Append the mapped results to the local wire list and the store.
    pub fn apply(self, local: &mut Vec<WireMessage>, store: &MessageStore) {
        match self {
            Self::Correlated(results) => {
                for result in results {
                    local.push(WireMessage::tool_result(result.call_id, result.content.as_str()));
                    store.append(Turn::tool(result.content));
                }
            }
            Self::Uncorrelated(content) => {
                local.push(WireMessage::tool_note(&content));
                store.append(Turn::tool(content));
            }
            Self::Placeholder => {
                local.push(WireMessage::tool_note(PLACEHOLDER_RESULT));
                store.append(Turn::tool(PLACEHOLDER_RESULT));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::protocol::WireRole;
    use crate::conversation::Role;
    use serde_json::json;

    fn call(id: &str) -> ToolCall {
        ToolCall::function(id, "WRITE_FULL_HTML_PREVIEW", "{}")
    }

    #[test]
    fn test_same_length_batch_pairs_by_position() {
        let calls = vec![call("c1"), call("c2"), call("c3")];
        let output = ToolOutput::Batch(vec![json!({"n": 1}), json!("plain"), json!(3)]);

        let ToolResultMapping::Correlated(results) = map_tool_results(&calls, &output) else {
            panic!("Expected correlated results");
        };
        let ids: Vec<&str> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert_eq!(results[0].content, r#"{"n":1}"#);
        assert_eq!(results[1].content, "plain");
        assert_eq!(results[2].content, "3");
    }

    #[test]
    fn test_single_call_with_single_result() {
        let calls = vec![call("only")];
        let output = ToolOutput::Single(json!({"successful": true}));
        assert_eq!(
            map_tool_results(&calls, &output),
            ToolResultMapping::Correlated(vec![CorrelatedResult {
                call_id: "only".into(),
                content: r#"{"successful":true}"#.into(),
            }])
        );
    }

    #[test]
    fn test_single_call_with_mismatched_batch_is_still_correlated() {
        let calls = vec![call("only")];
        let output = ToolOutput::Batch(vec![json!(1), json!(2)]);
        let ToolResultMapping::Correlated(results) = map_tool_results(&calls, &output) else {
            panic!("Expected correlated results");
        };
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].call_id, "only");
        assert_eq!(results[0].content, "[1,2]");
    }

    #[test]
    fn test_other_shapes_fall_back_to_one_uncorrelated_result() {
        let calls = vec![call("a"), call("b")];
        assert_eq!(
            map_tool_results(&calls, &ToolOutput::Single(json!({"ok": true}))),
            ToolResultMapping::Uncorrelated(r#"{"ok":true}"#.into())
        );
        assert_eq!(
            map_tool_results(&calls, &ToolOutput::Batch(vec![json!(1)])),
            ToolResultMapping::Uncorrelated("[1]".into())
        );
    }

    #[test]
    fn test_bad_call_ids_become_placeholder() {
        let dup = vec![call("x"), call("x")];
        let output = ToolOutput::Batch(vec![json!(1), json!(2)]);
        assert_eq!(map_tool_results(&dup, &output), ToolResultMapping::Placeholder);

        let empty = vec![call("")];
        assert_eq!(
            map_tool_results(&empty, &ToolOutput::Single(json!(1))),
            ToolResultMapping::Placeholder
        );
    }

    #[test]
    fn test_apply_correlated() {
        let store = MessageStore::new("sys");
        let mut local = Vec::new();
        ToolResultMapping::Correlated(vec![CorrelatedResult {
            call_id: "c1".into(),
            content: "done".into(),
        }])
        .apply(&mut local, &store);

        assert_eq!(local, vec![WireMessage::tool_result("c1", "done")]);
        assert_eq!(store.snapshot().last().unwrap(), &Turn::tool("done"));
    }

    #[test]
    fn test_apply_fallbacks_use_system_notes() {
        let store = MessageStore::new("sys");
        let mut local = Vec::new();
        ToolResultMapping::Uncorrelated("raw".into()).apply(&mut local, &store);
        ToolResultMapping::Placeholder.apply(&mut local, &store);

        assert_eq!(local[0].role, WireRole::System);
        assert_eq!(local[0].content, "TOOL_RESULT\nraw");
        assert_eq!(local[1].content, "TOOL_RESULT\n[tool executed]");

        let turns = store.snapshot();
        assert_eq!(turns[1], Turn::tool("raw"));
        assert_eq!(turns[2].role, Role::Tool);
        assert_eq!(turns[2].content, PLACEHOLDER_RESULT);
    }
}
