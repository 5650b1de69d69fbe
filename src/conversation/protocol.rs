//! Wire-shaped messages for the chat-completion endpoint.
//!
//! Stored turns only know four roles. The endpoint additionally needs the
//! assistant's pending tool calls and, on tool results, the id of the call
//! being answered. Those only live for one agent run and are never stored.

use serde::{Deserialize, Serialize};

use super::{Role, Turn};

/// Prefix that marks a system message as tool output.
pub const TOOL_RESULT_MARKER: &str = "TOOL_RESULT\n";

/// Role as understood by the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A model-requested tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as the model produced them.
    #[serde(default)]
    pub arguments: String,
}

fn default_call_type() -> String {
    "function".into()
}

impl ToolCall {
    pub fn function(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: default_call_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// One message in a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    fn plain(role: WireRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(WireRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(WireRole::User, content)
    }

    /// Assistant turn carrying the calls it requested (if any).
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: WireRole::Assistant,
            content: content.into(),
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            tool_call_id: None,
        }
    }

    /// Result of one tool call, correlated by id.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: WireRole::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    /// Uncorrelated tool output, folded into a system note.
    pub fn tool_note(content: &str) -> Self {
        Self::system(format!("{TOOL_RESULT_MARKER}{content}"))
    }
}

/// Convert stored turns into the endpoint's message list.
///
/// `tool` turns become system notes prefixed with [`TOOL_RESULT_MARKER`];
/// everything else passes through verbatim.
pub fn to_wire(turns: &[Turn]) -> Vec<WireMessage> {
    turns
        .iter()
        .map(|turn| match turn.role {
            Role::System => WireMessage::system(turn.content.as_str()),
            Role::User => WireMessage::user(turn.content.as_str()),
            Role::Assistant => WireMessage::assistant(turn.content.as_str(), Vec::new()),
            Role::Tool => WireMessage::tool_note(&turn.content),
        })
        .collect()
}
