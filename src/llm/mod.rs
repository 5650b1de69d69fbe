//! Chat-completion backend.
//!
//! Provides a dyn-compatible `ChatBackend` trait and the request/response
//! shapes of an OpenAI-compatible `/chat/completions` endpoint.

pub mod openai;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::conversation::protocol::{ToolCall, WireMessage};

pub use openai::OpenAiChat;

/// Request body for one chat completion.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<serde_json::Value>>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<WireMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: None,
        }
    }

    /// Attach tool schemas. An empty list is left off the request.
    pub fn with_tools(mut self, tools: Vec<serde_json::Value>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }
}

/// Response body of a chat completion (only the fields we read).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatCompletion {
    /// Completion carrying a single assistant message.
    pub fn from_message(content: Option<&str>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            choices: vec![Choice {
                message: AssistantMessage {
                    content: content.map(str::to_string),
                    tool_calls: if tool_calls.is_empty() {
                        None
                    } else {
                        Some(tool_calls)
                    },
                },
            }],
        }
    }

    pub fn message(&self) -> Option<&AssistantMessage> {
        self.choices.first().map(|c| &c.message)
    }

    /// Assistant text, or "" when absent.
    pub fn text(&self) -> &str {
        self.message()
            .and_then(|m| m.content.as_deref())
            .unwrap_or("")
    }

    /// Pending tool invocations, in the order the model listed them.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message()
            .and_then(|m| m.tool_calls.as_deref())
            .unwrap_or(&[])
    }
}

/// A chat-completion endpoint (dyn-compatible).
pub trait ChatBackend: Send + Sync {
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ChatCompletion>> + Send + 'a>>;
}
