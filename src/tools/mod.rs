//! Tools the model may call.
//!
//! - `registry`     -- locally implemented tools, registered once per process
//! - `html_preview` -- WRITE_FULL_HTML_PREVIEW (overwrites the preview page)
//! - `composio`     -- remote tool execution API (Notion and friends)
//! - `hub`          -- the execution provider the agent talks to
//!
//! Tool failures are returned as a [`ToolResponse`] with `successful: false`
//! rather than as errors, so the model can see them and react.

pub mod composio;
pub mod hub;
pub mod html_preview;
pub mod registry;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::llm::ChatCompletion;

pub use composio::ComposioClient;
pub use hub::ToolHub;
pub use registry::ToolRegistry;

/// Result payload of a single tool execution.
///
/// ```json
/// { "data": {...}, "error": null, "successful": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub successful: bool,
}

impl ToolResponse {
    pub fn success(data: Value) -> Self {
        Self {
            data,
            error: None,
            successful: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::failure_with_data(json!({}), message)
    }

    pub fn failure_with_data(data: Value, message: impl Into<String>) -> Self {
        Self {
            data,
            error: Some(message.into()),
            successful: false,
        }
    }
}

/// What an execution provider returns for one batch of tool calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// One value for the whole batch.
    Single(Value),
    /// One value per invocation, in invocation order.
    Batch(Vec<Value>),
}

/// Executor half of a locally implemented tool.
pub trait ToolHandler: Send + Sync {
    /// Check the input against the tool's schema. Runs before `execute`.
    fn validate(&self, input: &Value) -> Result<(), String>;

    fn execute(&self, input: Value) -> Pin<Box<dyn Future<Output = ToolResponse> + Send + '_>>;
}

/// A locally implemented tool: metadata, input schema and executor.
#[derive(Clone)]
pub struct ToolDefinition {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    /// Schema in the chat endpoint's function-tool format.
    pub fn schema(&self) -> Value {
        function_schema(&self.slug, &self.description, self.input_schema.clone())
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("slug", &self.slug)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Build a `{"type": "function", "function": {...}}` tool schema.
pub fn function_schema(slug: &str, description: &str, parameters: Value) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": slug,
            "description": description,
            "parameters": parameters,
        }
    })
}

/// Registers tools, lists their schemas and executes model-requested calls.
pub trait ToolProvider: Send + Sync {
    /// Register the known tool set. Idempotent.
    fn ensure_registered(&self);

    /// Schemas for the given tool slugs.
    fn tools<'a>(
        &'a self,
        slugs: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Value>>> + Send + 'a>>;

    /// Execute every pending tool call in `completion`.
    fn handle_tool_calls<'a>(
        &'a self,
        completion: &'a ChatCompletion,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolOutput>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_error_and_flag() {
        let json = serde_json::to_value(ToolResponse::failure("boom")).unwrap();
        assert_eq!(json["successful"], false);
        assert_eq!(json["error"], "boom");
        assert!(json["data"].is_object());
    }

    #[test]
    fn test_success_serializes_null_error() {
        let json = serde_json::to_value(ToolResponse::success(json!({"x": 1}))).unwrap();
        assert_eq!(json["successful"], true);
        assert!(json["error"].is_null());
        assert_eq!(json["data"]["x"], 1);
    }

    #[test]
    fn test_function_schema_shape() {
        let schema = function_schema("SLUG", "does things", json!({"type": "object"}));
        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "SLUG");
        assert_eq!(schema["function"]["parameters"]["type"], "object");
    }
}
