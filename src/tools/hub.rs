//! Tool execution provider used by the agent loop.
//!
//! Routes each call to the local registry when the tool is implemented here,
//! otherwise to the remote provider (if one is configured).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::future::try_join_all;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{ComposioClient, ToolOutput, ToolProvider, ToolRegistry, ToolResponse};
use crate::conversation::protocol::ToolCall;
use crate::llm::ChatCompletion;

pub struct ToolHub {
    registry: Arc<ToolRegistry>,
    remote: Option<ComposioClient>,
}

impl ToolHub {
    pub fn new(registry: Arc<ToolRegistry>, remote: Option<ComposioClient>) -> Self {
        Self { registry, remote }
    }

    async fn execute_call(&self, call: &ToolCall) -> anyhow::Result<Value> {
        let slug = call.function.name.as_str();
        let response = match parse_arguments(&call.function.arguments) {
            Err(e) => ToolResponse::failure(format!("Invalid arguments for {}: {}", slug, e)),
            Ok(args) if self.registry.contains(slug) => self.registry.execute(slug, args).await,
            Ok(args) => match &self.remote {
                Some(remote) => remote.execute(slug, args).await?,
                None => ToolResponse::failure(format!("Unknown tool: {}", slug)),
            },
        };
        debug!(tool = %slug, call_id = %call.id, successful = response.successful, "Tool call finished");
        Ok(serde_json::to_value(response)?)
    }
}

/// Parse the model's JSON-encoded arguments. Blank means "no arguments".
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw)
}

impl ToolProvider for ToolHub {
    fn ensure_registered(&self) {
        self.registry.ensure_registered();
    }

    fn tools<'a>(
        &'a self,
        slugs: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let mut schemas = Vec::with_capacity(slugs.len());
            for slug in slugs {
                if let Some(def) = self.registry.get(slug) {
                    schemas.push(def.schema());
                } else if let Some(remote) = &self.remote {
                    schemas.push(remote.tool_schema(slug).await?);
                } else {
                    warn!(tool = %slug, "No remote tool provider configured, skipping tool");
                }
            }
            Ok(schemas)
        })
    }

    fn handle_tool_calls<'a>(
        &'a self,
        completion: &'a ChatCompletion,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolOutput>> + Send + 'a>> {
        Box::pin(async move {
            let calls = completion.tool_calls();
            let results = try_join_all(calls.iter().map(|call| self.execute_call(call))).await?;
            Ok(ToolOutput::Batch(results))
        })
    }
}
