//! Remote tool execution via the Composio REST API.
//!
//! - GET  `{base_url}/api/v3/tools/{slug}`          -- tool metadata + input schema
//! - POST `{base_url}/api/v3/tools/execute/{slug}`  -- run a tool for a user
//!
//! Used for tools we do not implement locally (e.g. NOTION_FETCH_DATA).

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{function_schema, ToolResponse};

#[derive(Debug, Deserialize)]
struct RemoteTool {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_parameters: Option<Value>,
}

pub struct ComposioClient {
    api_key: String,
    base_url: String,
    user_id: String,
    client: reqwest::Client,
}

impl ComposioClient {
    pub fn new(api_key: &str, base_url: &str, user_id: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch a remote tool's schema in function-tool format.
    pub async fn tool_schema(&self, slug: &str) -> anyhow::Result<Value> {
        let url = format!("{}/api/v3/tools/{}", self.base_url, slug);
        debug!(tool = %slug, "Fetching remote tool schema");

        let resp = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Composio request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Composio tool lookup {} failed {}: {}", slug, status, body);
        }

        let tool: RemoteTool = resp.json().await?;
        Ok(remote_schema(slug, tool))
    }

    /// Execute a remote tool with already-parsed arguments.
    pub async fn execute(&self, slug: &str, arguments: Value) -> anyhow::Result<ToolResponse> {
        let url = format!("{}/api/v3/tools/execute/{}", self.base_url, slug);
        info!(tool = %slug, "Executing remote tool");

        let body = json!({
            "user_id": self.user_id,
            "arguments": arguments,
        });

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Composio request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Composio execute {} failed {}: {}", slug, status, body);
        }

        let result: ToolResponse = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Invalid Composio response: {}", e))?;
        Ok(result)
    }
}

fn remote_schema(slug: &str, tool: RemoteTool) -> Value {
    let parameters = tool
        .input_parameters
        .unwrap_or_else(|| json!({"type": "object", "properties": {}}));
    function_schema(slug, tool.description.as_deref().unwrap_or(""), parameters)
}
