//! OpenAI-compatible chat completions over REST.
//!
//! POST `{base_url}/chat/completions`

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use super::{ChatBackend, ChatCompletion, ChatRequest};

pub struct OpenAiChat {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiChat {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl ChatBackend for OpenAiChat {
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ChatCompletion>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                model = %request.model,
                messages = request.messages.len(),
                tools = request.tools.as_ref().map_or(0, Vec::len),
                "Chat completion request"
            );

            let resp = self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("Chat completion request failed: {}", e))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("Chat completion API error {}: {}", status, body);
            }

            let completion: ChatCompletion = resp
                .json()
                .await
                .map_err(|e| anyhow::anyhow!("Invalid chat completion response: {}", e))?;

            debug!(
                text_len = completion.text().len(),
                tool_calls = completion.tool_calls().len(),
                "Chat completion received"
            );
            Ok(completion)
        })
    }
}
