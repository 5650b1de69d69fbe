//! Cloud TTS adapter (OpenAI audio speech API or any compatible endpoint).

use std::future::Future;
use std::pin::Pin;

use tracing::info;

use super::SpeechEngine;

/// OpenAI TTS via REST.
///
/// POST `{base_url}/audio/speech`
/// Body: `{"model": "gpt-4o-mini-tts", "input": "text", "voice": "alloy", "response_format": "mp3"}`
/// Returns mp3 bytes.
pub struct OpenAiTts {
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
    client: reqwest::Client,
}

impl OpenAiTts {
    pub fn new(api_key: &str, base_url: &str, model: &str, voice: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            voice: voice.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl SpeechEngine for OpenAiTts {
    fn synthesize<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            info!(voice = %self.voice, text_len = text.len(), "OpenAI TTS request");

            let body = serde_json::json!({
                "model": self.model,
                "input": text,
                "voice": self.voice,
                "response_format": "mp3",
            });

            let resp = self
                .client
                .post(format!("{}/audio/speech", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("OpenAI TTS request failed: {}", e))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("OpenAI TTS API error {}: {}", status, body);
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read OpenAI TTS response: {}", e))?;

            info!(bytes = bytes.len(), "OpenAI TTS synthesis complete");
            Ok(bytes.to_vec())
        })
    }

    fn mime_type(&self) -> &'static str {
        "audio/mpeg"
    }
}
