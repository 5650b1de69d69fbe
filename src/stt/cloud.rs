//! Cloud STT adapter (OpenAI Whisper API or any compatible endpoint).

use std::future::Future;
use std::pin::Pin;

use reqwest::multipart;
use tracing::debug;

use super::{AudioClip, Transcriber};

/// POST `{base_url}/audio/transcriptions` as multipart (`file` + `model`).
pub struct OpenAiStt {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiStt {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl Transcriber for OpenAiStt {
    fn transcribe<'a>(
        &'a self,
        clip: &'a AudioClip,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                bytes = clip.bytes.len(),
                mime = %clip.mime_type,
                "Sending audio to transcription API"
            );

            let file_part = multipart::Part::bytes(clip.bytes.clone())
                .file_name(clip.file_name.clone())
                .mime_str(&clip.mime_type)?;

            let form = multipart::Form::new()
                .text("model", self.model.clone())
                .part("file", file_part);

            let resp = self
                .client
                .post(format!("{}/audio/transcriptions", self.base_url))
                .bearer_auth(&self.api_key)
                .multipart(form)
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("Transcription API error {}: {}", status, body);
            }

            let json: serde_json::Value = resp.json().await?;
            let text = json["text"].as_str().unwrap_or("").to_string();

            Ok(text)
        })
    }
}
