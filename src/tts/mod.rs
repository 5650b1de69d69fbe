//! Text-to-Speech.
//!
//! `SpeechEngine` turns text into encoded audio. `SpeechSynthesizer` sits in
//! front of it and keeps overly long replies within what the engine accepts,
//! condensing them with the chat model or truncating as a last resort.

pub mod cloud;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use base64::Engine as _;
use serde::Serialize;
use tracing::{info, warn};

use crate::agent::prompts::SPOKEN_SUMMARY_INSTRUCTION;
use crate::conversation::protocol::WireMessage;
use crate::llm::{ChatBackend, ChatRequest};

pub use cloud::OpenAiTts;

/// Common trait for TTS engines.
pub trait SpeechEngine: Send + Sync {
    /// Synthesize `text` into encoded audio bytes.
    fn synthesize<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send + 'a>>;

    /// MIME type of the bytes returned by `synthesize`.
    fn mime_type(&self) -> &'static str;
}

/// Text actually handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechInput {
    Unchanged(String),
    /// Spoken summary produced by the chat model. May be empty, in which
    /// case the fallback phrase is spoken.
    Condensed(String),
    /// Cut at the character limit.
    Truncated(String),
}

impl SpeechInput {
    pub fn into_text(self) -> String {
        match self {
            Self::Unchanged(s) | Self::Condensed(s) | Self::Truncated(s) => s,
        }
    }
}

/// Encoded audio ready for the browser.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechClip {
    pub audio_base64: String,
    pub mime_type: String,
}

pub struct SpeechSynthesizer {
    chat: Arc<dyn ChatBackend>,
    engine: Arc<dyn SpeechEngine>,
    chat_model: String,
    max_chars: usize,
    fallback_phrase: String,
}

impl SpeechSynthesizer {
    pub fn new(
        chat: Arc<dyn ChatBackend>,
        engine: Arc<dyn SpeechEngine>,
        chat_model: &str,
        max_chars: usize,
        fallback_phrase: &str,
    ) -> Self {
        Self {
            chat,
            engine,
            chat_model: chat_model.to_string(),
            max_chars,
            fallback_phrase: fallback_phrase.to_string(),
        }
    }

    /// Decide what text to speak. Never fails.
    pub async fn prepare_input(&self, text: &str) -> SpeechInput {
        let chars = text.chars().count();
        if chars <= self.max_chars {
            return SpeechInput::Unchanged(text.to_string());
        }

        info!(chars, max_chars = self.max_chars, "Reply too long for speech, condensing");
        match self.condense(text).await {
            Ok(condensed) if condensed.chars().count() > self.max_chars => {
                SpeechInput::Truncated(truncate_chars(&condensed, self.max_chars))
            }
            Ok(condensed) => {
                if condensed.is_empty() {
                    warn!("Condensation returned nothing");
                }
                SpeechInput::Condensed(condensed)
            }
            Err(e) => {
                warn!(error = %e, "Condensation failed, truncating");
                SpeechInput::Truncated(truncate_chars(text, self.max_chars))
            }
        }
    }

    /// Synthesize `text`, returning base64 audio and its MIME type.
    pub async fn synthesize(&self, text: &str) -> anyhow::Result<SpeechClip> {
        let mut input = self.prepare_input(text).await.into_text();
        if input.is_empty() {
            input = self.fallback_phrase.clone();
        }

        let audio = self.engine.synthesize(&input).await?;
        Ok(SpeechClip {
            audio_base64: base64::engine::general_purpose::STANDARD.encode(audio),
            mime_type: self.engine.mime_type().to_string(),
        })
    }

    async fn condense(&self, text: &str) -> anyhow::Result<String> {
        let request = ChatRequest::new(
            self.chat_model.as_str(),
            vec![
                WireMessage::system(SPOKEN_SUMMARY_INSTRUCTION),
                WireMessage::user(text),
            ],
        );
        let completion = self.chat.complete(&request).await?;
        Ok(completion.text().trim().to_string())
    }
}

/// First `max` characters of `text`, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
