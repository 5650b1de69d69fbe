//! Speech-to-Text.
//!
//! Provides a dyn-compatible `Transcriber` trait with an OpenAI Whisper API
//! implementation (`cloud`), plus the adapter that rejects empty results.

pub mod cloud;

use std::future::Future;
use std::pin::Pin;

use tracing::info;

pub use cloud::OpenAiStt;

/// Recorded audio as uploaded by the browser.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, file_name: Option<&str>, mime_type: Option<&str>) -> Self {
        Self {
            bytes,
            file_name: file_name.unwrap_or("input.webm").to_string(),
            mime_type: mime_type.unwrap_or("audio/webm").to_string(),
        }
    }
}

/// Common trait for STT engines.
pub trait Transcriber: Send + Sync {
    /// Transcribe the clip. May return an empty string.
    fn transcribe<'a>(
        &'a self,
        clip: &'a AudioClip,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}

/// Transcribe `clip`, failing if the engine heard nothing.
pub async fn transcribe_audio(engine: &dyn Transcriber, clip: &AudioClip) -> anyhow::Result<String> {
    let text = engine.transcribe(clip).await?;
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Transcription failed");
    }
    info!(chars = text.len(), "Transcription complete");
    Ok(text.to_string())
}
