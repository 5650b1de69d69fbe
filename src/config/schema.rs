use serde::{Deserialize, Serialize};

use crate::agent::prompts::DEFAULT_SYSTEM_PROMPT;
use crate::tools::html_preview;

/// Root configuration, stored as camelCase JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub composio: ComposioConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
}

/// HTTP listener and static files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Served at `/`; `preview.html` is written here.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_dir: default_public_dir(),
        }
    }
}

/// OpenAI-compatible endpoint and model names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            chat_model: default_chat_model(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_tools")]
    pub tools: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            system_prompt: default_system_prompt(),
            tools: default_tools(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    /// Replies longer than this (in characters) are condensed before TTS.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_fallback_phrase")]
    pub fallback_phrase: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            fallback_phrase: default_fallback_phrase(),
        }
    }
}

/// Remote tool API. Remote tools are skipped when no key is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposioConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_composio_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for ComposioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_composio_base_url(),
            user_id: default_user_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsConfig {
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

// -- defaults --

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}
fn default_public_dir() -> String {
    "public".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_chat_model() -> String {
    "gpt-5".into()
}
fn default_stt_model() -> String {
    "whisper-1".into()
}
fn default_tts_model() -> String {
    "gpt-4o-mini-tts".into()
}
fn default_tts_voice() -> String {
    "alloy".into()
}
fn default_max_rounds() -> usize {
    8
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}
fn default_tools() -> Vec<String> {
    vec![
        html_preview::SLUG.into(),
        "NOTION_FETCH_DATA".into(),
        "NOTION_FETCH_BLOCK_CONTENTS".into(),
    ]
}
fn default_max_chars() -> usize {
    6000
}
fn default_fallback_phrase() -> String {
    "I could not generate a response.".into()
}
fn default_composio_base_url() -> String {
    "https://backend.composio.dev".into()
}
fn default_user_id() -> String {
    "default".into()
}
fn default_idle_timeout_secs() -> u64 {
    60 * 60
}
fn default_sweep_interval_secs() -> u64 {
    60
}
