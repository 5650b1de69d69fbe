//! Voice Preview server entry point.
//!
//! Initializes logging and configuration, wires the backend clients into the
//! agent, and serves the HTTP API plus the static UI until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use voice_preview::agent::{AgentRunner, AgentSettings};
use voice_preview::config::{self, paths};
use voice_preview::conversation::sessions::{spawn_sweeper, SessionStore};
use voice_preview::http::{self, AppState};
use voice_preview::llm::{ChatBackend, OpenAiChat};
use voice_preview::services::logger;
use voice_preview::stt::OpenAiStt;
use voice_preview::tools::{ComposioClient, ToolHub, ToolRegistry};
use voice_preview::tts::{OpenAiTts, SpeechSynthesizer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init(&paths::get_log_dir())?;

    let config = config::load()?;
    let api_key = config.openai.api_key.clone().unwrap_or_default();
    let openai = &config.openai;

    let public_dir = PathBuf::from(&config.server.public_dir);
    tokio::fs::create_dir_all(&public_dir).await?;

    let chat: Arc<dyn ChatBackend> = Arc::new(OpenAiChat::new(&api_key, &openai.base_url));

    let remote = match config.composio.api_key.as_deref() {
        Some(key) => Some(ComposioClient::new(
            key,
            &config.composio.base_url,
            &config.composio.user_id,
        )),
        None => {
            warn!("COMPOSIO_API_KEY not set, remote tools are disabled");
            None
        }
    };
    let registry = Arc::new(ToolRegistry::new(public_dir.clone()));
    let tools = Arc::new(ToolHub::new(registry, remote));

    let agent = Arc::new(AgentRunner::new(
        chat.clone(),
        tools,
        AgentSettings {
            model: openai.chat_model.clone(),
            max_rounds: config.agent.max_rounds,
            tools: config.agent.tools.clone(),
        },
    ));

    let transcriber = Arc::new(OpenAiStt::new(&api_key, &openai.base_url, &openai.stt_model));
    let engine = Arc::new(OpenAiTts::new(
        &api_key,
        &openai.base_url,
        &openai.tts_model,
        &openai.tts_voice,
    ));
    let speech = Arc::new(SpeechSynthesizer::new(
        chat,
        engine,
        &openai.chat_model,
        config.speech.max_chars,
        &config.speech.fallback_phrase,
    ));

    let sessions = Arc::new(SessionStore::new(
        config.agent.system_prompt.as_str(),
        Duration::from_secs(config.sessions.idle_timeout_secs),
    ));
    let sweeper = spawn_sweeper(
        sessions.clone(),
        Duration::from_secs(config.sessions.sweep_interval_secs.max(1)),
    );

    let state = AppState {
        sessions,
        agent,
        transcriber,
        speech,
    };
    let app = http::router(state, &public_dir);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        public_dir = %public_dir.display(),
        "Voice Preview listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Voice Preview stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
