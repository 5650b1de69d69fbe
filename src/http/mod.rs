//! HTTP surface.
//!
//! JSON endpoints under `/api`, everything else served from the public
//! directory (the UI and the generated `preview.html`).

pub mod error;
pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::agent::AgentRunner;
use crate::conversation::sessions::SessionStore;
use crate::stt::Transcriber;
use crate::tts::SpeechSynthesizer;

pub use error::ApiError;

/// Header naming the conversation a request belongs to.
pub const SESSION_HEADER: &str = "x-session-id";

/// Recorded clips are small, but well above axum's 2 MB default.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Everything a handler needs.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub agent: Arc<AgentRunner>,
    pub transcriber: Arc<dyn Transcriber>,
    pub speech: Arc<SpeechSynthesizer>,
}

/// Build the application router.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let api = Router::new()
        .route("/agent", post(handlers::agent))
        .route("/stt", post(handlers::stt))
        .route("/tts", post(handlers::tts))
        .route("/voice-chat", post(handlers::voice_chat))
        .route(
            "/session",
            post(handlers::create_session).delete(handlers::delete_session),
        )
        .route("/history", get(handlers::history))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
}
