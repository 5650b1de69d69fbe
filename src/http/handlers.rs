//! Route handlers. Each one resolves the session, does its work, and maps
//! failures through [`ApiError`].

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{ApiError, AppState, SESSION_HEADER};
use crate::conversation::sessions::DEFAULT_SESSION;
use crate::conversation::Role;
use crate::stt::{transcribe_audio, AudioClip};

type ApiResult = Result<Json<Value>, ApiError>;

/// `POST /api/agent {text}` -> `{text}`
pub async fn agent(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    let text = parse_text(&body)?;
    let session = session_id(&headers);
    let store = state.sessions.get_or_create(&session);

    let reply = state.agent.run(&store, &text).await?;
    Ok(Json(json!({ "text": reply })))
}

/// `POST /api/stt` (multipart `audio`) -> `{transcript}`
pub async fn stt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let clip = read_audio(multipart).await?;
    let transcript = transcribe_audio(state.transcriber.as_ref(), &clip).await?;
    Ok(Json(json!({ "transcript": transcript })))
}

/// `POST /api/tts {text}` -> `{audioBase64, mimeType}`
pub async fn tts(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let text = parse_text(&body)?;
    let clip = state.speech.synthesize(&text).await?;
    Ok(Json(json!({
        "audioBase64": clip.audio_base64,
        "mimeType": clip.mime_type,
    })))
}

/// `POST /api/voice-chat` (multipart `audio`) -> `{transcript, text, audioBase64, mimeType}`
pub async fn voice_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let clip = read_audio(multipart).await?;
    let session = session_id(&headers);

    let transcript = transcribe_audio(state.transcriber.as_ref(), &clip).await?;
    let store = state.sessions.get_or_create(&session);
    let reply = state.agent.run(&store, &transcript).await?;
    let speech = state.speech.synthesize(&reply).await?;

    info!(session = %session, "Voice chat turn complete");
    Ok(Json(json!({
        "transcript": transcript,
        "text": reply,
        "audioBase64": speech.audio_base64,
        "mimeType": speech.mime_type,
    })))
}

/// `POST /api/session` -> `{sessionId}`
pub async fn create_session(State(state): State<AppState>) -> Json<Value> {
    let id = state.sessions.create();
    Json(json!({ "sessionId": id }))
}

/// `DELETE /api/session` -> 204
pub async fn delete_session(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    state.sessions.remove(&session_id(&headers));
    StatusCode::NO_CONTENT
}

/// `GET /api/history` -> `{messages: [{role, content}]}`
///
/// Only user and assistant turns; system prompt and tool records stay private.
pub async fn history(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let messages: Vec<Value> = state
        .sessions
        .get(&session_id(&headers))
        .map(|store| store.snapshot())
        .unwrap_or_default()
        .into_iter()
        .filter(|turn| matches!(turn.role, Role::User | Role::Assistant))
        .map(|turn| json!({ "role": turn.role, "content": turn.content }))
        .collect();
    Json(json!({ "messages": messages }))
}

/// Session named by the request header, or the shared default session.
fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

/// Pull a non-empty string `text` out of a JSON body.
fn parse_text(body: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Request body is not JSON");
        ApiError::missing_text()
    })?;
    match value.get("text").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ApiError::missing_text()),
    }
}

/// First multipart field named `audio` that carries a file.
async fn read_audio(multipart: Result<Multipart, MultipartRejection>) -> Result<AudioClip, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "Request is not multipart");
        ApiError::missing_audio()
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::missing_audio())?
    {
        if field.name() != Some("audio") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(ApiError::missing_audio());
        };
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|_| ApiError::missing_audio())?;
        debug!(file = %file_name, bytes = bytes.len(), "Received audio upload");
        return Ok(AudioClip::new(bytes.to_vec(), Some(&file_name), mime_type.as_deref()));
    }

    Err(ApiError::missing_audio())
}
