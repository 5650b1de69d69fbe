use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Failure of an API request. Rendered as `{ "error": message }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request itself is unusable (400).
    #[error("{0}")]
    BadRequest(&'static str),
    /// A backend call failed (500).
    #[error("{0}")]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    pub fn missing_text() -> Self {
        Self::BadRequest("Missing text")
    }

    pub fn missing_audio() -> Self {
        Self::BadRequest("No audio file provided")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Upstream(e) = &self {
            error!(error = %format!("{:#}", e), "Request failed");
        }
        let message = match self.to_string() {
            m if m.is_empty() => "Unknown error".to_string(),
            m => m,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
