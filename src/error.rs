use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchitectError {
    #[error("backend communication failure: {0}")]
    Backend(#[from] reqwest::Error),

    #[error("backend communication failure: status {status}: {body}")]
    BackendStatus { status: u16, body: String },

    #[error("empty response from LLM")]
    EmptyCompletion,

    #[error("invalid configuration for '{key}': {reason}")]
    Config { key: String, reason: String },
}

impl ArchitectError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Backend(_) | Self::BackendStatus { .. } => StatusCode::BAD_GATEWAY,
            Self::EmptyCompletion | Self::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Backend(_) | Self::BackendStatus { .. } => "backend_failure",
            Self::EmptyCompletion => "empty_completion",
            Self::Config { .. } => "configuration",
        }
    }
}

impl IntoResponse for ArchitectError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.error_kind(),
            "message": self.to_string(),
        });
        (self.status_code(), axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ArchitectError>;
