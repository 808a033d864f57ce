use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use llm_core::LlmError;
use serde::Serialize;
use thiserror::Error;

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The LLM turn failed; the responder has already logged it.
    #[error("LLM error: {0}")]
    Upstream(#[from] LlmError),
}

/// Error response structure
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(e) => (StatusCode::BAD_GATEWAY, format!("LLM error: {e}")),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
