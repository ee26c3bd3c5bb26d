use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Application-level error type. Every pipeline failure maps to exactly one
/// variant so callers can tell "service down" from "service returned garbage".
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Text generation service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed evaluation: {0}")]
    MalformedEvaluation(String),

    #[error("Invalid document structure: {0}")]
    InvalidDocumentStructure(String),

    #[error("Rendering failed: {message}")]
    RenderFailed {
        message: String,
        /// Upstream error text, when the rendering service returned one.
        details: Option<String>,
    },
}

impl AppError {
    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            AppError::MalformedEvaluation(_) => "MALFORMED_EVALUATION",
            AppError::InvalidDocumentStructure(_) => "INVALID_DOCUMENT_STRUCTURE",
            AppError::RenderFailed { .. } => "RENDER_FAILED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MalformedEvaluation(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidDocumentStructure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RenderFailed { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match &self {
            AppError::InvalidRequest(msg) => (msg.clone(), None),
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Upstream unavailable: {msg}");
                (
                    "The text generation service is unavailable. Please try again.".to_string(),
                    None,
                )
            }
            AppError::MalformedEvaluation(msg) => {
                tracing::error!("Malformed evaluation: {msg}");
                (
                    "Invalid response format from AI service".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::InvalidDocumentStructure(msg) => {
                tracing::error!("Invalid document structure: {msg}");
                ("Invalid HTML structure".to_string(), Some(msg.clone()))
            }
            AppError::RenderFailed { message, details } => {
                tracing::error!("Render failed: {message} ({details:?})");
                (message.clone(), details.clone())
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = Value::String(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
