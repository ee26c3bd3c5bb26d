//! Axum route handler for the Rewrite API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::AppError;
use crate::rewrite::models::{RewriteBody, RewriteRequest};
use crate::state::AppState;

/// POST /api/v1/rewrite
///
/// Rewrites the CV for the role using a prior evaluation and returns the
/// rendered PDF as an attachment.
pub async fn handle_rewrite(
    State(state): State<AppState>,
    payload: Result<Json<RewriteBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let request = RewriteRequest::try_from(body)?;

    let output = state.pipeline.rewrite(request).await?;

    let disposition = format!("attachment; filename=\"{}\"", output.filename);
    Ok((
        [
            (header::CONTENT_TYPE, output.document.media_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        output.document.binary,
    )
        .into_response())
}
