//! Axum route handler for the Evaluation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::errors::AppError;
use crate::evaluation::models::{Evaluation, EvaluationRequest};
use crate::state::AppState;

/// POST /api/v1/evaluate
///
/// Scores a CV against a job role. Returns the Evaluation as camelCase JSON.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Json<Evaluation>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let evaluation = state.pipeline.evaluate(request).await?;
    Ok(Json(evaluation))
}
