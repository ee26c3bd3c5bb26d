use std::sync::Arc;

use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every request runs its own pass through the pipeline.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Human-readable renderer chain, e.g. `pdflayer -> selectpdf`.
    pub renderers: String,
}
