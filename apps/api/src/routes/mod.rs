pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers::handle_evaluate;
use crate::rewrite::handlers::handle_rewrite;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/evaluate", post(handle_evaluate))
        .route("/api/v1/rewrite", post(handle_rewrite))
        .with_state(state)
}
