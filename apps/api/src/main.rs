mod config;
mod errors;
mod evaluation;
mod llm_client;
mod pipeline;
mod render;
mod rewrite;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::pipeline::Pipeline;
use crate::render::build_renderer_chain;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Rewriter API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let completion = CompletionClient::new(config.openai.clone())?;
    info!(
        "Completion client initialized (model: {}, timeout: {:?})",
        completion.model(),
        config.openai.timeout
    );

    // Initialize renderers (primary + optional fallback, fixed for the process lifetime)
    let renderer = build_renderer_chain(&config)?;
    let renderers = renderer.describe();
    info!("Renderer chain: {renderers}");

    let state = AppState {
        pipeline: Arc::new(Pipeline::new(Arc::new(completion), Arc::new(renderer))),
        renderers,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
