use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::api::{self, SharedOrchestrator};

/// Upper bound for one chat turn including all upstream calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub async fn run(orchestrator: SharedOrchestrator, port: u16) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api::router(orchestrator))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Chat API listening at http://localhost:{port}");
    axum::serve(listener, app)
        .await
        .context("Server error")?;
    Ok(())
}
