//! Static server for the exported console frontend, fronted by the gate.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{middleware, Router};
use storedesk_core::gate::{gate_middleware, RequestGate};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

pub async fn run(dir: PathBuf, addr: &str) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Frontend directory {} does not exist", dir.display());
    }

    let gate = Arc::new(RequestGate::default());
    let app = Router::new()
        .fallback_service(ServeDir::new(&dir).append_index_html_on_directories(true))
        .layer(middleware::from_fn_with_state(gate, gate_middleware))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, dir = %dir.display(), "Serving console");
    println!("Serving {} on http://{}", dir.display(), addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
