//! docqa-server: HTTP surface for the document QA service.
//!
//! Exposes document ingestion (JSON and PDF uploads), listing, deletion and
//! question answering over a shared [`docqa_knowledge::DocumentStore`].

/// REST API layer: Axum router, HTTP handlers, models and error mapping.
pub mod api;

pub use api::create_router;
pub use api::handlers::AppState;

use docqa_core::{AppError, AppResult};

/// Bind `addr` and serve the API until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> AppResult<()> {
    let stats = state.store.stats().await;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        documents = stats.documents,
        chunks = stats.chunks,
        "DocQA server ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("DocQA server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
