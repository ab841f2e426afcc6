//! Serve command handler.

use super::{build_answerer, shared_store};
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_server::AppState;
use std::sync::Arc;

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mut config = config.clone();
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let store = shared_store(&config)?;
        let answerer = build_answerer(&config)?;
        tracing::info!(
            provider = %config.llm.provider,
            model = answerer.model(),
            "Answer model configured"
        );

        let state = AppState::new(store, Arc::new(answerer))
            .with_max_body_bytes(config.server.max_body_bytes);

        docqa_server::serve(&config.bind_address(), state).await
    }
}
