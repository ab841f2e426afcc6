//! Stats command handler.

use super::open_store;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};

/// Show store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = open_store(config)?;
        let stats = store.stats().await;

        if self.json {
            let output = serde_json::json!({
                "dataDir": config.data_dir(),
                "documents": stats.documents,
                "chunks": stats.chunks,
                "dimension": stats.dimension,
                "embeddingProvider": config.embedding.provider,
                "embeddingModel": config.embedding.model,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Store: {}", config.data_dir().display());
            println!("  Documents: {}", stats.documents);
            println!("  Chunks: {}", stats.chunks);
            println!(
                "  Embeddings: {}/{} ({} dimensions)",
                config.embedding.provider, config.embedding.model, stats.dimension
            );
        }

        Ok(())
    }
}
