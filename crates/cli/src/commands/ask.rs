//! Ask command handler.

use super::{build_answerer, open_store};
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::rag::{self, DEFAULT_TOP_K};

/// Answer a question from the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let store = open_store(config)?;
        let answerer = build_answerer(config)?;

        let response = rag::ask(&store, &answerer, &self.question, self.top_k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        println!("Answer:");
        println!("{}", response.answer);
        println!();

        if response.sources.is_empty() {
            println!("Sources: (no sources available)");
        } else {
            println!("Sources:");
            for hit in &response.sources {
                println!(
                    "- {} [{}#{}] (distance {:.4})",
                    hit.title, hit.document_id, hit.chunk_index, hit.distance
                );
            }
        }

        Ok(())
    }
}
