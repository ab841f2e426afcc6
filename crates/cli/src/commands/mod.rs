//! Command handlers for the DocQA CLI.

pub mod ask;
pub mod documents;
pub mod serve;
pub mod stats;

pub use ask::AskCommand;
pub use documents::DocumentsCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;

use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{create_provider, DocumentStore, EmbeddingConfig, StoreConfig};
use docqa_llm::{create_client, AnswerService};
use std::sync::Arc;

/// Open the persisted store described by `config`.
pub(crate) fn open_store(config: &AppConfig) -> AppResult<DocumentStore> {
    let embedder = create_provider(&EmbeddingConfig::from(&config.embedding))?;
    DocumentStore::open(StoreConfig::from_app_config(config)?, embedder)
}

/// Build the answer generator from the `llm` settings.
pub(crate) fn build_answerer(config: &AppConfig) -> AppResult<AnswerService> {
    let client = create_client(
        &config.llm.provider,
        config.llm.endpoint.as_deref(),
        config.llm.api_key.as_deref(),
    )?;

    Ok(AnswerService::new(client, config.llm.model.clone())?
        .with_max_tokens(config.llm.max_tokens)
        .with_temperature(config.llm.temperature))
}

pub(crate) fn shared_store(config: &AppConfig) -> AppResult<Arc<DocumentStore>> {
    open_store(config).map(Arc::new)
}
