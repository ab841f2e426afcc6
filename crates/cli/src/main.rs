//! DocQA CLI
//!
//! Entry point for the `docqa` tool: runs the HTTP service and offers the
//! same document and question operations from the command line.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, DocumentsCommand, ServeCommand, StatsCommand};
use docqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// DocQA - question answering over your own documents
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Retrieval-augmented question answering over uploaded documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the vector index and metadata
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Add, list and delete indexed documents
    Documents(DocumentsCommand),

    /// Answer a question from the indexed documents
    Ask(AskCommand),

    /// Show store statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config {
        // `AppConfig::load` reads the file location from the environment
        std::env::set_var("DOCQA_CONFIG", path);
    }

    let config = AppConfig::load()?.with_overrides(
        cli.data_dir,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(
        config.logging.level.as_deref(),
        config.logging.no_color,
        config.logging.json,
    )?;

    config.validate()?;

    tracing::info!("DocQA CLI starting");
    tracing::debug!("Data dir: {:?}", config.data_dir());
    tracing::debug!(
        "Embedding: {}/{}, LLM: {}/{}",
        config.embedding.provider,
        config.embedding.model,
        config.llm.provider,
        config.llm.model
    );

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Documents(_) => "documents",
        Commands::Ask(_) => "ask",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Documents(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
