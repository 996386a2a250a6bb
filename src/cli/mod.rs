//! CLI module - command definitions and handlers

mod ask;
mod config_cmd;
mod ingest;
mod overrides;
mod search;
mod serve;
mod status;

use clap::{Parser, Subcommand};

pub use ask::AskArgs;
pub use config_cmd::ConfigArgs;
pub use ingest::IngestArgs;
pub use overrides::BackendArgs;
pub use search::SearchArgs;
pub use serve::ServeArgs;
pub use status::StatusArgs;

/// devchat - retrieval-augmented chatbot for developers
#[derive(Parser)]
#[command(name = "devchat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question (one-shot or interactive)
    Ask(AskArgs),

    /// Show the chunks retrieved for a question
    Search(SearchArgs),

    /// Load web pages or files into the collection
    Ingest(IngestArgs),

    /// Show the collection's status
    Status(StatusArgs),

    /// Serve the question form over HTTP
    Serve(ServeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Log a warning when questions would be embedded with a different model
/// than the collection's points
///
/// The check is advisory: an unreachable store is left for the answering
/// path to report.
async fn check_embedding_model(config: &crate::config::Config) {
    let store = crate::store::QdrantStore::from_config(&config.vector_store, &config.http);
    match store.embedding_model_warning(&config.embedding.model_name()).await {
        Ok(Some(warning)) => tracing::warn!("{}", warning),
        Ok(None) => {}
        Err(e) => tracing::debug!("Skipping embedding model check: {:#}", e),
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Ask(args) => ask::run(args, self.quiet).await,
            Commands::Search(args) => search::run(args).await,
            Commands::Ingest(args) => ingest::run(args, self.quiet).await,
            Commands::Status(args) => status::run(args).await,
            Commands::Serve(args) => serve::run(args).await,
            Commands::Config(args) => config_cmd::run(args).await,
        }
    }
}
