//! grounded CLI — the main entry point.
//!
//! Commands:
//! - `ask`    — One grounded question, one cited answer
//! - `chat`   — Interactive grounded chat session
//! - `doctor` — Diagnose provider and index connectivity

use clap::{Parser, Subcommand};
use grounded_core::search::SearchMode;

mod commands;

#[derive(Parser)]
#[command(
    name = "grounded",
    about = "grounded — retrieval-augmented chat against a document index",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the grounded answer
    Ask {
        /// The question
        question: String,

        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Start an interactive chat session
    Chat {
        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Check configuration and provider connectivity
    Doctor,
}

/// Per-turn overrides shared by `ask` and `chat`.
#[derive(clap::Args, Clone)]
struct TurnArgs {
    /// Search mode: lexical, vector, or hybrid
    #[arg(short, long)]
    mode: Option<SearchMode>,

    /// Number of passages to retrieve
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Decoding temperature (0.0 to 1.0)
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Print the retrieved sources alongside the answer
    #[arg(long)]
    show_sources: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask { question, turn } => commands::ask::run(&question, &turn).await?,
        Commands::Chat { turn } => commands::chat::run(&turn).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
