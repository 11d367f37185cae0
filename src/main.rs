use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use campus_rag::commands::{ask, build_knowledge, search_knowledge, show_context, show_status};
use campus_rag::config::{Config, get_config_dir, run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "campus-rag")]
#[command(about = "Question answering over a university knowledge document")]
#[command(version)]
struct Cli {
    /// Configuration and data directory (defaults to ~/.campus-rag)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure embedding, retrieval and chat settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Build the knowledge index and save a snapshot
    Build {
        /// Rebuild even when the snapshot is up to date
        #[arg(long)]
        force: bool,
    },
    /// Search the knowledge base, falling back to lexical search
    Search {
        query: String,
        /// Number of results
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Print the context block sent to the chat model
    Context {
        query: String,
        /// Number of chunks
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Answer a question
    Ask { query: String },
    /// Show knowledge file, snapshot and backend status
    Status,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir()?,
    };

    if let Commands::Config { show: false } = cli.command {
        return run_interactive_config(&config_dir);
    }

    let config = Config::load(&config_dir)
        .with_context(|| format!("Failed to load configuration from {}", config_dir.display()))?;

    match cli.command {
        Commands::Config { .. } => show_config(&config),
        Commands::Build { force } => build_knowledge(config, force)?,
        Commands::Search { query, k } => search_knowledge(config, &query, k)?,
        Commands::Context { query, k } => show_context(config, &query, k)?,
        Commands::Ask { query } => ask(config, &query)?,
        Commands::Status => show_status(&config)?,
    }

    Ok(())
}
