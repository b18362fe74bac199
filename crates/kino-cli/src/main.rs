//! Kino Quality CLI - headless quality and event inspection
//!
//! Features:
//! - Source classification into qualities
//! - Scripted playback simulation over a simulated media element
//! - Preferred-quality persistence

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
mod script;

/// Kino Quality CLI - quality selection and event normalization toolkit
#[derive(Parser)]
#[command(name = "kino-quality")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Inspect quality classification and playback event normalization", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a source list into qualities
    Classify {
        /// JSON file with an array of sources
        sources: PathBuf,

        /// Preferred container when a quality has several sources (mp4, webm)
        #[arg(short, long, default_value = "mp4")]
        prefer: String,

        /// MIME prefixes the engine can play (defaults to mp4, webm, ogg)
        #[arg(short, long, value_delimiter = ',')]
        accept: Vec<String>,
    },

    /// Replay a script of operations and media events through a controller
    Simulate {
        /// Player config JSON (sources, options, l10n, capabilities)
        config: PathBuf,

        /// Script JSON: array of operations and raw media events
        script: PathBuf,

        /// Preference store file
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Read or write the stored quality preference
    Preference {
        /// Preference store file
        #[arg(short, long, default_value = "kino-quality.json")]
        store: PathBuf,

        /// Quality name to store
        #[arg(long)]
        set: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    kino_quality::init();

    match cli.command {
        Commands::Classify { sources, prefer, accept } => {
            commands::classify(&sources, &prefer, &accept, &cli.format)?;
        }
        Commands::Simulate { config, script, store } => {
            commands::simulate(&config, &script, store, &cli.format).await?;
        }
        Commands::Preference { store, set } => {
            commands::preference(&store, set.as_deref(), &cli.format)?;
        }
    }

    Ok(())
}
