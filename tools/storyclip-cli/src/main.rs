//! StoryClip CLI — Command-line interface for clip post-processing.
//!
//! Usage:
//!   storyclip process <PATH> [OPTIONS]   Run the pipeline on a recording
//!   storyclip info <PATH>                Show media information
//!   storyclip check                      Check system capabilities
//!   storyclip config [--init]            Show or create the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "storyclip",
    about = "Turn raw recordings into trimmed, decorated, gallery-ready clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the post-processing pipeline on a recording
    Process {
        /// Path to the source recording
        path: PathBuf,

        /// Trim start offset in seconds
        #[arg(short, long, default_value = "0")]
        start: f64,

        /// Trim duration in seconds (default: source duration minus 2s)
        #[arg(short, long)]
        duration: Option<f64>,

        /// JSON file with the overlay list to burn in
        #[arg(long)]
        overlays: Option<PathBuf>,

        /// Gallery album to save into
        #[arg(long)]
        album: Option<String>,

        /// Keep intermediate files after a successful run
        #[arg(long)]
        keep_intermediates: bool,
    },

    /// Show media information for a recording
    Info {
        /// Path to the media file
        path: PathBuf,
    },

    /// Check system capabilities
    Check,

    /// Show the active configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    storyclip_common::logging::init_logging(&storyclip_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Process {
            path,
            start,
            duration,
            overlays,
            album,
            keep_intermediates,
        } => commands::process::run(path, start, duration, overlays, album, keep_intermediates).await,
        Commands::Info { path } => commands::info::run(path).await,
        Commands::Check => commands::check::run(),
        Commands::Config { init } => commands::config::run(init),
    }
}
