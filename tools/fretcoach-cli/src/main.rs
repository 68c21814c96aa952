//! FretCoach CLI: analyze guitar practice videos and speak coaching feedback.
//!
//! Usage:
//!   fretcoach analyze <VIDEO>      Run the full pipeline on a video
//!   fretcoach live                 Run the pipeline on a simulated live burst
//!   fretcoach parse <REPLY_FILE>   Decode a saved model reply
//!   fretcoach check                Check ffmpeg and credentials
//!   fretcoach init                 Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fretcoach_common::config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "fretcoach",
    about = "Guitar practice analysis with spoken coaching feedback",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to the standard location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an uploaded practice video
    Analyze {
        /// Path to the video file
        video: PathBuf,

        /// Sample every Nth frame
        #[arg(long)]
        stride: Option<usize>,

        /// Maximum frames sent to the model
        #[arg(long)]
        max_frames: Option<usize>,
    },

    /// Run a simulated live capture burst
    Live {
        /// Opaque burst identifier
        #[arg(default_value = "live-burst")]
        payload: String,
    },

    /// Decode a saved model reply and preview the feedback
    Parse {
        /// File holding the raw reply text
        reply_file: PathBuf,
    },

    /// Check ffmpeg and API credentials
    Check,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        return commands::init::run(cli.config, force);
    }

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?,
        None => AppConfig::load(),
    }
    .with_env_overrides();

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    fretcoach_common::logging::init_logging(&LoggingConfig {
        level,
        json: config.logging.json,
    });

    match cli.command {
        Commands::Analyze {
            video,
            stride,
            max_frames,
        } => commands::analyze::run(config, video, stride, max_frames, cli.json).await,
        Commands::Live { payload } => commands::live::run(config, payload, cli.json).await,
        Commands::Parse { reply_file } => commands::parse::run(&config, reply_file, cli.json),
        Commands::Check => commands::check::run(&config, cli.config),
        Commands::Init { .. } => Ok(()),
    }
}
