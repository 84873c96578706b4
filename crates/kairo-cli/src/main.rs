//! Kairo CLI: entry point.
//!
//! # Commands
//!
//! - `kairo serve [--logs] [--json]`: run the HTTP relay
//! - `kairo status`: show configuration, key pools and store status
//! - `kairo ask -m MESSAGE [--image PATH]`: one completion from the terminal

mod ask;
mod helpers;
mod serve;
mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Kairo: LLM relay for the KairoAI scheduling app
#[derive(Parser)]
#[command(name = "kairo", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.kairo/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP relay
    Serve {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Emit logs as JSON lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show configuration and provider status
    Status,

    /// Send one message (or one timetable image) through the dispatcher
    Ask {
        /// Chat message
        #[arg(short, long)]
        message: Option<String>,

        /// Timetable image to extract instead of chatting
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Reply persona: serious, funny or angry
        #[arg(short, long, default_value = "serious")]
        persona: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Deployment platforms inject env vars; locally they come from .env
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(helpers::expand_tilde);

    match cli.command {
        Commands::Serve { logs, json } => {
            init_logging(if logs { LogLevel::Debug } else { LogLevel::Info }, json);
            serve::run(config_path.as_deref()).await
        }
        Commands::Status => status::run(config_path.as_deref()),
        Commands::Ask {
            message,
            image,
            persona,
            logs,
        } => {
            init_logging(if logs { LogLevel::Debug } else { LogLevel::Quiet }, false);
            ask::run(config_path.as_deref(), message, image, &persona).await
        }
    }
}

#[derive(Clone, Copy)]
enum LogLevel {
    Quiet,
    Info,
    Debug,
}

/// Initialize tracing/logging. `RUST_LOG` wins over the flags.
fn init_logging(level: LogLevel, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        LogLevel::Quiet => EnvFilter::new("warn"),
        LogLevel::Info => EnvFilter::new("info"),
        LogLevel::Debug => EnvFilter::new("kairo=debug,kairo_server=debug,kairo_providers=debug,kairo_store=debug,info"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
