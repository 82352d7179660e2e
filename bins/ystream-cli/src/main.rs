//! ystream-cli — Offline tooling for the yield streamer.
//!
//! `day` converts a Unix timestamp into the shifted day index and seconds;
//! `replay` runs a JSON scenario against an in-memory streamer and prints
//! each step's outcome as JSON.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use ystream_core::time::day_and_time;
use ystream_engine::StreamerConfig;

use crate::scenario::Scenario;

/// Yield streamer command-line tools.
#[derive(Parser, Debug)]
#[command(name = "ystream-cli", version, about = "Daily balance and yield streaming tools")]
struct Cli {
    /// Log level (trace, debug, info, warn, error). Falls back to the
    /// `log_level` of a `--config` file, then to "warn".
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the shifted day index and seconds elapsed for a Unix timestamp.
    Day {
        /// Unix timestamp in seconds.
        timestamp: u64,
    },
    /// Replay a JSON scenario and print every step's result.
    Replay {
        /// Path to the scenario file.
        scenario: PathBuf,

        /// Streamer config (TOML). Overrides the scenario's inline config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = match &cli.command {
        Commands::Replay { config: Some(path), .. } => Some(
            StreamerConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
        ),
        _ => None,
    };
    init_logging(&resolve_log_level(cli.log_level.as_deref(), loaded.as_ref()), &cli.log_format);

    match cli.command {
        Commands::Day { timestamp } => {
            let (day, seconds) = day_and_time(timestamp)?;
            println!("{}", serde_json::json!({ "day": day, "seconds": seconds }));
        }
        Commands::Replay { scenario, .. } => {
            let raw = std::fs::read_to_string(&scenario)
                .with_context(|| format!("reading {}", scenario.display()))?;
            let mut parsed: Scenario = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", scenario.display()))?;
            if loaded.is_some() {
                parsed.config = loaded;
            }

            info!(steps = parsed.steps.len(), "replaying scenario");
            let report = parsed.replay()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// The `--log-level` flag wins over a loaded config's `log_level`.
fn resolve_log_level(flag: Option<&str>, config: Option<&StreamerConfig>) -> String {
    flag.map(str::to_owned)
        .or_else(|| config.map(|c| c.log_level.clone()))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. Logs go to stderr so stdout stays JSON.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}
