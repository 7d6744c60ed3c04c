// src/bin/cli.rs

//! Slotwatch CLI
//!
//! Local execution entry point. For AWS Lambda, use `slotwatch-lambda` and
//! `slotwatch-probe-lambda`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use slotwatch::{
    error::Result,
    models::{Config, Opening, ProbeMode},
    pipeline::{self, NotifyTargets, RunSummary},
    services::{ConnectivityProbe, ConsoleChannel, Notifier, OpeningFinder},
    storage::LocalStore,
    utils::{http::HttpTransport, log as console},
};

/// Slotwatch - Volo volleyball opening watcher
#[derive(Parser, Debug)]
#[command(
    name = "slotwatch",
    version,
    about = "Finds open Volo volleyball drop-in and pickup registrations"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "slotwatch.toml")]
    config: PathBuf,

    /// Directory holding local dedup tables
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every current opening
    Openings,

    /// Find openings, record new ones and print the notification
    Notify {
        /// Notification destination (overrides config)
        #[arg(long)]
        destination: Option<String>,

        /// Dedup table name (overrides config)
        #[arg(long)]
        table: Option<String>,
    },

    /// Send one diagnostic request and print the result as JSON
    Probe {
        /// Query to send: minimal or discover
        #[arg(long)]
        mode: Option<String>,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn finder(config: &Config) -> Result<OpeningFinder> {
    let timeout = Duration::from_secs(config.finder.timeout_secs);
    let transport = HttpTransport::new(&config.endpoint, timeout)?;
    Ok(OpeningFinder::new(Arc::new(transport), config))
}

fn describe(opening: &Opening) -> String {
    format!(
        "[{}] {} @ {} | {} | raw: {} | {} spots",
        opening.kind,
        opening.program_label(),
        opening.venue_label(),
        opening.when_local,
        opening.raw_start_time,
        opening.available_spots
    )
}

fn print_summary(summary: &RunSummary) {
    console::summary(
        "Notify run",
        &[
            ("status", summary.status.as_str().to_string()),
            ("new openings", summary.new_openings.to_string()),
            ("total openings", summary.total_openings.to_string()),
            ("time", format!("{}ms", summary.execution_time_ms)),
        ],
    );
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();

    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Openings => {
            let openings = finder(&config)?.find_openings().await?;

            console::header("Current openings");
            if openings.is_empty() {
                console::sub_item("No openings found.");
            }
            for opening in &openings {
                console::sub_item(&describe(opening));
            }
            console::summary("Openings", &[("total", openings.len().to_string())]);
        }

        Command::Notify { destination, table } => {
            if destination.is_some() {
                config.notify.destination = destination;
            }
            if table.is_some() {
                config.store.table = table;
            }

            let started = Instant::now();
            let summary = match NotifyTargets::from_config(&config) {
                Some(targets) => {
                    let store = LocalStore::new(&cli.storage_dir, &targets.table);
                    log::info!("Using dedup table {}", store.path().display());

                    let notifier = Notifier::new(
                        Arc::new(ConsoleChannel),
                        targets.destination,
                        &config.notify,
                    );
                    pipeline::run_notify(&finder(&config)?, &store, &notifier).await?
                }
                None => {
                    log::warn!(
                        "Set --destination and --table (or SNS_TOPIC_ARN and DDB_TABLE_NAME)"
                    );
                    RunSummary::configuration_missing(started)
                }
            };

            print_summary(&summary);
        }

        Command::Probe { mode } => {
            if let Some(mode) = mode {
                config.probe.mode = ProbeMode::parse_lenient(&mode);
            }

            let result = ConnectivityProbe::run_with_config(&config).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            console::success(&format!(
                "Config OK ({} venues, endpoint {})",
                config.finder.venues.len(),
                config.endpoint.url
            ));
        }
    }

    Ok(())
}
