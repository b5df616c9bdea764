//! seatwatch CLI
//!
//! Polls the timetable and pushes a notification when a watched section opens.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use seatwatch::{
    error::Result,
    models::{Availability, Config, subscription::read_subscriptions},
    pipeline::Watcher,
};

/// seatwatch - Course Seat Watcher
#[derive(Parser, Debug)]
#[command(
    name = "seatwatch",
    version,
    about = "Watches timetable sections and notifies when seats open"
)]

struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll forever, notifying on openings
    Watch,

    /// Run a single cycle and print a summary
    Check,

    /// Validate the configuration and subscription file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Watch => {
            config.validate()?;
            log::info!(
                "Watching {} (subscriptions: {})",
                config.watcher.target_url,
                config.watcher.subscriptions_file
            );

            let mut watcher = Watcher::from_config(&config)?;
            watcher.run().await;
        }

        Command::Check => {
            config.validate()?;
            let mut watcher = Watcher::from_config(&config)?;
            let report = watcher.run_cycle().await;

            log::info!("Checked {} subscriptions", report.checked);
            for availability in [
                Availability::OpenFound,
                Availability::NoOpen,
                Availability::TimetableError,
                Availability::InvalidCrn,
                Availability::Unknown,
            ] {
                log::info!("  {:<16} {}", availability, report.count(availability));
            }
            log::info!("  {:<16} {}", "failed", report.transport_failures);
            log::info!(
                "Notifications: {} sent, {} suppressed, {} failed",
                report.notifications_sent,
                report.already_notified,
                report.notification_failures
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let list = read_subscriptions(&config.watcher.subscriptions_file)?;
            for subscription in &list.subscriptions {
                if let Err(e) = url::Url::parse(&subscription.notify_endpoint) {
                    log::warn!(
                        "{} ({}): notification endpoint is not a URL: {}",
                        subscription.description,
                        subscription.crn,
                        e
                    );
                }
            }
            log::info!(
                "✓ {} subscriptions OK, {} rows skipped",
                list.subscriptions.len(),
                list.skipped_rows.len()
            );
        }
    }

    Ok(())
}
