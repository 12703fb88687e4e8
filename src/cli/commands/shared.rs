//! Shared components for CLI commands.
//!
//! Logging setup, directory preparation, and run-summary reporting used
//! across command implementations.

use crate::config::Config;
use crate::error::Result;
use crate::models::{PeriodOutcome, RunSummary};
use colored::*;
use indicatif::HumanDuration;
use std::fs;
use tracing::debug;

/// Set up structured logging for a command
pub fn setup_logging(level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tripdata_etl={}", level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", level);
    Ok(())
}

/// Create the cache and dataset directories if they don't exist
pub fn prepare_directories(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.raw_cache_dir)?;
    fs::create_dir_all(&config.dataset_dir)?;
    debug!(
        "Prepared directories: cache {} dataset {}",
        config.raw_cache_dir.display(),
        config.dataset_dir.display()
    );
    Ok(())
}

/// Print the end-of-run summary block
pub fn print_run_summary(summary: &RunSummary) {
    println!("\n{}", "Run Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        HumanDuration(summary.elapsed).to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Periods succeeded:".bright_cyan(),
        summary.succeeded().to_string().bright_white().bold()
    );
    if summary.skipped() > 0 {
        println!(
            "  {} {}",
            "Periods skipped:".bright_yellow(),
            summary.skipped().to_string().bright_yellow().bold()
        );
    }
    if summary.failed() > 0 {
        println!(
            "  {} {}",
            "Periods failed:".bright_red(),
            summary.failed().to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Rows written:".bright_cyan(),
        summary.total_rows_written().to_string().bright_white().bold()
    );

    for (period, outcome) in &summary.outcomes {
        match outcome {
            PeriodOutcome::Succeeded { rows_written } => {
                println!(
                    "    {} {} ({} rows)",
                    period.to_string().bright_white(),
                    "ok".bright_green(),
                    rows_written
                );
            }
            PeriodOutcome::Skipped { reason } => {
                println!(
                    "    {} {} ({})",
                    period.to_string().bright_white(),
                    "skipped".bright_yellow(),
                    reason
                );
            }
            PeriodOutcome::Failed { reason } => {
                println!(
                    "    {} {} ({})",
                    period.to_string().bright_white(),
                    "failed".bright_red(),
                    reason
                );
            }
        }
    }
}
