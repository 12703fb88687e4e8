//! Command-line argument definitions for the trip-record ETL.
//!
//! Defines the CLI interface using the clap derive API: the `run` command
//! selects a year plus one month, a month range, or all months; the
//! `status` command reports cache and dataset inventory.

use crate::constants::{MAX_MONTH, MIN_MONTH};
use crate::error::{EtlError, Result};
use crate::models::Period;
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// CLI arguments for the trip-record ETL
///
/// Ingests NYC TLC yellow taxi trip records and writes them into a
/// Parquet dataset partitioned by year and month.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tripdata-etl",
    version,
    about = "Ingest NYC TLC yellow taxi trip records into a partitioned Parquet dataset"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the ETL pipeline for one or more monthly periods
    Run(RunArgs),
    /// Report cached extracts and committed partitions
    Status(StatusArgs),
}

/// Arguments for the run command
#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Year of the trip data to process
    #[arg(short = 'y', long = "year", value_name = "YEAR")]
    pub year: i32,

    /// Single month to process (1-12)
    #[arg(
        short = 'm',
        long = "month",
        value_name = "MONTH",
        conflicts_with = "all_months"
    )]
    pub month: Option<u32>,

    /// Inclusive month range to process, as start-end (e.g. 3-7)
    ///
    /// Combines with --month: explicit values and the expanded range are
    /// merged and deduplicated.
    #[arg(
        long = "month-range",
        value_name = "START-END",
        conflicts_with = "all_months"
    )]
    pub month_range: Option<String>,

    /// Process all 12 months of the year
    #[arg(long = "all-months")]
    pub all_months: bool,

    /// Directory for caching raw monthly extracts
    ///
    /// Defaults to the platform cache directory under tripdata-etl/raw.
    #[arg(long = "cache-dir", value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Root directory of the partitioned output dataset
    ///
    /// Defaults to ./output/yellow_tripdata. Created if it doesn't exist.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Base URL of the trip-record distribution
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Arguments for the status command
#[derive(Debug, Clone, Parser)]
pub struct StatusArgs {
    /// Directory holding cached raw extracts
    #[arg(long = "cache-dir", value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Root directory of the partitioned dataset
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

impl RunArgs {
    /// Expand the month selection into the requested periods, ascending.
    ///
    /// Explicit values and the inclusive range are merged into a sorted,
    /// deduplicated set; bounds are validated against 1-12.
    pub fn periods(&self) -> Result<Vec<Period>> {
        let mut months = BTreeSet::new();

        if self.all_months {
            months.extend(MIN_MONTH..=MAX_MONTH);
        }

        if let Some(month) = self.month {
            if !(MIN_MONTH..=MAX_MONTH).contains(&month) {
                return Err(EtlError::configuration(format!(
                    "Month {} out of bounds [{}-{}]",
                    month, MIN_MONTH, MAX_MONTH
                )));
            }
            months.insert(month);
        }

        if let Some(range) = &self.month_range {
            let (start, end) = parse_month_range(range)?;
            months.extend(start..=end);
        }

        if months.is_empty() {
            return Err(EtlError::configuration(
                "No months selected. Use --month, --month-range, or --all-months",
            ));
        }

        months
            .into_iter()
            .map(|month| Period::new(self.year, month))
            .collect()
    }

    /// Map verbosity flags to a tracing level filter string
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

impl StatusArgs {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Parse an inclusive "start-end" month range with bounds validation
fn parse_month_range(range: &str) -> Result<(u32, u32)> {
    let (start, end) = range.split_once('-').ok_or_else(|| {
        EtlError::configuration(format!(
            "Invalid range format '{}'. Use 'start-end'",
            range
        ))
    })?;

    let start: u32 = start.trim().parse().map_err(|_| {
        EtlError::configuration(format!("Invalid range start '{}'", start))
    })?;
    let end: u32 = end.trim().parse().map_err(|_| {
        EtlError::configuration(format!("Invalid range end '{}'", end))
    })?;

    if start > end || start < MIN_MONTH || end > MAX_MONTH {
        return Err(EtlError::configuration(format!(
            "Range '{}' out of bounds [{}-{}]",
            range, MIN_MONTH, MAX_MONTH
        )));
    }

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(year: i32) -> RunArgs {
        RunArgs {
            year,
            month: None,
            month_range: None,
            all_months: false,
            cache_dir: None,
            output: None,
            base_url: None,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn test_single_month_selection() {
        let mut args = run_args(2024);
        args.month = Some(5);

        let periods = args.periods().unwrap();
        assert_eq!(periods, vec![Period::new(2024, 5).unwrap()]);
    }

    #[test]
    fn test_all_months_selection() {
        let mut args = run_args(2024);
        args.all_months = true;

        let periods = args.periods().unwrap();
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].month, 1);
        assert_eq!(periods[11].month, 12);
    }

    #[test]
    fn test_month_range_expansion() {
        let mut args = run_args(2024);
        args.month_range = Some("3-6".to_string());

        let periods = args.periods().unwrap();
        let months: Vec<u32> = periods.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_month_and_range_merge_deduplicated() {
        let mut args = run_args(2024);
        args.month = Some(4);
        args.month_range = Some("3-5".to_string());

        let periods = args.periods().unwrap();
        let months: Vec<u32> = periods.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![3, 4, 5]);
    }

    #[test]
    fn test_no_selection_is_an_error() {
        let args = run_args(2024);
        assert!(args.periods().is_err());
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        for range in ["7-3", "0-5", "1-13", "abc", "3"] {
            let mut args = run_args(2024);
            args.month_range = Some(range.to_string());
            assert!(args.periods().is_err(), "range '{}' should be rejected", range);
        }
    }

    #[test]
    fn test_out_of_bounds_month_rejected() {
        let mut args = run_args(2024);
        args.month = Some(13);
        assert!(args.periods().is_err());
    }
}
