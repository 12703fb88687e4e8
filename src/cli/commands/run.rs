//! Run command implementation.
//!
//! Builds the configuration from CLI arguments, expands the requested
//! periods, runs the pipeline, and reports the per-period outcomes.

use super::shared::{prepare_directories, print_run_summary, setup_logging};
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::Result;
use crate::models::Period;
use crate::pipeline::TripPipeline;
use tracing::{info, warn};

/// Execute the ETL run command
pub async fn run_etl(args: RunArgs) -> Result<()> {
    setup_logging(args.log_level(), args.quiet)?;

    let mut config = Config::default();
    if let Some(cache_dir) = &args.cache_dir {
        config = config.with_raw_cache_dir(cache_dir.clone());
    }
    if let Some(output) = &args.output {
        config = config.with_dataset_dir(output.clone());
    }
    if let Some(base_url) = &args.base_url {
        config = config.with_source_base_url(base_url.clone());
    }

    let periods = args.periods()?;
    prepare_directories(&config)?;

    let current = Period::current();
    for period in periods.iter().filter(|p| **p > current) {
        warn!(
            "{} is in the future; the source publishes monthly and the fetch will fail",
            period
        );
    }

    info!(
        "Starting ETL for {} period(s) of {}",
        periods.len(),
        args.year
    );

    let pipeline = TripPipeline::new(&config);
    let summary = pipeline.run(periods).await;

    if !args.quiet {
        print_run_summary(&summary);
    }

    Ok(())
}
