//! Status command implementation.
//!
//! Reports the raw extracts present in the cache directory and the
//! partitions committed in the output dataset.

use super::shared::setup_logging;
use crate::cli::args::StatusArgs;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{fetch::Retriever, writer::PartitionWriter};
use colored::*;

/// Execute the status command
pub async fn run_status(args: StatusArgs) -> Result<()> {
    setup_logging(args.log_level(), false)?;

    let mut config = Config::default();
    if let Some(cache_dir) = &args.cache_dir {
        config = config.with_raw_cache_dir(cache_dir.clone());
    }
    if let Some(output) = &args.output {
        config = config.with_dataset_dir(output.clone());
    }

    let retriever = Retriever::new(&config);
    let cached = retriever.cached_periods()?;

    println!("{}", "Cached raw extracts".bright_green().bold());
    println!(
        "  {} {}",
        "Directory:".bright_cyan(),
        config.raw_cache_dir.display()
    );
    if cached.is_empty() {
        println!("  {}", "none".bright_black());
    } else {
        for period in &cached {
            println!("  {}", period);
        }
    }

    let writer = PartitionWriter::new(config.dataset_dir.clone());
    let partitions = writer.list_partitions()?;

    println!("\n{}", "Committed partitions".bright_green().bold());
    println!(
        "  {} {}",
        "Dataset:".bright_cyan(),
        config.dataset_dir.display()
    );
    if partitions.is_empty() {
        println!("  {}", "none".bright_black());
    } else {
        for key in &partitions {
            println!("  {}", key);
        }
    }

    Ok(())
}
