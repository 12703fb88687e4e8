//! ETL pipeline orchestration.
//!
//! Sequences fetch, clean, restrict, and write for each requested period
//! and aggregates per-period outcomes. Periods are independent units of
//! work: every failure is converted into an outcome at this boundary and
//! processing continues with the next period.

pub mod fetch;
pub mod transform;
pub mod writer;

use self::{fetch::Retriever, transform::clean, transform::restrict, writer::PartitionWriter};

use crate::config::Config;
use crate::error::Result;
use crate::models::{Period, PeriodOutcome, RunSummary};

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::LazyFrame;
use std::path::Path;
use std::time::Instant;
use tokio::task;
use tracing::{error, info, warn};

/// Orchestrator for multi-period ETL runs
#[derive(Debug)]
pub struct TripPipeline {
    retriever: Retriever,
    writer: PartitionWriter,
}

impl TripPipeline {
    /// Create a pipeline from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            retriever: Retriever::new(config),
            writer: PartitionWriter::new(config.dataset_dir.clone()),
        }
    }

    /// Run the pipeline for a set of periods.
    ///
    /// Periods are processed sequentially in ascending order for
    /// reproducible logs. No period's failure aborts the run.
    pub async fn run(&self, mut periods: Vec<Period>) -> RunSummary {
        let start_time = Instant::now();
        periods.sort();
        periods.dedup();

        let pb = ProgressBar::new(periods.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut summary = RunSummary::default();
        for period in periods {
            pb.set_message(format!("Processing {}", period));

            let outcome = self.run_period(period).await;
            match &outcome {
                PeriodOutcome::Succeeded { rows_written } => {
                    info!("{}: {} rows written", period, rows_written);
                }
                PeriodOutcome::Skipped { reason } => {
                    warn!("{}: skipped ({})", period, reason);
                }
                PeriodOutcome::Failed { reason } => {
                    error!("{}: failed ({})", period, reason);
                }
            }

            summary.record(period, outcome);
            pb.inc(1);
        }
        pb.finish_with_message("All periods processed");

        summary.elapsed = start_time.elapsed();
        summary
    }

    /// Run one period end to end, converting every failure into an outcome
    pub async fn run_period(&self, period: Period) -> PeriodOutcome {
        let raw_path = match self.retriever.fetch(period).await {
            Ok(path) => path,
            Err(err) if err.is_fetch() => {
                return PeriodOutcome::Skipped {
                    reason: err.to_string(),
                };
            }
            Err(err) => {
                return PeriodOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        // Polars work is synchronous; keep it off the async runtime.
        let writer = self.writer.clone();
        let result =
            task::spawn_blocking(move || process_extract(&raw_path, period, &writer)).await;

        match result {
            Ok(Ok(rows_written)) => PeriodOutcome::Succeeded { rows_written },
            Ok(Err(err)) => PeriodOutcome::Failed {
                reason: err.to_string(),
            },
            Err(join_err) => PeriodOutcome::Failed {
                reason: format!("Worker task failed: {}", join_err),
            },
        }
    }

    /// Partition writer backing this pipeline
    pub fn writer(&self) -> &PartitionWriter {
        &self.writer
    }

    /// Retriever backing this pipeline
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }
}

/// Read, clean, restrict, and write one period's extract
fn process_extract(raw_path: &Path, period: Period, writer: &PartitionWriter) -> Result<usize> {
    let df = LazyFrame::scan_parquet(raw_path, Default::default())?.collect()?;

    let (cleaned, stats) = clean(&df)?;
    info!(
        "{}: cleaned {} of {} rows ({} dropped)",
        period,
        stats.rows_out,
        stats.rows_in,
        stats.rows_dropped()
    );

    let restricted = restrict(cleaned, period)?;
    let rows_written = restricted.height();

    let stragglers = stats.rows_out.saturating_sub(rows_written);
    if stragglers > 0 {
        warn!(
            "{}: dropped {} straggler row(s) dated outside the requested period",
            period, stragglers
        );
    }

    writer.write(&restricted)?;
    Ok(rows_written)
}
