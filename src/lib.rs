//! Trip-record ETL Library
//!
//! A Rust library for ingesting NYC TLC yellow taxi trip records and
//! persisting them into a Parquet dataset partitioned by year and month.
//!
//! This library provides tools for:
//! - Fetching monthly Parquet extracts with a local raw-file cache
//! - Cleaning batches (null gates, fixed-format timestamp parsing)
//! - Deriving year/month partition keys from pickup timestamps
//! - Reconciling batches against their requested period
//! - Idempotent partitioned writes with replace-matching semantics
//! - Per-period outcome aggregation across multi-month runs

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipeline;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::Config;
pub use error::{EtlError, Result};
pub use models::{CleanStats, PartitionKey, Period, PeriodOutcome, RunSummary};
pub use pipeline::TripPipeline;
