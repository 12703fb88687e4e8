//! Error handling for trip-record ETL operations.
//!
//! Provides error types with context for fetching source extracts,
//! batch precondition checks, and partitioned dataset writes.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Required column '{column}' missing from source batch")]
    MissingColumn { column: String },

    #[error("Unsupported type for timestamp column '{column}': {dtype}")]
    UnsupportedTimestamp { column: String, dtype: String },

    #[error("Partition write failed at {path}: {reason}")]
    PartitionWrite { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl EtlError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error is a source fetch failure.
    ///
    /// Fetch failures are recoverable at period granularity: the
    /// orchestrator records the period as skipped and moves on.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_classification() {
        let err = EtlError::Fetch {
            url: "http://example.invalid/file.parquet".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.is_fetch());

        let err = EtlError::MissingColumn {
            column: "trip_distance".to_string(),
        };
        assert!(!err.is_fetch());
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = EtlError::MissingColumn {
            column: "passenger_count".to_string(),
        };
        assert!(err.to_string().contains("passenger_count"));
    }
}
