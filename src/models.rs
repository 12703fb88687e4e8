//! Core data structures for trip-record ETL.
//!
//! Defines the requested period unit of work, derived partition keys,
//! cleaning statistics, and per-period run outcomes.

use crate::constants::{MAX_MONTH, MIN_MONTH};
use crate::error::{EtlError, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A requested (year, month) unit of work.
///
/// A period identifies one monthly source extract. It is distinct from
/// [`PartitionKey`]: a cleaned row may carry a derived key that differs
/// from the period whose extract it arrived in (a straggler row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Create a period, validating month bounds
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if year < 1 {
            return Err(EtlError::configuration(format!(
                "Year must be positive, got {}",
                year
            )));
        }
        if !(MIN_MONTH..=MAX_MONTH).contains(&month) {
            return Err(EtlError::configuration(format!(
                "Month must be between {} and {}, got {}",
                MIN_MONTH, MAX_MONTH, month
            )));
        }
        Ok(Self { year, month })
    }

    /// All twelve periods of a year, ascending
    pub fn all_months(year: i32) -> Result<Vec<Self>> {
        (MIN_MONTH..=MAX_MONTH)
            .map(|month| Self::new(year, month))
            .collect()
    }

    /// The period containing the current calendar date
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The (year, month) storage key derived from a row's pickup timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub year: i32,
    pub month: i32,
}

impl PartitionKey {
    pub fn new(year: i32, month: i32) -> Self {
        Self { year, month }
    }

    /// Partition directory path relative to the dataset root
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(format!("year={}", self.year)).join(format!("month={}", self.month))
    }
}

impl From<Period> for PartitionKey {
    fn from(period: Period) -> Self {
        Self {
            year: period.year,
            month: period.month as i32,
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year={}/month={}", self.year, self.month)
    }
}

/// Row counts recorded by the cleaning stage.
///
/// Data-quality issues are never errors; the only trace they leave is the
/// difference between rows in and rows out.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CleanStats {
    pub rows_in: usize,
    pub rows_out: usize,
}

impl CleanStats {
    pub fn rows_dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

/// Outcome of one period's ETL run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PeriodOutcome {
    /// Pipeline completed; `rows_written` may be zero
    Succeeded { rows_written: usize },
    /// Source extract could not be fetched; period skipped
    Skipped { reason: String },
    /// Cleaning precondition or write failure
    Failed { reason: String },
}

impl PeriodOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Aggregated outcomes of a multi-period run
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<(Period, PeriodOutcome)>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn record(&mut self, period: Period, outcome: PeriodOutcome) {
        self.outcomes.push((period, outcome));
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PeriodOutcome::Succeeded { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PeriodOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PeriodOutcome::Failed { .. }))
            .count()
    }

    pub fn total_rows_written(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|(_, o)| match o {
                PeriodOutcome::Succeeded { rows_written } => Some(*rows_written),
                _ => None,
            })
            .sum()
    }
}
