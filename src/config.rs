//! Configuration for the trip-record ETL.
//!
//! All paths and the source URL are explicit configuration passed into the
//! retriever and partition writer at construction time; there is no
//! process-wide mutable state.

use crate::constants::SOURCE_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ETL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory where raw monthly extracts are cached
    pub raw_cache_dir: PathBuf,

    /// Root directory of the partitioned output dataset
    pub dataset_dir: PathBuf,

    /// Base URL of the trip-record distribution
    pub source_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let raw_cache_dir = dirs::cache_dir()
            .map(|dir| dir.join("tripdata-etl").join("raw"))
            .unwrap_or_else(|| PathBuf::from("raw"));

        Self {
            raw_cache_dir,
            dataset_dir: PathBuf::from("output").join("yellow_tripdata"),
            source_base_url: SOURCE_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Set the raw cache directory
    pub fn with_raw_cache_dir(mut self, dir: PathBuf) -> Self {
        self.raw_cache_dir = dir;
        self
    }

    /// Set the partitioned dataset root
    pub fn with_dataset_dir(mut self, dir: PathBuf) -> Self {
        self.dataset_dir = dir;
        self
    }

    /// Set the source base URL
    pub fn with_source_base_url(mut self, url: impl Into<String>) -> Self {
        self.source_base_url = url.into();
        self
    }
}
