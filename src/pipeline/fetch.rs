//! Retrieval of monthly trip-record extracts.
//!
//! Downloads one Parquet extract per requested period into the raw cache
//! directory, skipping periods that are already cached. Downloads are
//! staged through a temp file so an interrupted transfer never leaves a
//! truncated extract at the cache path.

use crate::config::Config;
use crate::constants::{RAW_FILENAME_PATTERN, raw_filename};
use crate::error::{EtlError, Result};
use crate::models::Period;

use regex::Regex;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Fetches monthly extracts from the trip-record distribution
#[derive(Debug)]
pub struct Retriever {
    raw_cache_dir: PathBuf,
    source_base_url: String,
    client: reqwest::Client,
}

impl Retriever {
    /// Create a retriever from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            raw_cache_dir: config.raw_cache_dir.clone(),
            source_base_url: config.source_base_url.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Cache path of one period's extract
    pub fn raw_file_path(&self, period: Period) -> PathBuf {
        self.raw_cache_dir
            .join(raw_filename(period.year, period.month))
    }

    /// Fetch one period's extract, returning the local cache path.
    ///
    /// An already-cached extract is returned without touching the network.
    pub async fn fetch(&self, period: Period) -> Result<PathBuf> {
        let local_path = self.raw_file_path(period);
        if local_path.exists() {
            debug!("Extract already cached: {}", local_path.display());
            return Ok(local_path);
        }

        let url = format!(
            "{}/{}",
            self.source_base_url,
            raw_filename(period.year, period.month)
        );
        fs::create_dir_all(&self.raw_cache_dir)?;

        info!("Downloading {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EtlError::Fetch {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(EtlError::Fetch {
                url,
                reason: format!("HTTP status {}", response.status()),
            });
        }

        let body = response.bytes().await.map_err(|e| EtlError::Fetch {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let staged = tempfile::NamedTempFile::new_in(&self.raw_cache_dir)?;
        fs::write(staged.path(), &body)?;
        staged
            .persist(&local_path)
            .map_err(|e| EtlError::Fetch {
                url,
                reason: format!("Failed to persist download: {}", e),
            })?;

        info!("Downloaded to {}", local_path.display());
        Ok(local_path)
    }

    /// Periods with an extract already present in the cache, ascending
    pub fn cached_periods(&self) -> Result<Vec<Period>> {
        if !self.raw_cache_dir.exists() {
            return Ok(Vec::new());
        }

        let pattern = Regex::new(RAW_FILENAME_PATTERN)
            .expect("raw filename pattern is a valid regex");

        let mut periods = Vec::new();
        for entry in fs::read_dir(&self.raw_cache_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(captures) = pattern.captures(&name) {
                let year: i32 = captures[1].parse().unwrap_or(0);
                let month: u32 = captures[2].parse().unwrap_or(0);
                if let Ok(period) = Period::new(year, month) {
                    periods.push(period);
                }
            }
        }

        periods.sort();
        Ok(periods)
    }
}
