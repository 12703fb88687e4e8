//! Partitioned Parquet writing for cleaned trip-record batches.
//!
//! Groups rows by their derived (year, month) key and replaces each
//! matching partition wholesale: the new row group is staged to a temp
//! directory inside the dataset root, the existing partition directory is
//! removed, and the staged directory is renamed into place. Partitions not
//! present in the batch are left untouched, so repeated runs converge
//! without duplicating rows.

use crate::constants::{PARQUET_ROW_GROUP_SIZE, PARTITION_FILE_NAME, STAGING_PREFIX, columns};
use crate::error::{EtlError, Result};
use crate::models::PartitionKey;

use polars::prelude::{
    DataFrame, IntoLazy, ParquetCompression, ParquetWriter, StatisticsOptions, col, lit,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Writer for the year/month partitioned dataset
#[derive(Debug, Clone)]
pub struct PartitionWriter {
    dataset_dir: PathBuf,
}

impl PartitionWriter {
    /// Create a writer rooted at the dataset directory
    pub fn new(dataset_dir: PathBuf) -> Self {
        Self { dataset_dir }
    }

    /// Root directory of the partitioned dataset
    pub fn dataset_dir(&self) -> &Path {
        &self.dataset_dir
    }

    /// Write a cleaned batch, replacing every partition it touches.
    ///
    /// Returns the committed partition keys in ascending order. An empty
    /// batch is a no-op that touches no partitions.
    pub fn write(&self, df: &DataFrame) -> Result<Vec<PartitionKey>> {
        if df.height() == 0 {
            debug!("Empty batch, no partitions written");
            return Ok(Vec::new());
        }

        let keys = self.partition_keys(df)?;
        fs::create_dir_all(&self.dataset_dir)?;

        for key in &keys {
            let group = df
                .clone()
                .lazy()
                .filter(
                    col(columns::YEAR)
                        .eq(lit(key.year))
                        .and(col(columns::MONTH).eq(lit(key.month))),
                )
                // The key is encoded in the directory path; the stored row
                // group carries only the data columns.
                .select([col("*").exclude([columns::YEAR, columns::MONTH])])
                .collect()?;

            self.replace_partition(key, group)?;
        }

        info!(
            "Committed {} partition(s) under {}",
            keys.len(),
            self.dataset_dir.display()
        );
        Ok(keys)
    }

    /// List the partitions currently committed in the dataset
    pub fn list_partitions(&self) -> Result<Vec<PartitionKey>> {
        let mut keys = BTreeSet::new();

        if !self.dataset_dir.exists() {
            return Ok(Vec::new());
        }

        for entry in WalkDir::new(&self.dataset_dir).min_depth(2).max_depth(2) {
            let entry = entry.map_err(|e| EtlError::PartitionWrite {
                path: self.dataset_dir.clone(),
                reason: format!("Failed to walk dataset directory: {}", e),
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let month_name = entry.file_name().to_string_lossy();
            let year_name = match entry.path().parent().and_then(|p| p.file_name()) {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };

            let year = year_name.strip_prefix("year=").and_then(|v| v.parse().ok());
            let month = month_name
                .strip_prefix("month=")
                .and_then(|v| v.parse().ok());

            if let (Some(year), Some(month)) = (year, month) {
                keys.insert(PartitionKey::new(year, month));
            }
        }

        Ok(keys.into_iter().collect())
    }

    /// Distinct partition keys present in the batch, ascending
    fn partition_keys(&self, df: &DataFrame) -> Result<Vec<PartitionKey>> {
        let years = df.column(columns::YEAR)?.i32()?;
        let months = df.column(columns::MONTH)?.i32()?;

        let mut keys = BTreeSet::new();
        for (year, month) in years.iter().zip(months.iter()) {
            match (year, month) {
                (Some(year), Some(month)) => {
                    keys.insert(PartitionKey::new(year, month));
                }
                _ => {
                    return Err(EtlError::PartitionWrite {
                        path: self.dataset_dir.clone(),
                        reason: "Null partition key in cleaned batch".to_string(),
                    });
                }
            }
        }

        Ok(keys.into_iter().collect())
    }

    /// Stage one partition's row group and swap it into place.
    ///
    /// The staged-write-then-rename keeps partition replacement as close to
    /// atomic as the filesystem allows: an interrupted write leaves at
    /// worst a stale staging directory, never a half-written partition.
    fn replace_partition(&self, key: &PartitionKey, mut group: DataFrame) -> Result<()> {
        let partition_dir = self.dataset_dir.join(key.relative_path());
        let rows = group.height();

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.dataset_dir)
            .map_err(|e| EtlError::PartitionWrite {
                path: partition_dir.clone(),
                reason: format!("Failed to create staging directory: {}", e),
            })?;

        let staged_file = staging.path().join(PARTITION_FILE_NAME);
        let file = fs::File::create(&staged_file)?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .with_statistics(StatisticsOptions::full())
            .with_row_group_size(Some(PARQUET_ROW_GROUP_SIZE))
            .finish(&mut group)
            .map_err(|e| EtlError::PartitionWrite {
                path: partition_dir.clone(),
                reason: format!("Failed to write staged row group: {}", e),
            })?;

        // Replace, never merge: delete the matching partition before the
        // staged directory takes its place.
        if partition_dir.exists() {
            fs::remove_dir_all(&partition_dir)?;
        }
        if let Some(parent) = partition_dir.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging_path = staging.keep();
        fs::rename(&staging_path, &partition_dir).map_err(|e| EtlError::PartitionWrite {
            path: partition_dir.clone(),
            reason: format!("Failed to commit staged partition: {}", e),
        })?;

        debug!("Replaced partition {} with {} rows", key, rows);
        Ok(())
    }
}
