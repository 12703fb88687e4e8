//! Application constants for the trip-record ETL.
//!
//! Source URL and filename conventions, the canonical timestamp format,
//! column names, and Parquet writer settings used throughout the crate.

// =============================================================================
// Source Conventions
// =============================================================================

/// Base URL of the NYC TLC trip-record distribution
pub const SOURCE_BASE_URL: &str = "https://d37ci6vzurychx.cloudfront.net/trip-data";

/// Filename pattern for matching cached monthly extracts
pub const RAW_FILENAME_PATTERN: &str = r"^yellow_tripdata_(\d{4})-(\d{2})\.parquet$";

/// Build the filename of one monthly extract
pub fn raw_filename(year: i32, month: u32) -> String {
    format!("yellow_tripdata_{:04}-{:02}.parquet", year, month)
}

// =============================================================================
// Timestamp Handling
// =============================================================================

/// Fixed format for string-encoded trip timestamps.
///
/// Values that do not parse under this exact format become null and the
/// row is excluded downstream; parsing never raises.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Column Names
// =============================================================================

/// Column names in the TLC trip-record schema
pub mod columns {
    pub const PASSENGER_COUNT: &str = "passenger_count";
    pub const TRIP_DISTANCE: &str = "trip_distance";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const PICKUP_DATETIME: &str = "tpep_pickup_datetime";
    pub const DROPOFF_DATETIME: &str = "tpep_dropoff_datetime";

    // Derived partition columns
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
}

/// Columns that must be present in every source batch
pub const REQUIRED_COLUMNS: &[&str] = &[
    columns::PASSENGER_COUNT,
    columns::TRIP_DISTANCE,
    columns::TOTAL_AMOUNT,
    columns::PICKUP_DATETIME,
    columns::DROPOFF_DATETIME,
];

/// Columns that must never be null in a surviving row
pub const CRITICAL_COLUMNS: &[&str] = &[
    columns::PASSENGER_COUNT,
    columns::TRIP_DISTANCE,
    columns::TOTAL_AMOUNT,
];

// =============================================================================
// Partitioned Dataset Layout
// =============================================================================

/// Row-group file written inside each partition directory
pub const PARTITION_FILE_NAME: &str = "part-0.parquet";

/// Prefix of staging directories created during partition replacement
pub const STAGING_PREFIX: &str = ".staging-";

// =============================================================================
// Parquet Writer Configuration
// =============================================================================

/// Row group size for optimal sequential read performance
pub const PARQUET_ROW_GROUP_SIZE: usize = 1_000_000;

// =============================================================================
// Period Bounds
// =============================================================================

pub const MIN_MONTH: u32 = 1;
pub const MAX_MONTH: u32 = 12;
