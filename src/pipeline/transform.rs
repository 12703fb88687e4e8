//! Cleaning and partition-key derivation for trip-record batches.
//!
//! Applies the validation stages that decide which rows survive: the
//! critical-column null gate, fixed-format timestamp normalization, the
//! null-timestamp gate, and derivation of the year/month partition columns
//! from the pickup timestamp. Data-quality issues never raise; they only
//! reduce the row count. The one fatal condition is a structurally
//! malformed batch (missing or wrongly-typed required column).

use crate::constants::{REQUIRED_COLUMNS, TIMESTAMP_FORMAT, columns};
use crate::error::{EtlError, Result};
use crate::models::{CleanStats, Period};

use polars::prelude::*;
use tracing::debug;

/// Clean a raw trip-record batch.
///
/// Returns the cleaned batch together with the rows-in/rows-out counts.
/// Every surviving row has non-null critical columns, both timestamps
/// parsed to datetimes, and derived `year`/`month` columns. The output may
/// be empty; zero rows is a valid, non-error result.
pub fn clean(df: &DataFrame) -> Result<(DataFrame, CleanStats)> {
    ensure_required_columns(df)?;

    let rows_in = df.height();

    let pickup = normalize_timestamp(
        columns::PICKUP_DATETIME,
        df.column(columns::PICKUP_DATETIME)?.dtype(),
    )?;
    let dropoff = normalize_timestamp(
        columns::DROPOFF_DATETIME,
        df.column(columns::DROPOFF_DATETIME)?.dtype(),
    )?;

    let cleaned = df
        .clone()
        .lazy()
        // Null gate on the critical fields. Business-rule noise such as
        // negative distances is retained.
        .filter(
            col(columns::PASSENGER_COUNT)
                .is_not_null()
                .and(col(columns::TRIP_DISTANCE).is_not_null())
                .and(col(columns::TOTAL_AMOUNT).is_not_null()),
        )
        .with_columns([pickup, dropoff])
        // Rows whose timestamps failed to parse carry nulls now.
        .filter(
            col(columns::PICKUP_DATETIME)
                .is_not_null()
                .and(col(columns::DROPOFF_DATETIME).is_not_null()),
        )
        // Partition keys come from the pickup timestamp only.
        .with_columns([
            col(columns::PICKUP_DATETIME)
                .dt()
                .year()
                .cast(DataType::Int32)
                .alias(columns::YEAR),
            col(columns::PICKUP_DATETIME)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias(columns::MONTH),
        ])
        .collect()?;

    let stats = CleanStats {
        rows_in,
        rows_out: cleaned.height(),
    };
    debug!(
        "Cleaned batch: {} of {} rows retained ({} dropped)",
        stats.rows_out,
        stats.rows_in,
        stats.rows_dropped()
    );

    Ok((cleaned, stats))
}

/// Drop rows whose derived partition key differs from the requested period.
///
/// Source extracts occasionally contain mis-dated straggler rows; writing
/// them through would wholesale-replace a neighboring partition with a
/// fragment of another month's data. Must run strictly before the write.
pub fn restrict(df: DataFrame, period: Period) -> Result<DataFrame> {
    let restricted = df
        .lazy()
        .filter(
            col(columns::YEAR)
                .eq(lit(period.year))
                .and(col(columns::MONTH).eq(lit(period.month as i32))),
        )
        .collect()?;
    Ok(restricted)
}

/// Verify the batch carries every required column
fn ensure_required_columns(df: &DataFrame) -> Result<()> {
    for column in REQUIRED_COLUMNS {
        if df.column(column).is_err() {
            return Err(EtlError::MissingColumn {
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Normalization expression for one timestamp column.
///
/// Polymorphic over the two representations a source extract may use:
/// already-datetime columns pass through unchanged, string columns are
/// parsed with the fixed format where unparseable values become null
/// rather than raising. Any other type is a precondition violation.
fn normalize_timestamp(column: &str, dtype: &DataType) -> Result<Expr> {
    match dtype {
        DataType::Datetime(_, _) => Ok(col(column)),
        DataType::String => Ok(col(column).str().to_datetime(
            Some(TimeUnit::Microseconds),
            None,
            StrptimeOptions {
                format: Some(TIMESTAMP_FORMAT.into()),
                strict: false,
                exact: true,
                cache: true,
            },
            lit("raise"),
        )),
        other => Err(EtlError::UnsupportedTimestamp {
            column: column.to_string(),
            dtype: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDateTime};

    /// Raw batch with a mix of valid and invalid rows:
    /// - Row 0: fully valid
    /// - Row 1: null passenger_count
    /// - Row 2: unparseable pickup timestamp
    /// - Row 3: null dropoff timestamp
    /// - Row 4: valid, with a negative trip distance
    fn raw_batch() -> DataFrame {
        df!(
            columns::PASSENGER_COUNT => &[Some(1i64), None, Some(2), Some(1), Some(3)],
            columns::TRIP_DISTANCE => &[0.5f64, 1.0, 2.0, 3.0, -1.0],
            columns::TOTAL_AMOUNT => &[10.0f64, 20.0, 30.0, 40.0, 50.0],
            columns::PICKUP_DATETIME => &[
                Some("2025-01-01 08:00:00"),
                Some("2025-01-02 09:00:00"),
                Some("not-a-date"),
                Some("2025-01-04 11:00:00"),
                Some("2025-01-05 12:00:00"),
            ],
            columns::DROPOFF_DATETIME => &[
                Some("2025-01-01 08:15:00"),
                Some("2025-01-02 09:15:00"),
                Some("2025-01-03 10:00:00"),
                None,
                Some("2025-01-05 12:30:00"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_clean_basic_filtering() {
        let (cleaned, stats) = clean(&raw_batch()).unwrap();

        // Only rows 0 and 4 survive: row 1 has a null passenger_count,
        // row 2 an unparseable pickup, row 3 a null dropoff.
        assert_eq!(cleaned.height(), 2);
        assert_eq!(stats.rows_in, 5);
        assert_eq!(stats.rows_out, 2);

        let years: Vec<i32> = cleaned
            .column(columns::YEAR)
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        let months: Vec<i32> = cleaned
            .column(columns::MONTH)
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(years, vec![2025, 2025]);
        assert_eq!(months, vec![1, 1]);
    }

    #[test]
    fn test_negative_distance_is_retained() {
        let (cleaned, _) = clean(&raw_batch()).unwrap();

        let distances: Vec<f64> = cleaned
            .column(columns::TRIP_DISTANCE)
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert!(
            distances.contains(&-1.0),
            "negative trip_distance is accepted noise, not a quality filter target"
        );
    }

    #[test]
    fn test_timestamp_validation_cases() {
        // (pickup, dropoff, kept)
        let cases: &[(Option<&str>, Option<&str>, bool)] = &[
            (
                Some("2025-02-01 10:00:00"),
                Some("2025-02-01 10:15:00"),
                true,
            ),
            (Some("bad-date"), Some("2025-02-02 11:00:00"), false),
            (Some("2025-02-03 12:00:00"), None, false),
            (None, Some("2025-02-04 13:00:00"), false),
        ];

        for (pickup, dropoff, kept) in cases {
            let df = df!(
                columns::PASSENGER_COUNT => &[1i64],
                columns::TRIP_DISTANCE => &[1.0f64],
                columns::TOTAL_AMOUNT => &[5.0f64],
                columns::PICKUP_DATETIME => &[*pickup],
                columns::DROPOFF_DATETIME => &[*dropoff],
            )
            .unwrap();

            let (cleaned, _) = clean(&df).unwrap();
            let expected = if *kept { 1 } else { 0 };
            assert_eq!(
                cleaned.height(),
                expected,
                "pickup={:?} dropoff={:?}",
                pickup,
                dropoff
            );
        }
    }

    #[test]
    fn test_timestamps_become_datetime() {
        let (cleaned, _) = clean(&raw_batch()).unwrap();

        assert!(matches!(
            cleaned.column(columns::PICKUP_DATETIME).unwrap().dtype(),
            DataType::Datetime(_, _)
        ));
        assert!(matches!(
            cleaned.column(columns::DROPOFF_DATETIME).unwrap().dtype(),
            DataType::Datetime(_, _)
        ));
    }

    #[test]
    fn test_clean_accepts_already_temporal_batch() {
        // Run the output of one cleaning pass back through: the timestamp
        // columns are now datetimes and must pass through unchanged.
        let (first, _) = clean(&raw_batch()).unwrap();
        let (second, stats) = clean(&first).unwrap();

        assert_eq!(second.height(), first.height());
        assert_eq!(stats.rows_dropped(), 0);
    }

    #[test]
    fn test_partition_key_matches_pickup_calendar() {
        let (cleaned, _) = clean(&raw_batch()).unwrap();

        let pickups: Vec<String> = (0..cleaned.height())
            .map(|idx| {
                cleaned
                    .column(columns::PICKUP_DATETIME)
                    .unwrap()
                    .get(idx)
                    .unwrap()
                    .to_string()
            })
            .collect();

        for (idx, repr) in pickups.iter().enumerate() {
            // AnyValue renders datetimes with fractional seconds; keep the
            // leading "%Y-%m-%d %H:%M:%S" part.
            let parsed =
                NaiveDateTime::parse_from_str(&repr[..19], TIMESTAMP_FORMAT).unwrap();
            let year = cleaned
                .column(columns::YEAR)
                .unwrap()
                .get(idx)
                .unwrap()
                .try_extract::<i32>()
                .unwrap();
            let month = cleaned
                .column(columns::MONTH)
                .unwrap()
                .get(idx)
                .unwrap()
                .try_extract::<i32>()
                .unwrap();
            assert_eq!(year, parsed.year());
            assert_eq!(month, parsed.month() as i32);
        }
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let df = df!(
            columns::PASSENGER_COUNT => &[1i64],
            columns::TRIP_DISTANCE => &[1.0f64],
            columns::PICKUP_DATETIME => &["2025-01-01 08:00:00"],
            columns::DROPOFF_DATETIME => &["2025-01-01 08:15:00"],
        )
        .unwrap();

        let err = clean(&df).unwrap_err();
        assert!(matches!(
            err,
            EtlError::MissingColumn { column } if column == columns::TOTAL_AMOUNT
        ));
    }

    #[test]
    fn test_non_temporal_timestamp_column_is_fatal() {
        let df = df!(
            columns::PASSENGER_COUNT => &[1i64],
            columns::TRIP_DISTANCE => &[1.0f64],
            columns::TOTAL_AMOUNT => &[5.0f64],
            columns::PICKUP_DATETIME => &[1_700_000_000i64],
            columns::DROPOFF_DATETIME => &["2025-01-01 08:15:00"],
        )
        .unwrap();

        assert!(matches!(
            clean(&df).unwrap_err(),
            EtlError::UnsupportedTimestamp { .. }
        ));
    }

    #[test]
    fn test_all_rows_invalid_yields_empty_batch() {
        let df = df!(
            columns::PASSENGER_COUNT => &[Option::<i64>::None, None],
            columns::TRIP_DISTANCE => &[1.0f64, 2.0],
            columns::TOTAL_AMOUNT => &[5.0f64, 6.0],
            columns::PICKUP_DATETIME => &["2025-01-01 08:00:00", "2025-01-02 08:00:00"],
            columns::DROPOFF_DATETIME => &["2025-01-01 08:15:00", "2025-01-02 08:15:00"],
        )
        .unwrap();

        let (cleaned, stats) = clean(&df).unwrap();
        assert_eq!(cleaned.height(), 0);
        assert_eq!(stats.rows_dropped(), 2);
    }

    fn batch_with_straggler() -> DataFrame {
        df!(
            columns::PASSENGER_COUNT => &[1i64, 2, 1],
            columns::TRIP_DISTANCE => &[1.0f64, 2.0, 3.0],
            columns::TOTAL_AMOUNT => &[5.0f64, 6.0, 7.0],
            columns::PICKUP_DATETIME => &[
                "2025-02-10 10:00:00",
                "2025-03-01 00:05:00", // straggler: derived key is (2025, 3)
                "2025-02-20 18:30:00",
            ],
            columns::DROPOFF_DATETIME => &[
                "2025-02-10 10:10:00",
                "2025-03-01 00:25:00",
                "2025-02-20 18:45:00",
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_restrict_drops_stragglers() {
        let (cleaned, _) = clean(&batch_with_straggler()).unwrap();
        assert_eq!(cleaned.height(), 3);

        let period = Period::new(2025, 2).unwrap();
        let restricted = restrict(cleaned, period).unwrap();
        assert_eq!(restricted.height(), 2);

        let months: Vec<i32> = restricted
            .column(columns::MONTH)
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert!(months.iter().all(|&m| m == 2));
    }

    #[test]
    fn test_restrict_is_idempotent() {
        let (cleaned, _) = clean(&batch_with_straggler()).unwrap();
        let period = Period::new(2025, 2).unwrap();

        let once = restrict(cleaned, period).unwrap();
        let twice = restrict(once.clone(), period).unwrap();
        assert_eq!(once.height(), twice.height());
    }
}
