//! CSV loader for the historical test-prediction dataset.
//!
//! Required headers: `timestamp`, `actual_price`, `predicted_price`. Any other
//! column (including an unnamed index column) is ignored.

use crate::domain::errors::{ForecastError, Result};
use crate::domain::market::{HistoricalRecord, PriceSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::{info, warn};

pub const REQUIRED_COLUMNS: [&str; 3] = ["timestamp", "actual_price", "predicted_price"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Deserialize)]
struct DatasetRow {
    timestamp: String,
    actual_price: f64,
    predicted_price: f64,
}

/// Parses a timestamp cell.
///
/// Offsets are accepted but dropped: the wall-clock time in the file is kept.
/// Bare dates map to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn load_dataset(path: &Path) -> Result<PriceSeries> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ForecastError::DatasetNotFound {
            path: path.to_path_buf(),
        },
        _ => ForecastError::malformed(path, format!("failed to open dataset: {}", e)),
    })?;

    let series = read_dataset(BufReader::new(file), path)?;
    info!("Loaded {} price records from {:?}", series.len(), path);
    Ok(series)
}

/// Reads dataset rows from any reader; `source` is only used in errors and logs.
pub fn read_dataset<R: Read>(reader: R, source: &Path) -> Result<PriceSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ForecastError::malformed(source, format!("unreadable header: {}", e)))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(ForecastError::malformed(
            source,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize::<DatasetRow>().enumerate() {
        // line 1 is the header
        let line = i + 2;
        let row = result
            .map_err(|e| ForecastError::malformed(source, format!("line {}: {}", line, e)))?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
            ForecastError::malformed(
                source,
                format!("line {}: unparseable timestamp '{}'", line, row.timestamp),
            )
        })?;
        for (column, value) in [
            ("actual_price", row.actual_price),
            ("predicted_price", row.predicted_price),
        ] {
            if !value.is_finite() {
                return Err(ForecastError::malformed(
                    source,
                    format!("line {}: non-finite {} '{}'", line, column, value),
                ));
            }
        }
        records.push(HistoricalRecord::new(
            timestamp,
            row.actual_price,
            row.predicted_price,
        ));
    }

    let series = PriceSeries::new(records);
    if series.is_empty() {
        warn!("Dataset {:?} has no records", source);
    } else if !series.is_ascending() {
        warn!(
            "Dataset {:?} is not in ascending timestamp order; lag features assume it is",
            source
        );
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(csv: &str) -> Result<PriceSeries> {
        read_dataset(csv.as_bytes(), Path::new("inline.csv"))
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2018, 10, 1)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2018-10-01 13:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2018-10-01T13:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2018-10-01 13:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2018-10-01 13:00:00 "), Some(expected));
        assert_eq!(parse_timestamp("2018-10-01T13:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2018-10-01 13:00:00+00:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2018-10-01"),
            NaiveDate::from_ymd_opt(2018, 10, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("01/10/2018 13h"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_reads_rows_in_order_and_ignores_extra_columns() {
        let series = read(
            ",timestamp,actual_price,predicted_price,temperature\n\
             0,2018-10-01 00:00:00,40.5,39.0,11.2\n\
             1,2018-10-01 01:00:00,42.0,41.5,10.8\n",
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].actual_price, 40.5);
        assert_eq!(series.records()[1].predicted_price, 41.5);
        assert!(series.is_ascending());
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let err = read("timestamp,actual_price\n2018-10-01 00:00:00,40.0\n").unwrap_err();
        match err {
            ForecastError::DatasetMalformed { reason, .. } => {
                assert!(reason.contains("predicted_price"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_timestamp_reports_line() {
        let err = read(
            "timestamp,actual_price,predicted_price\n\
             2018-10-01 00:00:00,40.0,41.0\n\
             yesterday,42.0,41.0\n",
        )
        .unwrap_err();
        match err {
            ForecastError::DatasetMalformed { reason, .. } => {
                assert!(reason.contains("line 3"));
                assert!(reason.contains("yesterday"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_price_is_malformed() {
        let err = read("timestamp,actual_price,predicted_price\n2018-10-01 00:00:00,n/a,41.0\n")
            .unwrap_err();
        assert!(matches!(err, ForecastError::DatasetMalformed { .. }));
    }

    #[test]
    fn test_non_finite_price_reports_line() {
        for cell in ["NaN", "inf", "-inf"] {
            let err = read(&format!(
                "timestamp,actual_price,predicted_price\n\
                 2018-10-01 00:00:00,40.0,41.0\n\
                 2018-10-01 01:00:00,42.0,{}\n",
                cell
            ))
            .unwrap_err();
            match err {
                ForecastError::DatasetMalformed { reason, .. } => {
                    assert!(reason.contains("line 3"), "{reason}");
                    assert!(reason.contains("predicted_price"), "{reason}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_unordered_rows_keep_file_order() {
        let series = read(
            "timestamp,actual_price,predicted_price\n\
             2018-10-01 05:00:00,5.0,5.5\n\
             2018-10-01 01:00:00,1.0,1.5\n",
        )
        .unwrap();
        assert!(!series.is_ascending());
        assert_eq!(series.actual_prices(), vec![5.0, 1.0]);
    }

    #[test]
    fn test_header_only_loads_empty_series() {
        let series = read("timestamp,actual_price,predicted_price\n").unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_dataset(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, ForecastError::DatasetNotFound { .. }));
    }
}
