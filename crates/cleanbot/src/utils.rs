//! Shared utilities for the cleaning pipeline.
//!
//! This module contains common helper functions used across multiple stages
//! so that type checks, parsing and statistics agree everywhere.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::cmp::Ordering;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// String/text type
    String,
    /// Other/unknown types (boolean, null, nested)
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::String) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Date-time layouts tried in order after RFC 3339.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only layouts. Month-first wins over day-first for ambiguous input.
const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Try to parse a string as a finite number.
///
/// Surrounding whitespace is ignored. `inf` and `NaN` are rejected.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Try to parse a string as a 64-bit integer.
pub fn parse_integer_string(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Try to parse a string as a date-time, returning milliseconds since the epoch.
///
/// Accepts RFC 3339 plus the layouts in `DATETIME_FORMATS` and `DATE_FORMATS`.
/// Values without an offset are taken as UTC.
pub fn parse_datetime_string(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Values of a numeric Series as f64, with nulls and NaN mapped to `None`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Float64 view of a numeric Series with NaN turned into null.
///
/// Polars aggregations (`mean`, `median`, `std`) on the result skip nulls, so
/// NaN never takes part in a statistic.
pub fn valid_floats(series: &Series) -> PolarsResult<Float64Chunked> {
    let values = numeric_values(series)?;
    Ok(Float64Chunked::from_iter_options(
        series.name().clone(),
        values.into_iter(),
    ))
}

/// Most frequent value. Values are sorted with `cmp` first, so a tie goes
/// to the value that sorts first.
pub fn mode_by<T, F>(mut values: Vec<T>, cmp: F) -> Option<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    values.sort_by(&cmp);

    let mut best: Option<(usize, usize)> = None; // (start index, run length)
    let mut start = 0;
    while start < values.len() {
        let mut end = start + 1;
        while end < values.len() && cmp(&values[start], &values[end]) == Ordering::Equal {
            end += 1;
        }
        let run = end - start;
        if best.is_none_or(|(_, best_run)| run > best_run) {
            best = Some((start, run));
        }
        start = end;
    }

    best.map(|(idx, _)| values.swap_remove(idx))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series, producing Float64.
///
/// Returns the filled Series and the number of cells replaced.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<(Series, usize)> {
    let float_series = series.cast(&DataType::Float64)?;
    let mut filled = 0;
    let values: Vec<Option<f64>> = float_series
        .f64()?
        .into_iter()
        .map(|v| match v {
            Some(val) => Some(val),
            None => {
                filled += 1;
                Some(fill_value)
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), filled))
}

/// Fill null values in a Series with a string, producing a String column.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<(Series, usize)> {
    let str_series = series.cast(&DataType::String)?;
    let mut filled = 0;
    let values: Vec<Option<String>> = str_series
        .str()?
        .into_iter()
        .map(|v| match v {
            Some(val) => Some(val.to_string()),
            None => {
                filled += 1;
                Some(fill_value.to_string())
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), filled))
}

/// Fill null values in a date-time Series with a timestamp in milliseconds.
///
/// The result keeps the dtype of the input.
pub fn fill_datetime_nulls(series: &Series, fill_millis: i64) -> PolarsResult<(Series, usize)> {
    let target_dtype = series.dtype().clone();
    let millis = series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;

    let mut filled = 0;
    let values: Vec<Option<i64>> = millis
        .i64()?
        .into_iter()
        .map(|v| match v {
            Some(val) => Some(val),
            None => {
                filled += 1;
                Some(fill_millis)
            }
        })
        .collect();

    let filled_series = Series::new(series.name().clone(), values)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&target_dtype)?;
    Ok((filled_series, filled))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int64), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Datetime);
        assert_eq!(
            get_dtype_category(&DataType::Datetime(TimeUnit::Milliseconds, None)),
            DtypeCategory::Datetime
        );
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::String);
        assert_eq!(get_dtype_category(&DataType::Boolean), DtypeCategory::Other);
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string(" -1.5 "), Some(-1.5));
        assert_eq!(parse_numeric_string("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string("inf"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
    }

    #[test]
    fn test_parse_integer_string() {
        assert_eq!(parse_integer_string("7"), Some(7));
        assert_eq!(parse_integer_string("7.0"), None);
    }

    #[test]
    fn test_parse_datetime_string() {
        let jan_first = 1_704_067_200_000; // 2024-01-01T00:00:00Z
        assert_eq!(parse_datetime_string("2024-01-01"), Some(jan_first));
        assert_eq!(parse_datetime_string("2024/01/01"), Some(jan_first));
        assert_eq!(parse_datetime_string("01/01/2024"), Some(jan_first));
        assert_eq!(parse_datetime_string("2024-01-01 00:00:00"), Some(jan_first));
        assert_eq!(parse_datetime_string("2024-01-01T00:00:00Z"), Some(jan_first));
        assert_eq!(
            parse_datetime_string("2024-01-01 00:00:01"),
            Some(jan_first + 1000)
        );
        assert_eq!(parse_datetime_string("a"), None);
        assert_eq!(parse_datetime_string("2"), None);
    }

    #[test]
    fn test_valid_floats_statistics() {
        let series = Series::new("v".into(), &[Some(4i64), Some(1), None, Some(3), Some(2)]);
        let floats = valid_floats(&series).unwrap();

        assert_eq!(floats.null_count(), 1);
        assert_eq!(floats.median(), Some(2.5));
        assert_eq!(floats.mean(), Some(2.5));

        let spread = valid_floats(&Series::new(
            "v".into(),
            &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0, f64::NAN],
        ))
        .unwrap();
        assert_eq!(spread.mean(), Some(5.0));
        assert_eq!(spread.std(0), Some(2.0));
    }

    #[test]
    fn test_mode_tie_goes_to_first_sorted() {
        let values = vec!["b", "a", "b", "a", "c"];
        assert_eq!(mode_by(values, |a, b| a.cmp(b)), Some("a"));

        let values = vec![3.0, 1.0, 3.0];
        assert_eq!(mode_by(values, |a: &f64, b| a.total_cmp(b)), Some(3.0));

        let empty: Vec<f64> = Vec::new();
        assert_eq!(mode_by(empty, |a: &f64, b| a.total_cmp(b)), None);
    }

    #[test]
    fn test_numeric_values_skips_nan() {
        let series = Series::new("v".into(), &[Some(1.0), None, Some(f64::NAN)]);
        assert_eq!(numeric_values(&series).unwrap(), vec![Some(1.0), None, None]);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1i64), None, Some(3)]);
        let (filled, count) = fill_numeric_nulls(&series, 0.5).unwrap();

        assert_eq!(count, 1);
        assert_eq!(filled.dtype(), &DataType::Float64);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.5);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("test".into(), &[Some("a"), None, None]);
        let (filled, count) = fill_string_nulls(&series, "N/A").unwrap();

        assert_eq!(count, 2);
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.str().unwrap().get(2), Some("N/A"));
    }
}
