//! Plan-driven missing-value filling.
//!
//! Provides median, mean, mode and constant filling, chosen per column
//! through a [`FillPlan`].

use crate::error::{CleaningError, Result};
use crate::types::{FillPlan, FillStrategy};
use crate::utils::{
    DtypeCategory, fill_datetime_nulls, fill_numeric_nulls, fill_string_nulls, get_dtype_category,
    mode_by, numeric_values, parse_datetime_string, parse_numeric_string, valid_floats,
};
use chrono::DateTime;
use polars::prelude::*;
use tracing::{debug, warn};

/// Literal used by mode filling when a column has no values at all.
pub const MODE_FALLBACK: &str = "N/A";

/// What the filler did with one column that had missing cells.
#[derive(Debug, Clone, PartialEq)]
pub enum FillRecord {
    /// Missing cells were replaced.
    Filled {
        column: String,
        strategy: FillStrategy,
        count: usize,
        value: String,
    },
    /// The column's strategy is leave-as-missing.
    LeftMissing { column: String, count: usize },
    /// The strategy could not be applied; the column was left as is.
    Fallback {
        column: String,
        strategy: FillStrategy,
        reason: String,
    },
}

impl FillRecord {
    /// Number of cells this record replaced.
    pub fn values_filled(&self) -> usize {
        match self {
            Self::Filled { count, .. } => *count,
            _ => 0,
        }
    }

    /// Human-readable log line.
    pub fn describe(&self) -> String {
        match self {
            Self::Filled {
                column,
                strategy,
                count,
                value,
            } => format!(
                "Filled {} missing values in '{}' using {} (fill value: {})",
                count,
                column,
                strategy.name(),
                value
            ),
            Self::LeftMissing { column, count } => {
                format!("Left {} missing values in '{}' unchanged", count, column)
            }
            Self::Fallback {
                column,
                strategy,
                reason,
            } => format!(
                "Could not apply {} to '{}' ({}); left as missing",
                strategy.name(),
                column,
                reason
            ),
        }
    }
}

/// Replaces missing cells according to a [`FillPlan`].
pub struct MissingValueFiller;

impl MissingValueFiller {
    /// Fill every column that has missing cells.
    ///
    /// Columns without missing cells are untouched and produce no record.
    /// An inapplicable median or mean is recovered locally as a
    /// [`FillRecord::Fallback`]; a constant that does not fit the column's
    /// type is an error.
    pub fn fill(mut df: DataFrame, plan: &FillPlan) -> Result<(DataFrame, Vec<FillRecord>)> {
        let targets: Vec<(String, usize)> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect();

        let mut records = Vec::with_capacity(targets.len());
        for (name, missing) in targets {
            let strategy = plan.strategy_for(&name).clone();
            let series = df.column(&name)?.as_materialized_series().clone();

            let record = match &strategy {
                FillStrategy::LeaveMissing => FillRecord::LeftMissing {
                    column: name.clone(),
                    count: missing,
                },
                FillStrategy::Median | FillStrategy::Mean => {
                    Self::apply_statistic(&mut df, &name, &series, &strategy)?
                }
                FillStrategy::Mode => Self::apply_mode(&mut df, &name, &series)?,
                FillStrategy::Constant(value) => {
                    Self::apply_constant(&mut df, &name, &series, value)?
                }
            };

            match &record {
                FillRecord::Fallback { reason, .. } => {
                    warn!("Fill strategy {} not applicable to '{}': {}", strategy, name, reason);
                }
                other => debug!("{}", other.describe()),
            }
            records.push(record);
        }

        Ok((df, records))
    }

    fn apply_statistic(
        df: &mut DataFrame,
        name: &str,
        series: &Series,
        strategy: &FillStrategy,
    ) -> Result<FillRecord> {
        let fallback = |reason: &str| FillRecord::Fallback {
            column: name.to_string(),
            strategy: strategy.clone(),
            reason: reason.to_string(),
        };

        if get_dtype_category(series.dtype()) != DtypeCategory::Numeric {
            return Ok(fallback("column is not numeric"));
        }

        let values = valid_floats(series)?;
        let statistic = match strategy {
            FillStrategy::Median => values.median(),
            _ => values.mean(),
        };

        let Some(fill_value) = statistic else {
            return Ok(fallback("column has no non-missing values"));
        };

        let (filled, count) = fill_numeric_nulls(series, fill_value)?;
        df.replace(name, filled)?;

        Ok(FillRecord::Filled {
            column: name.to_string(),
            strategy: strategy.clone(),
            count,
            value: fill_value.to_string(),
        })
    }

    fn apply_mode(df: &mut DataFrame, name: &str, series: &Series) -> Result<FillRecord> {
        let (filled, count, value) = match get_dtype_category(series.dtype()) {
            DtypeCategory::Numeric => {
                let values: Vec<f64> = numeric_values(series)?.into_iter().flatten().collect();
                match mode_by(values, |a, b| a.total_cmp(b)) {
                    Some(mode) => {
                        let (filled, count) = fill_numeric_nulls(series, mode)?;
                        (filled, count, mode.to_string())
                    }
                    None => Self::mode_fallback(series)?,
                }
            }
            DtypeCategory::Datetime => {
                let millis: Vec<i64> = series
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                    .cast(&DataType::Int64)?
                    .i64()?
                    .into_iter()
                    .flatten()
                    .collect();
                match mode_by(millis, |a, b| a.cmp(b)) {
                    Some(mode) => {
                        let (filled, count) = fill_datetime_nulls(series, mode)?;
                        (filled, count, format_millis(mode))
                    }
                    None => Self::mode_fallback(series)?,
                }
            }
            DtypeCategory::String | DtypeCategory::Other => {
                let text = series.cast(&DataType::String)?;
                let values: Vec<String> = text
                    .str()?
                    .into_iter()
                    .flatten()
                    .map(|v| v.to_string())
                    .collect();
                match mode_by(values, |a, b| a.cmp(b)) {
                    Some(mode) => {
                        let (filled, count) = fill_string_nulls(series, &mode)?;
                        (filled, count, mode)
                    }
                    None => Self::mode_fallback(series)?,
                }
            }
        };

        df.replace(name, filled)?;
        Ok(FillRecord::Filled {
            column: name.to_string(),
            strategy: FillStrategy::Mode,
            count,
            value,
        })
    }

    /// No values to take a mode of: fill with the marker, turning the column into text.
    fn mode_fallback(series: &Series) -> Result<(Series, usize, String)> {
        let (filled, count) = fill_string_nulls(series, MODE_FALLBACK)?;
        Ok((filled, count, MODE_FALLBACK.to_string()))
    }

    fn apply_constant(
        df: &mut DataFrame,
        name: &str,
        series: &Series,
        value: &str,
    ) -> Result<FillRecord> {
        let invalid = |reason: String| CleaningError::InvalidStrategy {
            column: name.to_string(),
            reason,
        };

        let (filled, count) = match get_dtype_category(series.dtype()) {
            DtypeCategory::Numeric => {
                let number = parse_numeric_string(value)
                    .ok_or_else(|| invalid(format!("'{}' is not a number", value)))?;
                fill_numeric_nulls(series, number)?
            }
            DtypeCategory::Datetime => {
                let millis = parse_datetime_string(value)
                    .ok_or_else(|| invalid(format!("'{}' is not a date-time", value)))?;
                fill_datetime_nulls(series, millis)?
            }
            DtypeCategory::String | DtypeCategory::Other => fill_string_nulls(series, value)?,
        };

        df.replace(name, filled)?;
        Ok(FillRecord::Filled {
            column: name.to_string(),
            strategy: FillStrategy::Constant(value.to_string()),
            count,
            value: value.to_string(),
        })
    }
}

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc().to_string())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_median_fill() {
        // Median of [1, 2, 100] is 2.
        let df = df!["v" => [Some(1.0), Some(2.0), None, Some(100.0)]].unwrap();
        let plan = FillPlan::new().with("v", FillStrategy::Median);

        let (df, records) = MissingValueFiller::fill(df, &plan).unwrap();

        assert_eq!(floats(&df, "v"), vec![Some(1.0), Some(2.0), Some(2.0), Some(100.0)]);
        assert_eq!(records[0].values_filled(), 1);
    }

    #[test]
    fn test_mean_fill_on_integers_produces_float() {
        let df = df!["v" => [Some(1), None, Some(4), None]].unwrap();
        let plan = FillPlan::new().with("v", FillStrategy::Mean);

        let (df, records) = MissingValueFiller::fill(df, &plan).unwrap();

        assert_eq!(floats(&df, "v"), vec![Some(1.0), Some(2.5), Some(4.0), Some(2.5)]);
        assert_eq!(
            records,
            vec![FillRecord::Filled {
                column: "v".to_string(),
                strategy: FillStrategy::Mean,
                count: 2,
                value: "2.5".to_string(),
            }]
        );
    }

    #[test]
    fn test_mean_on_text_falls_back() {
        let df = df!["city" => [Some("Oslo"), None]].unwrap();
        let plan = FillPlan::new().with("city", FillStrategy::Mean);

        let (df, records) = MissingValueFiller::fill(df, &plan).unwrap();

        assert_eq!(df.column("city").unwrap().null_count(), 1);
        assert!(matches!(records[0], FillRecord::Fallback { .. }));
        assert_eq!(records[0].values_filled(), 0);
    }

    #[test]
    fn test_median_on_empty_numeric_column_falls_back() {
        let df = df!["v" => [None::<f64>, None]].unwrap();
        let plan = FillPlan::new().with("v", FillStrategy::Median);

        let (df, records) = MissingValueFiller::fill(df, &plan).unwrap();

        assert_eq!(df.column("v").unwrap().null_count(), 2);
        assert!(records[0].describe().contains("no non-missing values"));
    }

    #[test]
    fn test_mode_breaks_ties_toward_first_sorted_value() {
        let df = df!["c" => [Some("b"), Some("a"), Some("b"), Some("a"), None]].unwrap();
        let plan = FillPlan::new().with("c", FillStrategy::Mode);

        let (df, _) = MissingValueFiller::fill(df, &plan).unwrap();
        let col = df.column("c").unwrap();
        assert_eq!(col.str().unwrap().get(4), Some("a"));
    }

    #[test]
    fn test_mode_without_values_uses_marker() {
        let df = df!["c" => [None::<&str>, None]].unwrap();
        let plan = FillPlan::new().with_default(FillStrategy::Mode);

        let (df, records) = MissingValueFiller::fill(df, &plan).unwrap();
        let col = df.column("c").unwrap();

        assert_eq!(col.str().unwrap().get(0), Some(MODE_FALLBACK));
        assert_eq!(records[0].values_filled(), 2);
    }

    #[test]
    fn test_constant_fill() {
        let df = df![
            "city" => [Some("Oslo"), None],
            "age" => [Some(30.0), None],
        ]
        .unwrap();
        let plan = FillPlan::new()
            .with("city", FillStrategy::Constant("Unknown".to_string()))
            .with("age", FillStrategy::Constant("0".to_string()));

        let (df, records) = MissingValueFiller::fill(df, &plan).unwrap();

        assert_eq!(df.column("city").unwrap().str().unwrap().get(1), Some("Unknown"));
        assert_eq!(floats(&df, "age"), vec![Some(30.0), Some(0.0)]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_columns_without_missing_are_untouched() {
        let df = df![
            "full" => [1, 2],
            "gaps" => [Some(1.0), None],
        ]
        .unwrap();

        let (df, records) = MissingValueFiller::fill(df, &FillPlan::new()).unwrap();

        assert_eq!(df.column("full").unwrap().dtype(), &DataType::Int32);
        assert_eq!(
            records,
            vec![FillRecord::LeftMissing {
                column: "gaps".to_string(),
                count: 1,
            }]
        );
    }
}
