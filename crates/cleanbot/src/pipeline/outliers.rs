//! Z-score outlier filtering.
//!
//! Rows are removed when any numeric column scores strictly above the
//! threshold. Missing and NaN cells are excluded from the statistics and
//! never cause a removal.

use crate::config::DEFAULT_OUTLIER_THRESHOLD;
use crate::error::Result;
use crate::utils::{is_numeric_dtype, valid_floats};
use polars::prelude::*;
use tracing::debug;

/// Per-run outcome of the outlier filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlierReport {
    /// Rows removed from the table.
    pub rows_removed: usize,
    /// `(column, flagged rows)` for every column that was screened.
    pub screened: Vec<(String, usize)>,
    /// Numeric columns skipped because their values do not vary.
    pub degenerate: Vec<String>,
}

/// Removes rows whose numeric values lie too far from their column mean.
#[derive(Debug, Clone, Copy)]
pub struct OutlierFilter {
    threshold: f64,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_THRESHOLD)
    }
}

impl OutlierFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Filter rows with `|z| > threshold` in any numeric column.
    ///
    /// Scores use the population standard deviation. A column with no valid
    /// values, or whose valid values are all equal, is degenerate and flags
    /// nothing.
    pub fn filter(&self, df: DataFrame) -> Result<(DataFrame, OutlierReport)> {
        let mut keep = vec![true; df.height()];
        let mut report = OutlierReport::default();

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) {
                continue;
            }

            let name = col.name().to_string();
            let values = valid_floats(col.as_materialized_series())?;

            let (Some(column_mean), Some(std)) = (values.mean(), values.std(0)) else {
                debug!("Column '{}' has no values, skipping", name);
                report.degenerate.push(name);
                continue;
            };

            let all_equal = values.min() == values.max();
            if all_equal || std == 0.0 || !std.is_finite() {
                debug!("Column '{}' has zero variance, skipping", name);
                report.degenerate.push(name);
                continue;
            }

            let mut flagged = 0;
            for (row, value) in values.into_iter().enumerate() {
                if let Some(v) = value
                    && ((v - column_mean) / std).abs() > self.threshold
                {
                    flagged += 1;
                    keep[row] = false;
                }
            }

            debug!("Column '{}': {} values beyond |z| > {}", name, flagged, self.threshold);
            report.screened.push((name, flagged));
        }

        report.rows_removed = keep.iter().filter(|kept| !**kept).count();
        if report.rows_removed == 0 {
            return Ok((df, report));
        }

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok((df.filter(&mask)?, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_spike() -> Vec<f64> {
        let mut values: Vec<f64> = (1..=20).map(f64::from).collect();
        values.push(1000.0);
        values
    }

    #[test]
    fn test_removes_extreme_row() {
        let df = df!["value" => with_spike()].unwrap();
        let (df, report) = OutlierFilter::default().filter(df).unwrap();

        assert_eq!(df.height(), 20);
        assert_eq!(report.rows_removed, 1);
        let max = df.column("value").unwrap().f64().unwrap().max();
        assert_eq!(max, Some(20.0));
    }

    #[test]
    fn test_small_sample_cannot_exceed_threshold() {
        // With five values |z| can never exceed (n - 1) / sqrt(n), about 1.79.
        let df = df!["value" => [1.0, 2.0, 3.0, 4.0, 1000.0]].unwrap();
        let (df, report) = OutlierFilter::default().filter(df).unwrap();

        assert_eq!(df.height(), 5);
        assert_eq!(report.rows_removed, 0);
    }

    #[test]
    fn test_boundary_score_is_kept() {
        // Mean 0 and population std 1, so every value scores exactly 1.
        let df = df!["v" => [-1.0, 1.0, -1.0, 1.0]].unwrap();
        let (df, report) = OutlierFilter::new(1.0).filter(df).unwrap();

        assert_eq!(report.rows_removed, 0);
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_constant_column_removes_nothing() {
        let df = df![
            "flat" => vec![5.0; 21],
            "value" => with_spike(),
        ]
        .unwrap();

        let (df, report) = OutlierFilter::default().filter(df).unwrap();

        assert_eq!(report.degenerate, vec!["flat".to_string()]);
        assert_eq!(report.screened, vec![("value".to_string(), 1)]);
        assert_eq!(df.height(), 20);
    }

    #[test]
    fn test_missing_values_pass() {
        let mut values: Vec<Option<f64>> = with_spike().into_iter().map(Some).collect();
        values.push(None);
        let df = df!["value" => values].unwrap();

        let (df, _) = OutlierFilter::default().filter(df).unwrap();

        assert_eq!(df.height(), 21);
        assert_eq!(df.column("value").unwrap().null_count(), 1);
    }

    #[test]
    fn test_text_columns_are_ignored() {
        let df = df!["name" => ["a", "b", "c"]].unwrap();
        let (df, report) = OutlierFilter::default().filter(df).unwrap();

        assert_eq!(df.height(), 3);
        assert!(report.screened.is_empty());
        assert!(report.degenerate.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let (df, report) = OutlierFilter::default().filter(DataFrame::empty()).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(report.rows_removed, 0);
    }
}
