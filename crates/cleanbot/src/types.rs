use crate::error::{CleaningError, Result};
use crate::utils::{DtypeCategory, get_dtype_category, parse_datetime_string, parse_numeric_string};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Fill Strategies
// ============================================================================

/// Per-column policy for replacing missing cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum FillStrategy {
    /// Median of the non-missing values (numeric columns only).
    Median,
    /// Mean of the non-missing values (numeric columns only).
    Mean,
    /// Most frequent non-missing value; ties go to the smallest value.
    Mode,
    /// Caller-supplied literal.
    Constant(String),
    /// Leave missing cells untouched.
    #[default]
    LeaveMissing,
}

impl FillStrategy {
    /// Short name used in log entries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::Mean => "mean",
            Self::Mode => "mode",
            Self::Constant(_) => "constant",
            Self::LeaveMissing => "leave-as-missing",
        }
    }
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "constant({})", value),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for FillStrategy {
    type Err = CleaningError;

    /// Parses `median`, `mean`, `mode`, `leave` or `constant:<literal>`.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(value) = s.strip_prefix("constant:") {
            return Ok(Self::Constant(value.to_string()));
        }

        match s.trim().to_ascii_lowercase().as_str() {
            "median" => Ok(Self::Median),
            "mean" => Ok(Self::Mean),
            "mode" => Ok(Self::Mode),
            "leave" | "leave_missing" | "none" => Ok(Self::LeaveMissing),
            other => Err(CleaningError::InvalidConfig(format!(
                "unknown fill strategy '{}' (expected median, mean, mode, leave or constant:<value>)",
                other
            ))),
        }
    }
}

/// Mapping from column name to [`FillStrategy`], chosen once per run.
///
/// Columns with missing cells and no explicit entry use `default_strategy`.
/// Columns without missing cells are never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FillPlan {
    pub strategies: BTreeMap<String, FillStrategy>,
    pub default_strategy: FillStrategy,
}

impl FillPlan {
    /// Create an empty plan that leaves every missing cell as is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for a single column.
    pub fn with(mut self, column: impl Into<String>, strategy: FillStrategy) -> Self {
        self.strategies.insert(column.into(), strategy);
        self
    }

    /// Set the strategy used for columns without an explicit entry.
    pub fn with_default(mut self, strategy: FillStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Strategy that applies to `column`.
    pub fn strategy_for(&self, column: &str) -> &FillStrategy {
        self.strategies
            .get(column)
            .unwrap_or(&self.default_strategy)
    }

    /// Check the plan against the table before any stage runs.
    ///
    /// Every named column must exist, and constants must match the column's
    /// type: numeric columns need a number, date-time columns a date-time.
    /// A constant default is checked against every column it would fill.
    pub fn validate(&self, df: &DataFrame) -> Result<()> {
        for (column, strategy) in &self.strategies {
            let col = df
                .column(column)
                .map_err(|_| CleaningError::ColumnNotFound(column.clone()))?;
            check_constant(column, col.dtype(), strategy)?;
        }

        if matches!(self.default_strategy, FillStrategy::Constant(_)) {
            for col in df.get_columns() {
                let name = col.name().as_str();
                if col.null_count() > 0 && !self.strategies.contains_key(name) {
                    check_constant(name, col.dtype(), &self.default_strategy)?;
                }
            }
        }

        Ok(())
    }
}

/// Reject a constant that cannot be stored in a column of `dtype`.
pub(crate) fn check_constant(column: &str, dtype: &DataType, strategy: &FillStrategy) -> Result<()> {
    let FillStrategy::Constant(value) = strategy else {
        return Ok(());
    };

    match get_dtype_category(dtype) {
        DtypeCategory::Numeric if parse_numeric_string(value).is_none() => {
            Err(CleaningError::InvalidStrategy {
                column: column.to_string(),
                reason: format!("'{}' is not a number", value),
            })
        }
        DtypeCategory::Datetime if parse_datetime_string(value).is_none() => {
            Err(CleaningError::InvalidStrategy {
                column: column.to_string(),
                reason: format!("'{}' is not a date-time", value),
            })
        }
        _ => Ok(()),
    }
}

// ============================================================================
// Stage Outcomes
// ============================================================================

/// Result of the type coercion attempt for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionOutcome {
    /// Every non-missing cell parsed as a number.
    ConvertedToNumeric,
    /// Every non-missing cell parsed as a date-time.
    ConvertedToDatetime,
    /// The column keeps its original type.
    KeptOriginal,
}

impl CoercionOutcome {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::ConvertedToNumeric => "converted to numeric",
            Self::ConvertedToDatetime => "converted to datetime",
            Self::KeptOriginal => "kept as original type",
        }
    }
}

// ============================================================================
// Summary Types
// ============================================================================

/// Counts describing what a cleaning run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    /// Number of rows before cleaning.
    pub rows_before: usize,
    /// Number of rows after cleaning.
    pub rows_after: usize,
    /// Number of columns (unchanged by cleaning).
    pub columns: usize,
    /// Rows removed as exact duplicates.
    pub duplicates_removed: usize,
    /// Missing cells replaced by the filler.
    pub values_filled: usize,
    /// Columns whose labels changed during normalization.
    pub columns_renamed: usize,
    /// Columns converted to numeric or date-time.
    pub columns_converted: usize,
    /// Rows removed by the outlier filter.
    pub outliers_removed: usize,
}

impl CleaningSummary {
    /// Total number of rows removed by all stages.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

// ============================================================================
// Overview Types
// ============================================================================

/// Missing-value overview of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub dtype: String,
    pub missing_count: usize,
}

/// Overview of a loaded table, used to decide which columns need a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOverview {
    pub rows: usize,
    pub columns: usize,
    pub duplicate_rows: usize,
    pub column_overviews: Vec<ColumnOverview>,
}

impl TableOverview {
    /// Columns with at least one missing cell.
    pub fn columns_with_missing(&self) -> impl Iterator<Item = &ColumnOverview> {
        self.column_overviews
            .iter()
            .filter(|col| col.missing_count > 0)
    }
}
