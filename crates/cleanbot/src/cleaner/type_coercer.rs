//! Best-effort type coercion of text columns.

use super::converters::{try_string_to_datetime, try_string_to_float, try_string_to_integer};
use crate::error::Result;
use crate::types::CoercionOutcome;
use polars::prelude::*;
use tracing::debug;

/// Reinterprets text columns as numbers or date-times.
///
/// Per column the attempts run in a fixed order: integer, float, date-time.
/// The first attempt that parses every non-missing cell wins; otherwise the
/// column keeps its type. Columns that are not text are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercer;

impl TypeCoercer {
    pub fn coerce(&self, mut df: DataFrame) -> Result<(DataFrame, Vec<(String, CoercionOutcome)>)> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            let series = df.column(&name)?.as_materialized_series().clone();
            let (converted, outcome) = coerce_series(&series)?;

            if let Some(converted) = converted {
                df.replace(&name, converted)?;
            }
            debug!("Column '{}': {}", name, outcome.describe());
            outcomes.push((name, outcome));
        }

        Ok((df, outcomes))
    }
}

/// Coerce a single series, returning the replacement (if any) and the outcome.
pub(crate) fn coerce_series(series: &Series) -> Result<(Option<Series>, CoercionOutcome)> {
    if series.dtype() != &DataType::String {
        return Ok((None, CoercionOutcome::KeptOriginal));
    }

    // A text column with nothing in it trivially parses as numeric.
    if series.null_count() == series.len() {
        let empty = series.cast(&DataType::Float64)?;
        return Ok((Some(empty), CoercionOutcome::ConvertedToNumeric));
    }

    if let Some(converted) = try_string_to_integer(series)? {
        return Ok((Some(converted), CoercionOutcome::ConvertedToNumeric));
    }
    if let Some(converted) = try_string_to_float(series)? {
        return Ok((Some(converted), CoercionOutcome::ConvertedToNumeric));
    }
    if let Some(converted) = try_string_to_datetime(series)? {
        return Ok((Some(converted), CoercionOutcome::ConvertedToDatetime));
    }

    Ok((None, CoercionOutcome::KeptOriginal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coercion_outcomes() {
        let df = df![
            "nums" => ["1", "2", "3"],
            "dates" => ["2024-01-01", "2024-02-01", "2024-03-01"],
            "mixed" => ["a", "2", "x"],
            "floats" => ["1.5", "2", "-0.25"],
        ]
        .unwrap();

        let (df, outcomes) = TypeCoercer.coerce(df).unwrap();

        assert_eq!(
            outcomes,
            vec![
                ("nums".to_string(), CoercionOutcome::ConvertedToNumeric),
                ("dates".to_string(), CoercionOutcome::ConvertedToDatetime),
                ("mixed".to_string(), CoercionOutcome::KeptOriginal),
                ("floats".to_string(), CoercionOutcome::ConvertedToNumeric),
            ]
        );
        assert_eq!(df.column("nums").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("floats").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            df.column("dates").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(df.column("mixed").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_cells_do_not_block_conversion() {
        let df = df!["n" => [Some("4"), None, Some("6")]].unwrap();
        let (df, outcomes) = TypeCoercer.coerce(df).unwrap();

        assert_eq!(outcomes[0].1, CoercionOutcome::ConvertedToNumeric);
        assert_eq!(df.column("n").unwrap().null_count(), 1);
    }

    #[test]
    fn test_all_missing_text_becomes_numeric() {
        let df = df!["empty" => [None::<&str>, None]].unwrap();
        let (df, outcomes) = TypeCoercer.coerce(df).unwrap();

        assert_eq!(outcomes[0].1, CoercionOutcome::ConvertedToNumeric);
        assert_eq!(df.column("empty").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_non_text_columns_are_kept() {
        let df = df!["x" => [1.0, 2.0]].unwrap();
        let (_, outcomes) = TypeCoercer.coerce(df).unwrap();
        assert_eq!(outcomes[0].1, CoercionOutcome::KeptOriginal);
    }
}
