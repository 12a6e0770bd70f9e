//! Total parse attempts used by the type coercer.
//!
//! Each attempt either converts every non-missing cell of a text column or
//! returns `None`; a partial conversion is never produced.

use crate::utils::{parse_datetime_string, parse_integer_string, parse_numeric_string};
use polars::prelude::*;

/// Parse every non-missing cell with `parse`, or give up on the first failure.
fn parse_all<T, F>(values: &StringChunked, parse: F) -> Option<Vec<Option<T>>>
where
    F: Fn(&str) -> Option<T>,
{
    values
        .into_iter()
        .map(|cell| match cell {
            Some(text) => parse(text).map(Some),
            None => Some(None),
        })
        .collect()
}

/// Convert a text series to Int64 if every cell is an integer.
pub(crate) fn try_string_to_integer(series: &Series) -> PolarsResult<Option<Series>> {
    let parsed = parse_all(series.str()?, parse_integer_string);
    Ok(parsed.map(|values| Series::new(series.name().clone(), values)))
}

/// Convert a text series to Float64 if every cell is a finite number.
pub(crate) fn try_string_to_float(series: &Series) -> PolarsResult<Option<Series>> {
    let parsed = parse_all(series.str()?, parse_numeric_string);
    Ok(parsed.map(|values| Series::new(series.name().clone(), values)))
}

/// Convert a text series to millisecond date-times if every cell parses.
pub(crate) fn try_string_to_datetime(series: &Series) -> PolarsResult<Option<Series>> {
    match parse_all(series.str()?, parse_datetime_string) {
        Some(millis) => {
            let converted = Series::new(series.name().clone(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
            Ok(Some(converted))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[Option<&str>]) -> Series {
        Series::new("col".into(), values.to_vec())
    }

    #[test]
    fn test_integer_conversion() {
        let converted = try_string_to_integer(&text(&[Some("1"), None, Some(" 3 ")]))
            .unwrap()
            .unwrap();
        assert_eq!(converted.dtype(), &DataType::Int64);
        assert_eq!(converted.null_count(), 1);
    }

    #[test]
    fn test_float_requires_every_cell() {
        assert!(try_string_to_float(&text(&[Some("1.5"), Some("x")])).unwrap().is_none());
        assert!(try_string_to_float(&text(&[Some("1.5"), Some("2")])).unwrap().is_some());
        assert!(try_string_to_float(&text(&[Some("inf")])).unwrap().is_none());
    }

    #[test]
    fn test_datetime_conversion() {
        let converted = try_string_to_datetime(&text(&[Some("2024-01-01"), Some("2024-02-01")]))
            .unwrap()
            .unwrap();
        assert_eq!(
            converted.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert!(try_string_to_datetime(&text(&[Some("soon")])).unwrap().is_none());
    }
}
