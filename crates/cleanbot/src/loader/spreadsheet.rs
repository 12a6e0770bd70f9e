//! Spreadsheet reading (first sheet only).

use anyhow::{Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::io::Cursor;

/// A spreadsheet cell after classification.
#[derive(Debug, Clone, PartialEq)]
enum SheetCell {
    Missing,
    Number(f64),
    Text(String),
}

fn classify(cell: &Data, null_values: &[String]) -> SheetCell {
    let text = match cell {
        Data::Empty | Data::Error(_) => return SheetCell::Missing,
        Data::Int(value) => return SheetCell::Number(*value as f64),
        Data::Float(value) => return SheetCell::Number(*value),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
    };

    if null_values.iter().any(|marker| marker == text.trim()) {
        SheetCell::Missing
    } else {
        SheetCell::Text(text)
    }
}

/// Build one typed Series from classified cells.
///
/// All-numeric columns become Int64 when every value is whole, otherwise
/// Float64. Anything else becomes a String column.
fn build_series(name: &str, cells: Vec<SheetCell>) -> Series {
    let all_numeric = cells
        .iter()
        .all(|c| matches!(c, SheetCell::Missing | SheetCell::Number(_)));

    if all_numeric {
        let numbers: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                SheetCell::Number(v) => Some(*v),
                _ => None,
            })
            .collect();

        let all_whole = numbers
            .iter()
            .flatten()
            .all(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64);

        if all_whole {
            let ints: Vec<Option<i64>> = numbers.iter().map(|v| v.map(|x| x as i64)).collect();
            return Series::new(name.into(), ints);
        }
        return Series::new(name.into(), numbers);
    }

    let texts: Vec<Option<String>> = cells
        .into_iter()
        .map(|c| match c {
            SheetCell::Missing => None,
            SheetCell::Number(v) => Some(v.to_string()),
            SheetCell::Text(s) => Some(s),
        })
        .collect();
    Series::new(name.into(), texts)
}

/// Read the first sheet of a workbook, using its first row as the header.
pub(super) fn read_first_sheet(bytes: &[u8], null_values: &[String]) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| anyhow!("failed to open workbook: {}", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("no worksheet found"))?
        .map_err(|e| anyhow!("failed to read worksheet: {}", e))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| anyhow!("worksheet is empty"))?;
    let body: Vec<_> = rows.collect();

    let mut columns = Vec::with_capacity(header.len());
    for (idx, header_cell) in header.iter().enumerate() {
        let label = header_cell.to_string();
        let name = if label.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            label
        };

        let cells: Vec<SheetCell> = body
            .iter()
            .map(|row| match row.get(idx) {
                Some(cell) => classify(cell, null_values),
                None => SheetCell::Missing,
            })
            .collect();

        columns.push(Column::from(build_series(&name, cells)));
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_numbers_become_integers() {
        let series = build_series(
            "qty",
            vec![SheetCell::Number(1.0), SheetCell::Missing, SheetCell::Number(3.0)],
        );
        assert_eq!(series.dtype(), &DataType::Int64);
        assert_eq!(series.null_count(), 1);
    }

    #[test]
    fn test_fractional_numbers_become_floats() {
        let series = build_series("price", vec![SheetCell::Number(1.5), SheetCell::Number(2.0)]);
        assert_eq!(series.dtype(), &DataType::Float64);
    }

    #[test]
    fn test_error_cells_and_markers_are_missing() {
        let markers = vec!["N/A".to_string()];
        assert_eq!(
            classify(&Data::String("N/A".to_string()), &markers),
            SheetCell::Missing
        );
        assert_eq!(classify(&Data::Empty, &markers), SheetCell::Missing);
        assert_eq!(classify(&Data::Int(4), &markers), SheetCell::Number(4.0));
        assert_eq!(
            classify(&Data::Bool(true), &markers),
            SheetCell::Text("true".to_string())
        );
    }

    #[test]
    fn test_mixed_cells_become_text() {
        let series = build_series(
            "code",
            vec![SheetCell::Number(7.0), SheetCell::Text("A1".to_string())],
        );
        assert_eq!(series.dtype(), &DataType::String);
        assert_eq!(series.str().unwrap().get(0), Some("7"));
    }
}
