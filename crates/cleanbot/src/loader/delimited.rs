//! Delimited text reading.

use anyhow::Result;
use polars::prelude::*;
use std::io::Cursor;

/// Read delimited text with a header row, inferring types over the full input.
pub(super) fn read_delimited(
    bytes: &[u8],
    separator: u8,
    null_values: &[String],
) -> Result<DataFrame> {
    let parse_options = CsvParseOptions::default()
        .with_separator(separator)
        .with_quote_char(Some(b'"'))
        .with_null_values(Some(NullValues::AllColumns(
            null_values.iter().map(|v| v.as_str().into()).collect(),
        )));

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()?;

    Ok(df)
}
