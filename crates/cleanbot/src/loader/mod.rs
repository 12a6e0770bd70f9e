//! Table loading from uploaded files.
//!
//! Two input formats are supported:
//! - delimited text (first row is the header, field types inferred on load)
//! - spreadsheets (first sheet, first row is the header)
//!
//! Both paths produce a `DataFrame` in which configured null markers are
//! already missing cells. Anything that cannot be read as a table fails with
//! [`CleaningError::Load`] and aborts the run.

mod delimited;
mod spreadsheet;

use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Delimited text such as CSV.
    Delimited,
    /// Spreadsheet workbook; only the first sheet is read.
    Spreadsheet,
}

impl TableFormat {
    /// Detect the format from a file name's extension.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "txt" | "tsv" => Ok(Self::Delimited),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Spreadsheet),
            other => Err(CleaningError::load(
                file_name,
                format!("unsupported file type '{}'", other),
            )),
        }
    }
}

/// Loads uploaded files into tables.
#[derive(Debug, Clone)]
pub struct TableLoader {
    separator: u8,
    null_values: Vec<String>,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::from_config(&CleaningConfig::default())
    }
}

impl TableLoader {
    /// Create a loader using the separator and null markers of `config`.
    pub fn from_config(config: &CleaningConfig) -> Self {
        Self {
            separator: config.separator,
            null_values: config.null_values.clone(),
        }
    }

    /// Load a table from a file on disk.
    pub fn load_path(&self, path: &Path) -> Result<DataFrame> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();

        info!("Loading table from: {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| CleaningError::load(&file_name, e))?;
        self.load_bytes(&file_name, &bytes)
    }

    /// Load a table from the raw bytes of an uploaded file.
    pub fn load_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<DataFrame> {
        if bytes.is_empty() {
            return Err(CleaningError::load(file_name, "file is empty"));
        }

        let format = TableFormat::from_file_name(file_name)?;
        debug!("Detected {:?} input for '{}'", format, file_name);

        let df = match format {
            TableFormat::Delimited => {
                delimited::read_delimited(bytes, self.separator, &self.null_values)
            }
            TableFormat::Spreadsheet => spreadsheet::read_first_sheet(bytes, &self.null_values),
        }
        .map_err(|e| CleaningError::load(file_name, e))?;

        if df.width() == 0 {
            return Err(CleaningError::load(file_name, "no columns found"));
        }

        info!("Table loaded successfully: {:?}", df.shape());
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            TableFormat::from_file_name("sales data.CSV").unwrap(),
            TableFormat::Delimited
        );
        assert_eq!(
            TableFormat::from_file_name("book.xlsx").unwrap(),
            TableFormat::Spreadsheet
        );
        assert!(TableFormat::from_file_name("notes.pdf").is_err());
        assert!(TableFormat::from_file_name("no_extension").is_err());
    }

    #[test]
    fn test_load_csv_bytes() {
        let csv = b"Name,Age\nAda,36\nAlan,\nGrace,N/A\n";
        let df = TableLoader::default().load_bytes("people.csv", csv).unwrap();

        assert_eq!(df.shape(), (3, 2));
        assert_eq!(df.column("Age").unwrap().null_count(), 2);
        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_empty_file_is_load_error() {
        let err = TableLoader::default().load_bytes("empty.csv", b"").unwrap_err();
        assert!(err.is_load_error());
    }

    #[test]
    fn test_corrupt_spreadsheet_is_load_error() {
        let err = TableLoader::default()
            .load_bytes("broken.xlsx", b"definitely not a zip archive")
            .unwrap_err();
        assert_eq!(err.error_code(), "LOAD_ERROR");
    }

    #[test]
    fn test_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"team;score\nred;1.5\nblue;2\n").unwrap();

        let config = CleaningConfig::builder().separator(b';').build().unwrap();
        let df = TableLoader::from_config(&config).load_path(&path).unwrap();

        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_missing_path_is_load_error() {
        let err = TableLoader::default()
            .load_path(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(err.is_load_error());
    }
}
