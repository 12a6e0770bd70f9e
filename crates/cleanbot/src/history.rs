//! Export of cleaned tables and the caller-owned session history.
//!
//! The history is an append-only list owned by the caller. The pipeline
//! only appends to it after a run has fully succeeded.

use crate::error::Result;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Serialize a table as delimited text.
///
/// The header row holds the column names, each row is one line and no index
/// column is written. The same table always produces the same bytes.
pub fn export_csv(df: &mut DataFrame, separator: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(separator)
        .with_quote_char(b'"')
        .finish(df)?;
    Ok(buf)
}

/// Name under which a cleaned upload is stored: `cleaned_` plus the
/// original name with spaces replaced by underscores.
pub fn cleaned_file_name(original: &str) -> String {
    format!("cleaned_{}", original.replace(' ', "_"))
}

/// One successfully cleaned upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl HistoryEntry {
    /// Entry for the cleaned form of `original_name`, stamped now.
    pub fn new(original_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: cleaned_file_name(original_name),
            created_at: Utc::now(),
            bytes,
        }
    }
}

/// Append-only list of cleaned files for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
