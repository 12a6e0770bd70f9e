//! Table overview used before cleaning.
//!
//! The overview lists each column's type and missing count so a caller can
//! decide which columns need a fill strategy.

use crate::cleaner::Deduplicator;
use crate::error::Result;
use crate::types::{ColumnOverview, TableOverview};
use polars::prelude::*;

/// Profiler for a freshly loaded table.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarize shape, duplicate rows and per-column missing counts.
    pub fn overview(df: &DataFrame) -> Result<TableOverview> {
        let column_overviews = df
            .get_columns()
            .iter()
            .map(|col| ColumnOverview {
                name: col.name().to_string(),
                dtype: format!("{:?}", col.dtype()),
                missing_count: col.null_count(),
            })
            .collect();

        Ok(TableOverview {
            rows: df.height(),
            columns: df.width(),
            duplicate_rows: Deduplicator.count_duplicates(df)?,
            column_overviews,
        })
    }
}
