//! Exact-duplicate row removal.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Removes rows that repeat an earlier row in every column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator;

impl Deduplicator {
    /// Drop exact-duplicate rows, keeping the first occurrence.
    ///
    /// Row order is otherwise preserved. Missing cells compare equal to each
    /// other. Returns the table and the number of rows removed.
    pub fn deduplicate(&self, df: DataFrame) -> Result<(DataFrame, usize)> {
        let height = df.height();
        if height == 0 {
            return Ok((df, 0));
        }

        let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let removed = height - deduped.height();

        if removed == 0 {
            debug!("No duplicate rows found");
            return Ok((df, 0));
        }

        debug!("Removed {} duplicate rows of {}", removed, height);
        Ok((deduped, removed))
    }

    /// Number of rows that `deduplicate` would remove.
    pub fn count_duplicates(&self, df: &DataFrame) -> Result<usize> {
        if df.height() == 0 {
            return Ok(0);
        }
        let unique = df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?;
        Ok(df.height() - unique.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DataFrame {
        df![
            "id" => [1, 2, 1, 3, 2],
            "name" => [Some("a"), None, Some("a"), Some("c"), None],
        ]
        .unwrap()
    }

    #[test]
    fn test_removes_duplicates_keeping_first() {
        let (df, removed) = Deduplicator.deduplicate(sample()).unwrap();

        assert_eq!(removed, 2);
        let ids: Vec<Option<i32>> = df.column("id").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(df.column("name").unwrap().null_count(), 1);
    }

    #[test]
    fn test_deduplicate_is_idempotent() {
        let (once, _) = Deduplicator.deduplicate(sample()).unwrap();
        let (twice, removed) = Deduplicator.deduplicate(once.clone()).unwrap();

        assert_eq!(removed, 0);
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_rows_differing_in_one_column_are_kept() {
        let df = df![
            "a" => [1, 1],
            "b" => ["x", "y"],
        ]
        .unwrap();

        let (out, removed) = Deduplicator.deduplicate(df).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn test_count_duplicates_matches() {
        assert_eq!(Deduplicator.count_duplicates(&sample()).unwrap(), 2);
    }

    #[test]
    fn test_signed_zeros_are_equal() {
        let df = df!["x" => [0.0, -0.0, 1.0, 0.0]].unwrap();

        let (out, removed) = Deduplicator.deduplicate(df).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(out.height(), 2);
        let xs: Vec<Option<f64>> = out.column("x").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(xs, vec![Some(0.0), Some(1.0)]);
    }

    #[test]
    fn test_empty_table() {
        let df = DataFrame::empty();
        let (out, removed) = Deduplicator.deduplicate(df).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(out.height(), 0);
    }
}
