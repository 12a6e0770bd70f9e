//! Column label and text-cell normalization.

use crate::error::{CleaningError, Result};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace"));
static PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("Invalid regex: punctuation"));

/// Canonical column label: trimmed, lower-cased, whitespace runs as `_`.
///
/// Applying it to its own output changes nothing.
pub fn normalize_column_name(name: &str) -> String {
    WHITESPACE_RE
        .replace_all(name.trim(), "_")
        .to_lowercase()
}

/// Normalized text cell: lower-cased, punctuation stripped, whitespace
/// collapsed and trimmed, first letter capitalized.
pub fn normalize_text_value(value: &str) -> String {
    let lowered = value.to_lowercase();
    let stripped = PUNCTUATION_RE.replace_all(&lowered, "");
    let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");
    capitalize(collapsed.trim())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Outcome of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationResult {
    /// `(original, normalized)` for every label that changed.
    pub renamed: Vec<(String, String)>,
    /// Text columns whose cell contents were rewritten.
    pub text_columns: Vec<String>,
}

/// Rewrites column labels and, optionally, text-cell content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnNormalizer {
    normalize_text: bool,
}

impl ColumnNormalizer {
    pub fn new(normalize_text: bool) -> Self {
        Self { normalize_text }
    }

    /// Normalize all column labels, then text cells if enabled.
    ///
    /// Fails with [`CleaningError::ColumnNameCollision`] before renaming
    /// anything if two labels would normalize to the same name.
    pub fn normalize(&self, mut df: DataFrame) -> Result<(DataFrame, NormalizationResult)> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        check_collisions(&names)?;

        let mut result = NormalizationResult::default();
        for name in &names {
            let normalized = normalize_column_name(name);
            if normalized != *name {
                df.rename(name, normalized.as_str().into())?;
                debug!("Renamed column '{}' -> '{}'", name, normalized);
                result.renamed.push((name.clone(), normalized));
            }
        }

        if self.normalize_text {
            result.text_columns = normalize_text_columns(&mut df)?;
        }

        Ok((df, result))
    }
}

fn check_collisions(names: &[String]) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(names.len());
    for name in names {
        let normalized = normalize_column_name(name);
        if let Some(first) = seen.get(&normalized) {
            return Err(CleaningError::ColumnNameCollision {
                first: first.to_string(),
                second: name.clone(),
                normalized,
            });
        }
        seen.insert(normalized, name);
    }
    Ok(())
}

fn normalize_text_columns(df: &mut DataFrame) -> Result<Vec<String>> {
    let text_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype() == &DataType::String)
        .map(|col| col.name().to_string())
        .collect();

    for name in &text_columns {
        let series = df.column(name)?.as_materialized_series();
        let values: Vec<Option<String>> = series
            .str()?
            .into_iter()
            .map(|v| v.map(normalize_text_value))
            .collect();

        df.replace(name, Series::new(name.as_str().into(), values))?;
        debug!("Normalized text in column '{}'", name);
    }

    Ok(text_columns)
}
