//! Table-shaping cleaning stages.
//!
//! This module provides:
//! - Exact-duplicate row removal ([`Deduplicator`])
//! - Column label and text-cell normalization ([`ColumnNormalizer`])
//! - Best-effort type coercion of text columns ([`TypeCoercer`])
//!
//! Each stage takes a table by value and returns a new table plus the
//! counts the report needs.

mod converters;
mod dedup;
mod normalizer;
mod type_coercer;

pub use dedup::Deduplicator;
pub use normalizer::{
    ColumnNormalizer, NormalizationResult, normalize_column_name, normalize_text_value,
};
pub use type_coercer::TypeCoercer;
