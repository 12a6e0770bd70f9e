//! Tabular Data Cleaning Library
//!
//! A small batch pipeline for cleaning uploaded tables, built with Rust and Polars.
//!
//! # Overview
//!
//! A run takes one table through a fixed sequence of stages:
//!
//! - **Loading**: delimited text or the first sheet of a spreadsheet
//! - **Deduplication**: exact-duplicate rows removed, first occurrence kept
//! - **Missing values**: per-column median, mean, mode, constant or leave-as-missing
//! - **Normalization**: `snake_case` column labels, optional text-cell cleanup
//! - **Type coercion**: text columns reinterpreted as numbers or date-times
//! - **Outlier filtering**: rows with any `|z| > 3` removed
//! - **Reporting**: an ordered log of what every stage did
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cleanbot::{FillPlan, FillStrategy, Pipeline, SessionHistory};
//!
//! let plan = FillPlan::new()
//!     .with("Age", FillStrategy::Median)
//!     .with("City", FillStrategy::Constant("Unknown".to_string()));
//!
//! let pipeline = Pipeline::builder().fill_plan(plan).build()?;
//!
//! let mut history = SessionHistory::new();
//! let outcome = pipeline.clean_upload("people.csv", &bytes, &mut history)?;
//!
//! for line in outcome.report.lines() {
//!     println!("{}", line);
//! }
//! println!("Saved as {}", history.latest().unwrap().file_name);
//! ```
//!
//! # Choosing fill strategies
//!
//! Only columns with missing cells need a strategy. Use [`DataProfiler::overview`]
//! to find them before building the plan:
//!
//! ```rust,ignore
//! let df = TableLoader::default().load_path(Path::new("people.csv"))?;
//! for column in DataProfiler::overview(&df)?.columns_with_missing() {
//!     println!("{} ({}): {} missing", column.name, column.dtype, column.missing_count);
//! }
//! ```
//!
//! The plan is validated against the table before any stage runs. Unknown
//! columns and constants that do not fit the column type abort the run.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod history;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{ColumnNormalizer, Deduplicator, TypeCoercer};
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use history::{HistoryEntry, SessionHistory, cleaned_file_name, export_csv};
pub use imputers::{FillRecord, MissingValueFiller};
pub use loader::{TableFormat, TableLoader};
pub use pipeline::{
    CleaningOutcome, CleaningStage, ClosureProgressReporter, OutlierFilter, OutlierReport,
    Pipeline, PipelineBuilder, ProgressReporter, ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use reporting::{CleaningReport, ReportEntry};
pub use types::{
    CleaningSummary, CoercionOutcome, ColumnOverview, FillPlan, FillStrategy, TableOverview,
};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype, parse_numeric_string};
