//! Report generation module.
//!
//! The [`CleaningReport`] collects every stage's log entries in stage
//! order. It is pure aggregation and never touches the table.
//!
//! # Example
//!
//! ```rust,ignore
//! let outcome = pipeline.process(df)?;
//!
//! for line in outcome.report.lines() {
//!     println!("{}", line);
//! }
//!
//! // Or as JSON
//! println!("{}", serde_json::to_string_pretty(&outcome.report)?);
//! ```

mod report;

pub use report::{CleaningReport, ReportEntry};
