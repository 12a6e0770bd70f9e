//! Pipeline module.
//!
//! This module provides the main cleaning pipeline and related components.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{CleaningOutcome, Pipeline, PipelineBuilder};
pub use outliers::{OutlierFilter, OutlierReport};
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
