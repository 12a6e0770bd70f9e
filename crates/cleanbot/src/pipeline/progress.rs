//! Progress reporting for the cleaning pipeline.
//!
//! A run cannot be cancelled once started, so progress is one-way: the
//! pipeline emits a [`ProgressUpdate`] at every stage boundary and the
//! caller decides what to do with it.
//!
//! # Example
//!
//! ```rust,ignore
//! use cleanbot::Pipeline;
//!
//! let outcome = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Validating the fill plan against the table
    Validating,
    /// Removing exact-duplicate rows
    Deduplication,
    /// Filling missing values
    Filling,
    /// Normalizing column labels and text cells
    Normalization,
    /// Coercing text columns to numbers or date-times
    TypeCoercion,
    /// Removing outlier rows
    OutlierFiltering,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Validating => "Validating Plan",
            Self::Deduplication => "Removing Duplicates",
            Self::Filling => "Filling Missing Values",
            Self::Normalization => "Normalizing Columns",
            Self::TypeCoercion => "Coercing Types",
            Self::OutlierFiltering => "Filtering Outliers",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Cumulative progress (0.0 - 1.0) at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Validating => 0.0,
            Self::Deduplication => 0.05,
            Self::Filling => 0.20,
            Self::Normalization => 0.50,
            Self::TypeCoercion => 0.60,
            Self::OutlierFiltering => 0.80,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted at a stage boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Update marking the start of `stage`.
    pub fn new(stage: CleaningStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.base_progress(),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(CleaningStage::Complete, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(CleaningStage::Failed, message)
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

/// Trait for receiving progress updates during cleaning.
///
/// Implementations must be `Send + Sync` so a caller can run the pipeline
/// on a worker thread and forward updates elsewhere.
pub trait ProgressReporter: Send + Sync {
    /// Called once per stage boundary. Should return quickly.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_stage_progress_is_monotonic() {
        let order = [
            CleaningStage::Validating,
            CleaningStage::Deduplication,
            CleaningStage::Filling,
            CleaningStage::Normalization,
            CleaningStage::TypeCoercion,
            CleaningStage::OutlierFiltering,
            CleaningStage::Complete,
        ];

        for pair in order.windows(2) {
            assert!(pair[0].base_progress() < pair[1].base_progress());
        }
    }

    #[test]
    fn test_closure_reporter_forwards_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ClosureProgressReporter::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push(update.stage);
        });

        reporter.report(ProgressUpdate::new(CleaningStage::Filling, "filling"));
        reporter.report(ProgressUpdate::complete("done"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![CleaningStage::Filling, CleaningStage::Complete]
        );
    }

    #[test]
    fn test_update_serializes_snake_case() {
        let json = serde_json::to_string(&ProgressUpdate::new(
            CleaningStage::OutlierFiltering,
            "screening",
        ))
        .unwrap();
        assert!(json.contains("\"outlier_filtering\""));
    }
}
