//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! running the cleaning stages in order.

use crate::cleaner::{ColumnNormalizer, Deduplicator, TypeCoercer};
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result, ResultExt};
use crate::history::{HistoryEntry, SessionHistory, export_csv};
use crate::imputers::{FillRecord, MissingValueFiller};
use crate::loader::TableLoader;
use crate::pipeline::outliers::OutlierFilter;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::reporting::CleaningReport;
use crate::types::{CleaningSummary, CoercionOutcome, FillPlan};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    /// The cleaned table.
    pub data: DataFrame,
    /// Log entries from every stage, in stage order.
    pub report: CleaningReport,
    /// Counts describing the run.
    pub summary: CleaningSummary,
}

/// The cleaning pipeline.
///
/// Stages run in a fixed order: deduplication, missing-value filling,
/// column normalization, type coercion, outlier filtering. Each stage takes
/// the previous stage's table by value. A stage error aborts the run and is
/// returned with the stage name as context.
///
/// Use [`Pipeline::builder()`] to create a new pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use cleanbot::{CleaningConfig, FillPlan, FillStrategy, Pipeline};
///
/// let plan = FillPlan::new()
///     .with("age", FillStrategy::Median)
///     .with("city", FillStrategy::Constant("Unknown".to_string()));
///
/// let outcome = Pipeline::builder()
///     .config(CleaningConfig::builder().normalize_text(true).build()?)
///     .fill_plan(plan)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
/// ```
pub struct Pipeline {
    config: CleaningConfig,
    fill_plan: FillPlan,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    loader: TableLoader,
    normalizer: ColumnNormalizer,
    outlier_filter: OutlierFilter,
}

// Ensure Pipeline is Send (can be moved to a worker thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    pub fn fill_plan(&self) -> &FillPlan {
        &self.fill_plan
    }

    /// Loader configured with this pipeline's separator and null markers.
    pub fn loader(&self) -> &TableLoader {
        &self.loader
    }

    /// Run every stage on `df`.
    ///
    /// The fill plan is validated against the table before any stage runs.
    pub fn process(&self, df: DataFrame) -> Result<CleaningOutcome> {
        match self.process_internal(df) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Load an uploaded file, clean it, and record the result in `history`.
    ///
    /// `history` is only appended to when every step succeeds, so a failed
    /// run leaves it untouched.
    pub fn clean_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        history: &mut SessionHistory,
    ) -> Result<CleaningOutcome> {
        let df = self
            .loader
            .load_bytes(file_name, bytes)
            .context("Loading upload")?;

        let mut outcome = self.process(df)?;
        let cleaned = self
            .export(&mut outcome.data)
            .context("Exporting cleaned table")?;

        let entry = HistoryEntry::new(file_name, cleaned);
        info!("Recorded '{}' in session history", entry.file_name);
        history.record(entry);

        Ok(outcome)
    }

    /// Serialize a table with this pipeline's separator.
    pub fn export(&self, df: &mut DataFrame) -> Result<Vec<u8>> {
        export_csv(df, self.config.separator)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn enter_stage(&self, stage: CleaningStage, message: &str) {
        info!("{}", message);
        self.report_progress(ProgressUpdate::new(stage, message));
    }

    fn process_internal(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let start_time = Instant::now();
        let mut report = CleaningReport::new();
        let mut summary = CleaningSummary {
            rows_before: df.height(),
            columns: df.width(),
            ..Default::default()
        };

        // Step 0: Validate the plan before touching the table
        self.enter_stage(CleaningStage::Validating, "Validating fill plan...");
        self.fill_plan
            .validate(&df)
            .context("Validating fill plan")?;

        // Step 1: Remove duplicates
        self.enter_stage(CleaningStage::Deduplication, "Step 1: Removing duplicate rows...");
        let (df, removed) = Deduplicator
            .deduplicate(df)
            .context("Removing duplicates")?;
        summary.duplicates_removed = removed;
        if removed > 0 {
            report.effect(
                CleaningStage::Deduplication,
                format!("Removed {} duplicate rows", removed),
            );
        } else {
            report.note(CleaningStage::Deduplication, "No duplicate rows found");
        }

        // Step 2: Fill missing values
        self.enter_stage(CleaningStage::Filling, "Step 2: Filling missing values...");
        let (df, records) =
            MissingValueFiller::fill(df, &self.fill_plan).context("Filling missing values")?;
        if records.is_empty() {
            report.note(CleaningStage::Filling, "No missing values found");
        }
        for record in &records {
            summary.values_filled += record.values_filled();
            match record {
                FillRecord::Filled { .. } => report.effect(CleaningStage::Filling, record.describe()),
                _ => report.note(CleaningStage::Filling, record.describe()),
            }
        }

        // Step 3: Normalize column labels (and text cells if enabled)
        self.enter_stage(CleaningStage::Normalization, "Step 3: Normalizing columns...");
        let (df, normalization) = self
            .normalizer
            .normalize(df)
            .context("Normalizing columns")?;
        summary.columns_renamed = normalization.renamed.len();
        if normalization.renamed.is_empty() {
            report.note(CleaningStage::Normalization, "Column names already normalized");
        } else {
            let renames: Vec<String> = normalization
                .renamed
                .iter()
                .map(|(from, to)| format!("'{}' -> '{}'", from, to))
                .collect();
            report.effect(
                CleaningStage::Normalization,
                format!(
                    "Normalized {} column names: {}",
                    renames.len(),
                    renames.join(", ")
                ),
            );
        }
        if !normalization.text_columns.is_empty() {
            report.effect(
                CleaningStage::Normalization,
                format!(
                    "Normalized text in columns: {}",
                    normalization.text_columns.join(", ")
                ),
            );
        }

        // Step 4: Coerce column types
        self.enter_stage(CleaningStage::TypeCoercion, "Step 4: Coercing column types...");
        let (df, outcomes) = TypeCoercer.coerce(df).context("Coercing column types")?;
        for (column, outcome) in &outcomes {
            let message = format!("Column '{}' {}", column, outcome.describe());
            if *outcome == CoercionOutcome::KeptOriginal {
                report.note(CleaningStage::TypeCoercion, message);
            } else {
                summary.columns_converted += 1;
                report.effect(CleaningStage::TypeCoercion, message);
            }
        }

        // Step 5: Filter outliers
        self.enter_stage(CleaningStage::OutlierFiltering, "Step 5: Filtering outliers...");
        let (df, outliers) = self
            .outlier_filter
            .filter(df)
            .context("Filtering outliers")?;
        summary.outliers_removed = outliers.rows_removed;
        for column in &outliers.degenerate {
            report.note(
                CleaningStage::OutlierFiltering,
                format!("Skipped '{}': values do not vary", column),
            );
        }
        if outliers.rows_removed > 0 {
            report.effect(
                CleaningStage::OutlierFiltering,
                format!(
                    "Removed {} outlier rows (|z| > {})",
                    outliers.rows_removed,
                    self.outlier_filter.threshold()
                ),
            );
        } else {
            report.note(
                CleaningStage::OutlierFiltering,
                format!("No outliers found (|z| > {})", self.outlier_filter.threshold()),
            );
        }

        summary.rows_after = df.height();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Cleaning finished: {} -> {} rows in {} ms",
            summary.rows_before, summary.rows_after, summary.duration_ms
        );

        Ok(CleaningOutcome {
            data: df,
            report,
            summary,
        })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    fill_plan: Option<FillPlan>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the per-column fill strategies.
    ///
    /// Without a plan every missing cell is left as is.
    pub fn fill_plan(mut self, plan: FillPlan) -> Self {
        self.fill_plan = Some(plan);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;

        Ok(Pipeline {
            loader: TableLoader::from_config(&config),
            normalizer: ColumnNormalizer::new(config.normalize_text),
            outlier_filter: OutlierFilter::new(config.outlier_threshold),
            fill_plan: self.fill_plan.unwrap_or_default(),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}
