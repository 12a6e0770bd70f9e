//! Ordered log of what each cleaning stage did.

use crate::pipeline::progress::CleaningStage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of the cleaning report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Stage that produced the entry
    pub stage: CleaningStage,
    /// Human-readable description
    pub message: String,
    /// Whether the stage changed the table
    pub changed: bool,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage.display_name(), self.message)
    }
}

/// Log entries from every stage of a run, in stage order.
///
/// A report is created fresh for each run. Entries that describe a change
/// to the table are *effects*; the rest are informational notes such as
/// "no duplicates found" or a skipped zero-variance column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    entries: Vec<ReportEntry>,
}

impl CleaningReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change made to the table.
    pub fn effect(&mut self, stage: CleaningStage, message: impl Into<String>) {
        self.push(stage, message.into(), true);
    }

    /// Record an observation that did not change the table.
    pub fn note(&mut self, stage: CleaningStage, message: impl Into<String>) {
        self.push(stage, message.into(), false);
    }

    fn push(&mut self, stage: CleaningStage, message: String, changed: bool) {
        self.entries.push(ReportEntry {
            stage,
            message,
            changed,
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Entries that changed the table.
    pub fn effects(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|entry| entry.changed)
    }

    /// Entries for a single stage.
    pub fn for_stage(&self, stage: CleaningStage) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |entry| entry.stage == stage)
    }

    /// Rendered lines for display.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> CleaningReport {
        let mut report = CleaningReport::new();
        report.effect(CleaningStage::Deduplication, "Removed 2 duplicate rows");
        report.note(CleaningStage::Filling, "No missing values found");
        report.effect(CleaningStage::Normalization, "Renamed 1 column");
        report
    }

    #[test]
    fn test_effects_keep_stage_order() {
        let report = sample();
        let stages: Vec<CleaningStage> = report.effects().map(|e| e.stage).collect();

        assert_eq!(
            stages,
            vec![CleaningStage::Deduplication, CleaningStage::Normalization]
        );
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_lines_include_stage_name() {
        let lines = sample().lines();
        assert_eq!(lines[0], "[Removing Duplicates] Removed 2 duplicate rows");
    }

    #[test]
    fn test_for_stage() {
        let report = sample();
        assert_eq!(report.for_stage(CleaningStage::Filling).count(), 1);
        assert_eq!(report.for_stage(CleaningStage::TypeCoercion).count(), 0);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["entries"][0]["stage"], "deduplication");
        assert_eq!(json["entries"][1]["changed"], false);
    }
}
