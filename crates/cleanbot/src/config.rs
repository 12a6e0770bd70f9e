//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

/// Default z-score beyond which a row is treated as an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Markers that load as missing cells from delimited text and spreadsheets.
pub const DEFAULT_NULL_VALUES: [&str; 9] =
    ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

fn default_null_values() -> Vec<String> {
    DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect()
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use cleanbot::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .normalize_text(true)
///     .outlier_threshold(3.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Whether to normalize the content of text cells (lower-case, strip
    /// punctuation, collapse whitespace, capitalize).
    /// Default: false
    pub normalize_text: bool,

    /// Absolute z-score above which a row is removed.
    /// Default: 3.0
    pub outlier_threshold: f64,

    /// Field separator for delimited input and output.
    /// Default: b','
    pub separator: u8,

    /// Cell contents treated as missing when loading.
    pub null_values: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            normalize_text: false,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            separator: b',',
            null_values: default_null_values(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(
                self.outlier_threshold,
            ));
        }

        if !self.separator.is_ascii() || matches!(self.separator, b'"' | b'\n' | b'\r') {
            return Err(ConfigValidationError::InvalidSeparator(
                self.separator as char,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier threshold: {0} (must be a finite number greater than 0)")]
    InvalidThreshold(f64),

    #[error("Invalid separator: {0:?} (must be an ASCII character other than a quote or newline)")]
    InvalidSeparator(char),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    normalize_text: Option<bool>,
    outlier_threshold: Option<f64>,
    separator: Option<u8>,
    null_values: Option<Vec<String>>,
}

impl CleaningConfigBuilder {
    /// Enable or disable text-cell normalization.
    pub fn normalize_text(mut self, enable: bool) -> Self {
        self.normalize_text = Some(enable);
        self
    }

    /// Set the z-score threshold for outlier removal.
    ///
    /// Rows whose numeric values score strictly above this threshold
    /// (in absolute value) are removed.
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = Some(threshold);
        self
    }

    /// Set the field separator used when reading and writing delimited text.
    pub fn separator(mut self, separator: u8) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Replace the list of cell contents treated as missing on load.
    pub fn null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            normalize_text: self.normalize_text.unwrap_or(false),
            outlier_threshold: self
                .outlier_threshold
                .unwrap_or(DEFAULT_OUTLIER_THRESHOLD),
            separator: self.separator.unwrap_or(b','),
            null_values: self.null_values.unwrap_or_else(default_null_values),
        };

        config.validate()?;
        Ok(config)
    }
}
