//! Error handling for the schedule pipeline.
//!
//! Structural problems (missing columns, unparseable timestamps under the
//! fail-fast policy) surface as a [`ScheduleError`]. Value-level anomalies such
//! as a bad duration or an unknown outcome text are absorbed where they occur
//! and never show up here.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;

/// Specialized error type for schedule loading, normalization and filtering
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Required canonical attributes are absent after normalization
    #[error("Missing required columns: {}", missing.join(", "))]
    MissingColumns {
        /// Canonical names that could not be found, sorted
        missing: Vec<String>,
    },

    /// A row's date and time could not be combined into an instant
    #[error("Could not parse timestamp '{value}' in row {row}")]
    TimestampParse {
        /// Zero-based row index in the uploaded table
        row: usize,
        /// The joined date + time text that failed to parse
        value: String,
    },

    /// The upload's extension does not map to a known reader
    #[error("Unsupported upload format: {0}")]
    UnsupportedFormat(String),

    /// Filter parameters do not fit the column they were built for
    #[error("Invalid filter for column '{column}': {reason}")]
    InvalidFilter {
        /// Column the predicate was requested for
        column: String,
        /// What was wrong with the parameters
        reason: String,
    },

    /// A column the caller referred to is not in the table
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// Error opening or reading a file
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Error parsing delimited text
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading a spreadsheet workbook
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Error building or slicing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error encoding or decoding JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScheduleError {
    /// Create an IO error tied to the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error halts the pipeline before any output is produced
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MissingColumns { .. } | Self::TimestampParse { .. }
        )
    }
}

/// Result type for schedule operations
pub type Result<T> = std::result::Result<T, ScheduleError>;
