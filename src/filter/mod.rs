//! Column-type-driven filtering for schedule tables
//!
//! The engine inspects a column's inferred kind and builds the matching
//! predicate shape without per-column hardcoding. Predicates combine by
//! logical AND and always produce a new [`FilteredView`]; the source table is
//! never modified.

pub mod core;
pub mod descriptor;
pub mod error;
pub mod predicate;
pub mod session;
pub mod values;

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use serde::Deserialize;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::temporal::DateFormatConfig;

pub use self::core::{AndFilter, BatchFilter, FilteredView, apply_filters, filter_record_batch};
pub use descriptor::{
    ColumnDescriptor, ColumnKind, ValueRange, describe_column, describe_columns,
    infer_column_kind,
};
pub use predicate::{FilterParams, FilterPredicate, TemporalBound, TextMatcher, build_predicate};
pub use session::FilterSession;

/// Default distinct-value count below which a column is categorical
pub const DEFAULT_CATEGORICAL_THRESHOLD: usize = 100;

/// Column type inference settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Columns with fewer distinct values than this are categorical
    pub categorical_threshold: usize,
    /// Columns always treated as categorical
    pub categorical_columns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
            categorical_columns: Vec::new(),
        }
    }
}

/// Stateless entry point for describing, building and applying filters
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    config: FilterConfig,
    formats: Arc<DateFormatConfig>,
}

impl FilterEngine {
    /// Create an engine with explicit settings
    #[must_use]
    pub fn new(config: FilterConfig, formats: DateFormatConfig) -> Self {
        Self {
            config,
            formats: Arc::new(formats),
        }
    }

    /// Create an engine from the pipeline configuration
    #[must_use]
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        Self::new(config.filter.clone(), config.date_formats.clone())
    }

    /// Inference settings in use
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Describe every column of `table`
    pub fn describe_columns(&self, table: &RecordBatch) -> Result<Vec<ColumnDescriptor>> {
        describe_columns(table, &self.config, &self.formats)
    }

    /// Describe one column of `table`
    pub fn describe_column(&self, table: &RecordBatch, column: &str) -> Result<ColumnDescriptor> {
        describe_column(table, column, &self.config, &self.formats)
    }

    /// Build the predicate for a described column
    pub fn build_predicate(
        &self,
        descriptor: &ColumnDescriptor,
        params: &FilterParams,
    ) -> Result<FilterPredicate> {
        build_predicate(descriptor, params, &self.formats)
    }

    /// Apply predicates conjunctively; no predicates selects every row
    pub fn apply(&self, table: &RecordBatch, predicates: &[FilterPredicate]) -> Result<FilteredView> {
        apply_filters(table, predicates)
    }
}
