//! End-to-end preparation of an uploaded schedule.
//!
//! raw table → normalize → reconstruct start/end → classify → titles. The
//! prepared table is then filtered repeatedly through a [`FilterSession`].

use std::path::Path;

use arrow::record_batch::RecordBatch;

use crate::appointment::add_titles;
use crate::classify::{CategorySynonyms, classify_batch};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::filter::{FilterEngine, FilterSession, FilteredView};
use crate::loader::{read_delimited_bytes, read_table};
use crate::schema::{ColumnSynonyms, normalize};
use crate::temporal::reconstruct;

/// A normalized, time-reconstructed and classified schedule
#[derive(Debug, Clone)]
pub struct PreparedSchedule {
    /// The table every filter runs against
    pub table: RecordBatch,
    /// Rows whose start could not be parsed (kept, but produce no event)
    pub unparsed_rows: Vec<usize>,
    /// Rows that used the default duration
    pub defaulted_durations: usize,
}

impl PreparedSchedule {
    /// A view selecting every row
    #[must_use]
    pub fn full_view(&self) -> FilteredView {
        FilteredView::full(&self.table)
    }
}

/// Runs the preparation stages with one configuration
#[derive(Debug, Clone)]
pub struct SchedulePipeline {
    config: PipelineConfig,
    column_synonyms: ColumnSynonyms,
    category_synonyms: CategorySynonyms,
}

impl SchedulePipeline {
    /// Create a pipeline after validating `config`
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            column_synonyms: config.column_synonyms(),
            category_synonyms: config.category_synonyms(),
            config,
        })
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// A filter engine sharing this pipeline's date formats
    #[must_use]
    pub fn filter_engine(&self) -> FilterEngine {
        FilterEngine::from_pipeline(&self.config)
    }

    /// A fresh filter session with nothing selected
    #[must_use]
    pub fn session(&self) -> FilterSession {
        FilterSession::new(self.filter_engine())
    }

    /// Prepare a raw table
    ///
    /// # Errors
    /// `MissingColumns` before any other stage runs; `TimestampParse` under the
    /// fail-fast policy.
    pub fn run(&self, raw: &RecordBatch) -> Result<PreparedSchedule> {
        let normalized = normalize(raw, &self.column_synonyms)?;
        let reconstruction = reconstruct(&normalized, &self.config)?;
        let classified = classify_batch(&reconstruction.batch, &self.category_synonyms)?;
        let table = add_titles(&classified)?;
        log::info!("Prepared schedule with {} rows", table.num_rows());

        Ok(PreparedSchedule {
            table,
            unparsed_rows: reconstruction.unparsed_rows,
            defaulted_durations: reconstruction.defaulted_durations,
        })
    }

    /// Read and prepare an upload file
    pub fn load(&self, path: &Path) -> Result<PreparedSchedule> {
        self.run(&read_table(path)?)
    }

    /// Prepare delimited text handed over as bytes
    pub fn load_delimited_bytes(&self, bytes: &[u8]) -> Result<PreparedSchedule> {
        self.run(&read_delimited_bytes(bytes)?)
    }
}
