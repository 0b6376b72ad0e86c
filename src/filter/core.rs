//! Core filtering functionality for schedule tables
//!
//! Defines the [`BatchFilter`] trait, conjunctive composition of filters and
//! the [`FilteredView`] produced by applying them. Filtering never mutates
//! the source batch; every call returns a new view.

use std::collections::HashSet;

use arrow::array::{ArrayRef, BooleanArray};
use arrow::compute::{and, filter as arrow_filter};
use arrow::record_batch::RecordBatch;

use crate::error::{Result, ScheduleError};
use crate::utils::arrow::batch_with_row_count;

/// Filter a record batch based on a boolean mask
///
/// # Errors
/// Returns an error if the mask length differs from the batch row count
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(ScheduleError::Arrow(arrow::error::ArrowError::InvalidArgumentError(
            format!(
                "Mask length ({}) doesn't match batch row count ({})",
                mask.len(),
                batch.num_rows()
            ),
        )));
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<std::result::Result<_, _>>()?;

    batch_with_row_count(batch.schema(), filtered_columns, mask.true_count())
}

/// Trait for objects that can select rows of a record batch
pub trait BatchFilter: std::fmt::Debug {
    /// Evaluate the filter to a mask with one entry per row; nulls never
    /// appear in the mask
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray>;

    /// Returns the set of column names required by this filter
    fn required_columns(&self) -> HashSet<String>;

    /// Filter a record batch
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.mask(batch)?;
        filter_record_batch(batch, &mask)
    }
}

/// A filter that combines multiple filters with a logical AND
#[derive(Debug, Clone)]
pub struct AndFilter<'a, F: BatchFilter> {
    filters: &'a [F],
}

impl<'a, F: BatchFilter> AndFilter<'a, F> {
    /// Create a new AND filter; an empty slice selects every row
    #[must_use]
    pub const fn new(filters: &'a [F]) -> Self {
        Self { filters }
    }
}

impl<F: BatchFilter> BatchFilter for AndFilter<'_, F> {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let mut combined = BooleanArray::from(vec![true; batch.num_rows()]);
        for filter in self.filters {
            let mask = filter.mask(batch)?;
            combined = and(&combined, &mask)?;
        }
        Ok(combined)
    }

    fn required_columns(&self) -> HashSet<String> {
        self.filters
            .iter()
            .flat_map(|filter| filter.required_columns())
            .collect()
    }
}

/// A subset of a table's rows, in source order
#[derive(Debug, Clone)]
pub struct FilteredView {
    batch: RecordBatch,
    source_rows: Vec<usize>,
}

impl FilteredView {
    /// A view selecting every row of `batch`
    #[must_use]
    pub fn full(batch: &RecordBatch) -> Self {
        Self {
            batch: batch.clone(),
            source_rows: (0..batch.num_rows()).collect(),
        }
    }

    /// Select the rows of `batch` where `mask` is true
    pub fn from_mask(batch: &RecordBatch, mask: &BooleanArray) -> Result<Self> {
        let filtered = filter_record_batch(batch, mask)?;
        let source_rows = mask
            .iter()
            .enumerate()
            .filter_map(|(row, keep)| (keep == Some(true)).then_some(row))
            .collect();
        Ok(Self {
            batch: filtered,
            source_rows,
        })
    }

    /// The selected rows as a record batch with the source schema
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Row indices in the source table, ascending
    #[must_use]
    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    /// Number of selected rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether no rows are selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Consume the view and return its batch
    #[must_use]
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }
}

/// Apply filters conjunctively, returning a new view of `batch`
pub fn apply_filters<F: BatchFilter>(batch: &RecordBatch, filters: &[F]) -> Result<FilteredView> {
    if filters.is_empty() {
        return Ok(FilteredView::full(batch));
    }
    let mask = AndFilter::new(filters).mask(batch)?;
    let view = FilteredView::from_mask(batch, &mask)?;
    log::debug!(
        "Applied {} filters: {} of {} rows selected",
        filters.len(),
        view.num_rows(),
        batch.num_rows()
    );
    Ok(view)
}
