//! Interactive filtering sessions.
//!
//! A session remembers which columns the user selected and the parameters
//! chosen for each. It never stores the table: descriptors and predicates are
//! rebuilt from the table passed to each call.

use std::collections::BTreeMap;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::core::FilteredView;
use crate::filter::descriptor::ColumnDescriptor;
use crate::filter::predicate::{FilterParams, FilterPredicate};
use crate::filter::FilterEngine;

/// The user's current column selection and parameters
#[derive(Debug, Clone)]
pub struct FilterSession {
    engine: FilterEngine,
    selections: BTreeMap<String, FilterParams>,
}

impl FilterSession {
    /// Start a session with no selected columns
    #[must_use]
    pub const fn new(engine: FilterEngine) -> Self {
        Self {
            engine,
            selections: BTreeMap::new(),
        }
    }

    /// The engine used to describe columns and build predicates
    #[must_use]
    pub const fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    /// Describe a column so the UI can solicit parameters for it
    pub fn expose(&self, table: &RecordBatch, column: &str) -> Result<ColumnDescriptor> {
        self.engine.describe_column(table, column)
    }

    /// Select a column for filtering, replacing earlier parameters
    pub fn select(&mut self, column: impl Into<String>, params: FilterParams) {
        self.selections.insert(column.into(), params);
    }

    /// Stop filtering on a column
    pub fn deselect(&mut self, column: &str) -> Option<FilterParams> {
        self.selections.remove(column)
    }

    /// Drop every selection
    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Parameters currently chosen for a column
    #[must_use]
    pub fn params(&self, column: &str) -> Option<&FilterParams> {
        self.selections.get(column)
    }

    /// Selected column names, sorted
    pub fn selected_columns(&self) -> impl Iterator<Item = &str> {
        self.selections.keys().map(String::as_str)
    }

    /// Build one predicate per selected column against `table`
    pub fn predicates(&self, table: &RecordBatch) -> Result<Vec<FilterPredicate>> {
        self.selections
            .iter()
            .map(|(column, params)| {
                let descriptor = self.engine.describe_column(table, column)?;
                self.engine.build_predicate(&descriptor, params)
            })
            .collect()
    }

    /// Apply every selected column's predicate to `table`
    pub fn apply(&self, table: &RecordBatch) -> Result<FilteredView> {
        let predicates = self.predicates(table)?;
        self.engine.apply(table, &predicates)
    }
}
