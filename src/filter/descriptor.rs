//! Column type inference.
//!
//! Each column is classified once into a [`ColumnKind`], evaluated in this
//! order: categorical (few distinct values, or tagged upstream), numeric,
//! temporal, and finally free text. The kind decides which predicate shape
//! the filter engine offers for the column.

use std::fmt;

use arrow::array::ArrayRef;
use arrow::datatypes::Field;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::Result;
use crate::filter::FilterConfig;
use crate::filter::values::{
    all_numeric, all_temporal, display_values, numeric_values, temporal_values,
};
use crate::schema::is_tagged_categorical;
use crate::temporal::DateFormatConfig;
use crate::utils::arrow::get_column_index;

/// Semantic kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Few distinct values; filtered by set membership
    Categorical,
    /// Every present value is a number; filtered by closed interval
    Numeric,
    /// Every present value is a date or timestamp; filtered by closed interval
    Temporal,
    /// Anything else; filtered by substring or regular expression
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Categorical => "categorical",
            Self::Numeric => "numeric",
            Self::Temporal => "temporal",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// Observed bounds of a numeric or temporal column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueRange {
    /// Smallest and largest number
    Numeric {
        /// Observed minimum
        min: f64,
        /// Observed maximum
        max: f64,
    },
    /// Earliest and latest instant
    Temporal {
        /// Observed minimum
        min: NaiveDateTime,
        /// Observed maximum
        max: NaiveDateTime,
    },
}

/// Inferred metadata about one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// Column name in the normalized table
    pub name: String,
    /// Inferred kind
    pub kind: ColumnKind,
    /// Sorted distinct display values (categorical columns only)
    pub distinct_values: Vec<String>,
    /// Observed bounds (numeric and temporal columns with data only)
    pub range: Option<ValueRange>,
}

/// Classify a column into a [`ColumnKind`]
pub fn infer_column_kind(
    field: &Field,
    array: &ArrayRef,
    config: &FilterConfig,
    formats: &DateFormatConfig,
) -> Result<ColumnKind> {
    if is_tagged_categorical(field) || config.categorical_columns.iter().any(|c| c == field.name()) {
        return Ok(ColumnKind::Categorical);
    }

    let distinct: FxHashSet<String> = display_values(array).into_iter().collect();
    if distinct.len() < config.categorical_threshold {
        return Ok(ColumnKind::Categorical);
    }
    if all_numeric(array)? {
        return Ok(ColumnKind::Numeric);
    }
    if all_temporal(array, formats)? {
        return Ok(ColumnKind::Temporal);
    }
    Ok(ColumnKind::Text)
}

fn numeric_range(array: &ArrayRef) -> Result<Option<ValueRange>> {
    let bounds = numeric_values(array)?
        .into_iter()
        .flatten()
        .minmax_by(f64::total_cmp)
        .into_option();
    Ok(bounds.map(|(min, max)| ValueRange::Numeric { min, max }))
}

fn temporal_range(array: &ArrayRef, formats: &DateFormatConfig) -> Result<Option<ValueRange>> {
    let bounds = temporal_values(array, formats)?
        .into_iter()
        .flatten()
        .minmax()
        .into_option();
    Ok(bounds.map(|(min, max)| ValueRange::Temporal { min, max }))
}

/// Describe a single column of `batch`
pub fn describe_column(
    batch: &RecordBatch,
    column: &str,
    config: &FilterConfig,
    formats: &DateFormatConfig,
) -> Result<ColumnDescriptor> {
    let idx = get_column_index(batch, column)?;
    let schema = batch.schema();
    let field = schema.field(idx);
    let array = batch.column(idx);

    let kind = infer_column_kind(field, array, config, formats)?;
    let (distinct_values, range) = match kind {
        ColumnKind::Categorical => (
            display_values(array).into_iter().unique().sorted().collect(),
            None,
        ),
        ColumnKind::Numeric => (Vec::new(), numeric_range(array)?),
        ColumnKind::Temporal => (Vec::new(), temporal_range(array, formats)?),
        ColumnKind::Text => (Vec::new(), None),
    };

    log::debug!("Column '{column}' inferred as {kind}");
    Ok(ColumnDescriptor {
        name: column.to_string(),
        kind,
        distinct_values,
        range,
    })
}

/// Describe every column of `batch`, in schema order
pub fn describe_columns(
    batch: &RecordBatch,
    config: &FilterConfig,
    formats: &DateFormatConfig,
) -> Result<Vec<ColumnDescriptor>> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|field| describe_column(batch, field.name(), config, formats))
        .collect()
}
