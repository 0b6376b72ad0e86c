//! Error handling utilities for the filter module

use crate::error::{Result, ScheduleError};
use crate::filter::ColumnKind;

/// Create an invalid filter error for parameters that do not fit a column kind
pub fn params_mismatch<T>(column: &str, kind: ColumnKind, params: &str) -> Result<T> {
    Err(ScheduleError::invalid_filter(
        column,
        format!("{params} parameters cannot filter a {kind} column"),
    ))
}

/// Create an invalid filter error for an interval whose lower bound exceeds
/// its upper bound
pub fn inverted_interval<T>(column: &str, lo: impl std::fmt::Display, hi: impl std::fmt::Display) -> Result<T> {
    Err(ScheduleError::invalid_filter(
        column,
        format!("lower bound {lo} is greater than upper bound {hi}"),
    ))
}

/// Create an invalid filter error for values never observed in the column
pub fn unknown_values<T>(column: &str, values: &[&str]) -> Result<T> {
    Err(ScheduleError::invalid_filter(
        column,
        format!("values not present in column: {}", values.join(", ")),
    ))
}
