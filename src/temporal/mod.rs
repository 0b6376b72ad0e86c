//! Temporal reconstruction.
//!
//! Combines the `date` and `start_time` columns into an absolute `start`
//! instant, resolves each row's duration and derives `end = start + duration`.
//! Rows whose timestamp cannot be parsed are handled according to the
//! configured [`TimestampPolicy`].

pub mod duration;
pub mod formats;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::config::PipelineConfig;
use crate::error::{Result, ScheduleError};
use crate::schema::{DATE, DURATION_MINUTES, END, START, START_TIME};
use crate::utils::arrow::{
    cell_text, get_column_by_name, naive_to_millis, optional_column, timestamp_type,
    upsert_column,
};

pub use duration::{
    DEFAULT_DURATION_MINUTES, DurationFallback, DurationResolution, MAX_DURATION_MINUTES,
    end_instant, resolve_duration,
};
pub use formats::{DateFormatConfig, join_date_time, parse_date, parse_datetime};

/// Policy for rows whose date + time text cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Reject the whole upload on the first unparseable row
    #[default]
    FailFast,
    /// Null the row's `start` / `end` and keep going
    NullRow,
}

impl FromStr for TimestampPolicy {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "null_row" => Ok(Self::NullRow),
            other => Err(ScheduleError::Config(format!(
                "unknown timestamp policy '{other}', expected fail-fast or null-row"
            ))),
        }
    }
}

impl fmt::Display for TimestampPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::NullRow => write!(f, "null-row"),
        }
    }
}

/// Outcome of resolving one row's start instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartResolution {
    /// Date and time combined into an instant
    Parsed(NaiveDateTime),
    /// The joined text that could not be parsed
    Unparseable(String),
}

/// Resolve a row's start instant from its date and time-of-day cells
#[must_use]
pub fn resolve_start(
    date: Option<&str>,
    time: Option<&str>,
    formats: &DateFormatConfig,
) -> StartResolution {
    let joined = join_date_time(date.unwrap_or_default(), time.unwrap_or_default());
    match (date, time) {
        (Some(_), Some(_)) => parse_datetime(&joined, formats)
            .map_or(StartResolution::Unparseable(joined), StartResolution::Parsed),
        _ => StartResolution::Unparseable(joined),
    }
}

/// A table with `start`, `end` and resolved `duration_minutes` columns
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Input columns plus the derived temporal columns
    pub batch: RecordBatch,
    /// Rows whose `start` is null (only under `TimestampPolicy::NullRow`)
    pub unparsed_rows: Vec<usize>,
    /// Rows that fell back to the default duration
    pub defaulted_durations: usize,
}

/// Derive `start`, `end` and `duration_minutes` for every row
///
/// # Errors
/// Under `TimestampPolicy::FailFast`, returns `TimestampParse` for the first
/// row whose date + time cannot be parsed.
pub fn reconstruct(batch: &RecordBatch, config: &PipelineConfig) -> Result<Reconstruction> {
    let dates = get_column_by_name(batch, DATE)?;
    let times = get_column_by_name(batch, START_TIME)?;
    let durations = optional_column(batch, DURATION_MINUTES);
    if durations.is_none() {
        log::info!(
            "No {DURATION_MINUTES} column, using {} minutes for every row",
            config.default_duration_minutes
        );
    }

    let num_rows = batch.num_rows();
    let mut starts: Vec<Option<i64>> = Vec::with_capacity(num_rows);
    let mut ends: Vec<Option<i64>> = Vec::with_capacity(num_rows);
    let mut minutes: Vec<i64> = Vec::with_capacity(num_rows);
    let mut unparsed_rows = Vec::new();
    let mut defaulted_durations = 0;

    for row in 0..num_rows {
        let raw_duration = durations.as_ref().and_then(|col| cell_text(col, row));
        let mut resolution =
            resolve_duration(raw_duration.as_deref(), config.default_duration_minutes);

        let date = cell_text(&dates, row);
        let time = cell_text(&times, row);
        match resolve_start(date.as_deref(), time.as_deref(), &config.date_formats) {
            StartResolution::Parsed(start) => {
                let end = match end_instant(start, resolution.minutes()) {
                    Some(end) => end,
                    None => {
                        resolution = DurationResolution::Default {
                            minutes: config.default_duration_minutes,
                            reason: DurationFallback::OutOfRange,
                        };
                        end_instant(start, config.default_duration_minutes).unwrap_or(start)
                    }
                };
                starts.push(Some(naive_to_millis(start)));
                ends.push(Some(naive_to_millis(end)));
            }
            StartResolution::Unparseable(value) => match config.timestamp_policy {
                TimestampPolicy::FailFast => {
                    return Err(ScheduleError::TimestampParse { row, value });
                }
                TimestampPolicy::NullRow => {
                    log::warn!("Row {row}: could not parse timestamp '{value}', start left empty");
                    unparsed_rows.push(row);
                    starts.push(None);
                    ends.push(None);
                }
            },
        }

        if let DurationResolution::Default { reason, .. } = resolution {
            defaulted_durations += 1;
            if reason != DurationFallback::Missing {
                log::debug!("Row {row}: invalid duration {raw_duration:?} ({reason:?}), using default");
            }
        }
        minutes.push(resolution.minutes());
    }

    let start_array: ArrayRef = Arc::new(TimestampMillisecondArray::from(starts));
    let end_array: ArrayRef = Arc::new(TimestampMillisecondArray::from(ends));
    let minutes_array: ArrayRef = Arc::new(Int64Array::from(minutes));

    let batch = upsert_column(
        batch,
        Field::new(DURATION_MINUTES, DataType::Int64, false),
        minutes_array,
    )?;
    let batch = upsert_column(&batch, Field::new(START, timestamp_type(), true), start_array)?;
    let batch = upsert_column(&batch, Field::new(END, timestamp_type(), true), end_array)?;

    log::info!(
        "Reconstructed start/end for {} rows ({} unparsed, {} default durations)",
        num_rows,
        unparsed_rows.len(),
        defaulted_durations
    );

    Ok(Reconstruction {
        batch,
        unparsed_rows,
        defaulted_durations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fail-fast".parse::<TimestampPolicy>().unwrap(), TimestampPolicy::FailFast);
        assert_eq!("NULL_ROW".parse::<TimestampPolicy>().unwrap(), TimestampPolicy::NullRow);
        assert!("skip".parse::<TimestampPolicy>().is_err());
    }

    #[test]
    fn test_resolve_start_requires_both_cells() {
        let formats = DateFormatConfig::default();
        assert!(matches!(
            resolve_start(Some("10/01/2024"), None, &formats),
            StartResolution::Unparseable(_)
        ));
        assert!(matches!(
            resolve_start(Some("10/01/2024"), Some("09:00"), &formats),
            StartResolution::Parsed(_)
        ));
    }
}
