//! Duration resolution.
//!
//! One explicit level of fallback: a usable per-row value, otherwise the
//! configured default with the reason recorded.

use chrono::{NaiveDateTime, TimeDelta};

/// Process-wide default appointment length
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Longest accepted appointment, one week
pub const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

/// Why a row fell back to the default duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFallback {
    /// No duration column, or an empty cell
    Missing,
    /// The cell is not a number
    NotNumeric,
    /// The cell is a negative number
    Negative,
    /// The value is longer than `MAX_DURATION_MINUTES`, or the end instant
    /// would not be representable
    OutOfRange,
}

/// Outcome of resolving one row's duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationResolution {
    /// The row's own value, in whole minutes
    Explicit(i64),
    /// The configured default
    Default {
        /// Default length in minutes
        minutes: i64,
        /// Why the row's own value was not used
        reason: DurationFallback,
    },
}

impl DurationResolution {
    /// Resolved length in minutes
    #[must_use]
    pub const fn minutes(&self) -> i64 {
        match self {
            Self::Explicit(minutes) | Self::Default { minutes, .. } => *minutes,
        }
    }
}

/// Parse a duration cell as minutes; decimal commas are accepted
fn parse_minutes(raw: &str) -> Result<i64, DurationFallback> {
    let value: f64 = raw
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| DurationFallback::NotNumeric)?;

    if !value.is_finite() {
        return Err(DurationFallback::NotNumeric);
    }
    if value < 0.0 {
        return Err(DurationFallback::Negative);
    }
    let rounded = value.round();
    #[allow(clippy::cast_precision_loss)]
    let max = MAX_DURATION_MINUTES as f64;
    if rounded > max {
        return Err(DurationFallback::OutOfRange);
    }
    #[allow(clippy::cast_possible_truncation)]
    let minutes = rounded as i64;
    Ok(minutes)
}

/// `start + minutes`, or `None` when the result is not representable
#[must_use]
pub fn end_instant(start: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    TimeDelta::try_minutes(minutes).and_then(|delta| start.checked_add_signed(delta))
}

/// Resolve a row's duration, falling back to `default_minutes`
#[must_use]
pub fn resolve_duration(raw: Option<&str>, default_minutes: i64) -> DurationResolution {
    let parsed = match raw.map(str::trim) {
        None | Some("") => Err(DurationFallback::Missing),
        Some(text) => parse_minutes(text),
    };

    match parsed {
        Ok(minutes) => DurationResolution::Explicit(minutes),
        Err(reason) => DurationResolution::Default {
            minutes: default_minutes,
            reason,
        },
    }
}
