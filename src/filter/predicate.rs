//! Filter predicates.
//!
//! A [`FilterPredicate`] is built from a [`ColumnDescriptor`] and the
//! parameters the user chose for that column. Its shape follows the
//! descriptor's kind: set membership, numeric interval, temporal interval or
//! text match.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use arrow::array::BooleanArray;
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::filter::core::BatchFilter;
use crate::filter::descriptor::{ColumnDescriptor, ColumnKind, ValueRange};
use crate::filter::error::{inverted_interval, params_mismatch, unknown_values};
use crate::filter::values::{display_values, numeric_values, temporal_values};
use crate::temporal::{DateFormatConfig, parse_date, parse_datetime};
use crate::utils::arrow::get_column_by_name;

/// One end of a temporal interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalBound {
    /// A whole day
    Date(NaiveDate),
    /// An exact instant
    DateTime(NaiveDateTime),
}

impl TemporalBound {
    /// Instant used when this bound opens an interval
    #[must_use]
    pub fn lower(&self) -> NaiveDateTime {
        match self {
            Self::Date(date) => date.and_time(NaiveTime::MIN),
            Self::DateTime(instant) => *instant,
        }
    }

    /// Instant used when this bound closes an interval; a date covers its
    /// whole day
    #[must_use]
    pub fn upper(&self) -> NaiveDateTime {
        match self {
            Self::Date(date) => date
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap_or_else(|| date.and_time(NaiveTime::MIN)),
            Self::DateTime(instant) => *instant,
        }
    }

    /// Parse user input; date-only text becomes a whole-day bound
    #[must_use]
    pub fn parse(text: &str, formats: &DateFormatConfig) -> Option<Self> {
        parse_date(text, formats)
            .map(Self::Date)
            .or_else(|| parse_datetime(text, formats).map(Self::DateTime))
    }
}

/// User-chosen parameters for one column, passed back verbatim by the UI
#[derive(Debug, Clone, PartialEq)]
pub enum FilterParams {
    /// Selected categorical values
    Values(BTreeSet<String>),
    /// Inclusive numeric interval
    NumericRange {
        /// Lower bound
        lo: f64,
        /// Upper bound
        hi: f64,
    },
    /// Inclusive temporal interval
    TemporalRange {
        /// Lower bound
        from: TemporalBound,
        /// Upper bound
        to: TemporalBound,
    },
    /// Substring or regular expression; empty means no filter
    Pattern(String),
}

impl FilterParams {
    /// Parameters that select every row of the described column
    #[must_use]
    pub fn default_for(descriptor: &ColumnDescriptor) -> Self {
        match (descriptor.kind, descriptor.range) {
            (ColumnKind::Categorical, _) => {
                Self::Values(descriptor.distinct_values.iter().cloned().collect())
            }
            (ColumnKind::Numeric, Some(ValueRange::Numeric { min, max })) => {
                Self::NumericRange { lo: min, hi: max }
            }
            (ColumnKind::Temporal, Some(ValueRange::Temporal { min, max })) => {
                Self::TemporalRange {
                    from: TemporalBound::DateTime(min),
                    to: TemporalBound::DateTime(max),
                }
            }
            (ColumnKind::Numeric, _) => Self::NumericRange {
                lo: f64::NEG_INFINITY,
                hi: f64::INFINITY,
            },
            (ColumnKind::Temporal, _) => Self::TemporalRange {
                from: TemporalBound::DateTime(NaiveDateTime::MIN),
                to: TemporalBound::DateTime(NaiveDateTime::MAX),
            },
            (ColumnKind::Text, _) => Self::Pattern(String::new()),
        }
    }

    const fn shape(&self) -> &'static str {
        match self {
            Self::Values(_) => "value-set",
            Self::NumericRange { .. } => "numeric range",
            Self::TemporalRange { .. } => "date range",
            Self::Pattern(_) => "text pattern",
        }
    }
}

/// How a text predicate matches a cell
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Empty input; every row matches
    Everything,
    /// Lower-case substring, also tried as a case-insensitive regular
    /// expression when the input compiles as one
    Pattern {
        /// Lower-cased input
        needle: String,
        /// The input compiled as a regex, if it is a valid pattern
        regex: Option<Regex>,
    },
}

impl TextMatcher {
    /// Build a matcher from raw user input
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        if pattern.trim().is_empty() {
            return Self::Everything;
        }
        Self::Pattern {
            needle: pattern.to_lowercase(),
            regex: RegexBuilder::new(pattern).case_insensitive(true).build().ok(),
        }
    }

    /// Test one cell's display text
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Everything => true,
            Self::Pattern { needle, regex } => {
                text.to_lowercase().contains(needle.as_str())
                    || regex.as_ref().is_some_and(|regex| regex.is_match(text))
            }
        }
    }
}

/// A per-column constraint
#[derive(Debug, Clone)]
pub enum FilterPredicate {
    /// Display value is one of the selected values
    Membership {
        /// Column filtered
        column: String,
        /// Selected display values
        values: FxHashSet<String>,
    },
    /// Numeric value lies in `[lo, hi]`
    NumericRange {
        /// Column filtered
        column: String,
        /// Inclusive lower bound
        lo: f64,
        /// Inclusive upper bound
        hi: f64,
    },
    /// Instant lies in `[from, to]`
    TemporalRange {
        /// Column filtered
        column: String,
        /// Inclusive lower bound
        from: NaiveDateTime,
        /// Inclusive upper bound
        to: NaiveDateTime,
        /// Formats used to parse text cells
        formats: Arc<DateFormatConfig>,
    },
    /// Display text matches
    TextMatch {
        /// Column filtered
        column: String,
        /// Matcher built from the user's input
        matcher: TextMatcher,
    },
}

impl FilterPredicate {
    /// Column this predicate constrains
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Membership { column, .. }
            | Self::NumericRange { column, .. }
            | Self::TemporalRange { column, .. }
            | Self::TextMatch { column, .. } => column,
        }
    }
}

impl BatchFilter for FilterPredicate {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let array = get_column_by_name(batch, self.column())?;
        let keep: Vec<bool> = match self {
            Self::Membership { values, .. } => display_values(&array)
                .iter()
                .map(|value| values.contains(value))
                .collect(),
            Self::NumericRange { lo, hi, .. } => numeric_values(&array)?
                .into_iter()
                .map(|value| value.is_some_and(|v| *lo <= v && v <= *hi))
                .collect(),
            Self::TemporalRange {
                from, to, formats, ..
            } => temporal_values(&array, formats)?
                .into_iter()
                .map(|value| value.is_some_and(|v| *from <= v && v <= *to))
                .collect(),
            Self::TextMatch { matcher, .. } => display_values(&array)
                .iter()
                .map(|value| matcher.is_match(value))
                .collect(),
        };
        Ok(BooleanArray::from(keep))
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column().to_string()])
    }
}

/// Build the predicate for `descriptor` from user parameters
///
/// # Errors
/// Returns `InvalidFilter` when the parameters do not fit the column's kind,
/// name values the column never contained, or describe an inverted interval.
pub fn build_predicate(
    descriptor: &ColumnDescriptor,
    params: &FilterParams,
    formats: &Arc<DateFormatConfig>,
) -> Result<FilterPredicate> {
    let column = descriptor.name.clone();
    match (descriptor.kind, params) {
        (ColumnKind::Categorical, FilterParams::Values(selected)) => {
            let unknown: Vec<&str> = selected
                .iter()
                .filter(|value| descriptor.distinct_values.binary_search(value).is_err())
                .map(String::as_str)
                .collect();
            if !unknown.is_empty() {
                return unknown_values(&column, &unknown);
            }
            Ok(FilterPredicate::Membership {
                column,
                values: selected.iter().cloned().collect(),
            })
        }
        (ColumnKind::Numeric, FilterParams::NumericRange { lo, hi }) => {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return inverted_interval(&column, lo, hi);
            }
            Ok(FilterPredicate::NumericRange {
                column,
                lo: *lo,
                hi: *hi,
            })
        }
        (ColumnKind::Temporal, FilterParams::TemporalRange { from, to }) => {
            let (from, to) = (from.lower(), to.upper());
            if from > to {
                return inverted_interval(&column, from, to);
            }
            Ok(FilterPredicate::TemporalRange {
                column,
                from,
                to,
                formats: Arc::clone(formats),
            })
        }
        (ColumnKind::Text, FilterParams::Pattern(pattern)) => Ok(FilterPredicate::TextMatch {
            column,
            matcher: TextMatcher::new(pattern),
        }),
        (kind, params) => params_mismatch(&column, kind, params.shape()),
    }
}
