//! Value conversions between Arrow cells and chrono / plain Rust values.

use arrow::array::{Array, ArrayRef, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDateTime};

/// ISO-8601 rendering used for events and persisted documents
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Arrow data type of the derived `start` / `end` columns
#[must_use]
pub const fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Millisecond, None)
}

/// Convert a naive instant to milliseconds since the epoch
#[must_use]
pub fn naive_to_millis(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}

/// Convert milliseconds since the epoch back to a naive instant
#[must_use]
pub fn millis_to_naive(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

/// Render a naive instant as `YYYY-MM-DDTHH:MM:SS`
#[must_use]
pub fn format_iso(value: NaiveDateTime) -> String {
    value.format(ISO_FORMAT).to_string()
}

/// Extract a cell as text, handling nulls
///
/// Strings are returned verbatim, millisecond timestamps in ISO form, and
/// anything else through Arrow's display formatting.
#[must_use]
pub fn cell_text(array: &ArrayRef, index: usize) -> Option<String> {
    if index >= array.len() || array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Utf8 => {
            let strings = array.as_any().downcast_ref::<StringArray>()?;
            Some(strings.value(index).to_string())
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let stamps = array.as_any().downcast_ref::<TimestampMillisecondArray>()?;
            millis_to_naive(stamps.value(index)).map(format_iso)
        }
        _ => array_value_to_string(array, index).ok(),
    }
}

/// Extract a millisecond timestamp cell as a naive instant
#[must_use]
pub fn cell_timestamp(array: &ArrayRef, index: usize) -> Option<NaiveDateTime> {
    let stamps = array.as_any().downcast_ref::<TimestampMillisecondArray>()?;
    if index >= stamps.len() || stamps.is_null(index) {
        return None;
    }
    millis_to_naive(stamps.value(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[test]
    fn test_millis_round_trip_and_iso() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(millis_to_naive(naive_to_millis(dt)), Some(dt));
        assert_eq!(format_iso(dt), "2024-01-10T09:00:00");
    }

    #[test]
    fn test_cell_text_for_mixed_types() {
        let strings: ArrayRef = Arc::new(StringArray::from(vec![Some("a"), None]));
        assert_eq!(cell_text(&strings, 0).as_deref(), Some("a"));
        assert_eq!(cell_text(&strings, 1), None);
        assert_eq!(cell_text(&strings, 7), None);

        let ints: ArrayRef = Arc::new(arrow::array::Int64Array::from(vec![45]));
        assert_eq!(cell_text(&ints, 0).as_deref(), Some("45"));
    }
}
