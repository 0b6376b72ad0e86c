//! Column value extraction for type probing and predicate evaluation.
//!
//! Every helper yields one entry per row. Native Arrow types are read
//! directly; text columns are parsed.

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::temporal::{DateFormatConfig, parse_datetime};
use crate::utils::arrow::{cell_text, cell_timestamp, downcast_array, timestamp_type};

/// Whether the Arrow type is a native numeric type
#[must_use]
pub const fn is_numeric_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
    )
}

/// Whether the Arrow type is a native date or timestamp type
#[must_use]
pub const fn is_temporal_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _)
    )
}

/// Parse a numeric cell; a lone decimal comma is accepted
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let value = if text.contains(',') && !text.contains('.') {
        text.replace(',', ".").parse::<f64>().ok()?
    } else {
        text.parse::<f64>().ok()?
    };
    value.is_finite().then_some(value)
}

/// Display text of every row; null cells display as the empty string
#[must_use]
pub fn display_values(array: &ArrayRef) -> Vec<String> {
    (0..array.len())
        .map(|row| cell_text(array, row).unwrap_or_default())
        .collect()
}

/// Text cells that count as present for type probing
fn present_text(array: &ArrayRef) -> Result<Vec<Option<&str>>> {
    let strings = downcast_array::<StringArray>(array, "", "Utf8")?;
    Ok(strings
        .iter()
        .map(|cell| cell.filter(|text| !text.trim().is_empty()))
        .collect())
}

/// Numeric value of every row; `None` for nulls and unparseable text
pub fn numeric_values(array: &ArrayRef) -> Result<Vec<Option<f64>>> {
    if is_numeric_type(array.data_type()) {
        let floats = cast(array, &DataType::Float64)?;
        let floats = downcast_array::<Float64Array>(&floats, "", "Float64")?;
        return Ok(floats.iter().collect());
    }
    if array.data_type() == &DataType::Utf8 {
        return Ok(present_text(array)?
            .into_iter()
            .map(|cell| cell.and_then(parse_number))
            .collect());
    }
    Ok(vec![None; array.len()])
}

/// Instant of every row, timezone dropped; `None` for nulls and unparseable text
pub fn temporal_values(
    array: &ArrayRef,
    formats: &DateFormatConfig,
) -> Result<Vec<Option<NaiveDateTime>>> {
    if is_temporal_type(array.data_type()) {
        let stamps = cast(array, &timestamp_type())?;
        return Ok((0..stamps.len())
            .map(|row| cell_timestamp(&stamps, row))
            .collect());
    }
    if array.data_type() == &DataType::Utf8 {
        return Ok(present_text(array)?
            .into_iter()
            .map(|cell| cell.and_then(|text| parse_datetime(text, formats)))
            .collect());
    }
    Ok(vec![None; array.len()])
}

/// Whether every present cell of a text column parses as a number
pub fn all_numeric(array: &ArrayRef) -> Result<bool> {
    if is_numeric_type(array.data_type()) {
        return Ok(array.null_count() < array.len());
    }
    if array.data_type() != &DataType::Utf8 {
        return Ok(false);
    }
    let cells = present_text(array)?;
    let mut seen = false;
    for cell in cells.into_iter().flatten() {
        if parse_number(cell).is_none() {
            return Ok(false);
        }
        seen = true;
    }
    Ok(seen)
}

/// Whether every present cell of a text column parses as a date or timestamp
pub fn all_temporal(array: &ArrayRef, formats: &DateFormatConfig) -> Result<bool> {
    if is_temporal_type(array.data_type()) {
        return Ok(array.null_count() < array.len());
    }
    if array.data_type() != &DataType::Utf8 {
        return Ok(false);
    }
    let cells = present_text(array)?;
    let mut seen = false;
    for cell in cells.into_iter().flatten() {
        if parse_datetime(cell, formats).is_none() {
            return Ok(false);
        }
        seen = true;
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" 3,5 "), Some(3.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("1,000.5"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_probes_ignore_blank_cells() {
        let numbers: ArrayRef = Arc::new(StringArray::from(vec![Some("1"), None, Some(" "), Some("2.5")]));
        assert!(all_numeric(&numbers).unwrap());
        assert_eq!(
            numeric_values(&numbers).unwrap(),
            vec![Some(1.0), None, None, Some(2.5)]
        );

        let mixed: ArrayRef = Arc::new(StringArray::from(vec!["1", "x"]));
        assert!(!all_numeric(&mixed).unwrap());

        let empty: ArrayRef = Arc::new(StringArray::from(vec![None::<&str>, None]));
        assert!(!all_numeric(&empty).unwrap());
        assert!(!all_temporal(&empty, &DateFormatConfig::default()).unwrap());
    }

    #[test]
    fn test_native_numeric_column() {
        let ints: ArrayRef = Arc::new(arrow::array::Int64Array::from(vec![Some(5), None]));
        assert!(all_numeric(&ints).unwrap());
        assert_eq!(numeric_values(&ints).unwrap(), vec![Some(5.0), None]);
    }
}
