//! Utilities for working with Arrow arrays.
//!
//! Column lookup, downcasting and column replacement on record batches. All
//! helpers return new batches; the input batch is never modified.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::{Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::{Result, ScheduleError};

/// Get the column index by name from a record batch
///
/// # Errors
/// Returns `ColumnNotFound` if the column does not exist
pub fn get_column_index(batch: &RecordBatch, column_name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(column_name)
        .map_err(|_| ScheduleError::ColumnNotFound(column_name.to_string()))
}

/// Get a column from a record batch by name
pub fn get_column_by_name(batch: &RecordBatch, column_name: &str) -> Result<ArrayRef> {
    let idx = get_column_index(batch, column_name)?;
    Ok(batch.column(idx).clone())
}

/// Get a column that may legitimately be absent
#[must_use]
pub fn optional_column(batch: &RecordBatch, column_name: &str) -> Option<ArrayRef> {
    batch.column_by_name(column_name).cloned()
}

/// Downcast a column to a specific array type with clear error messages
///
/// # Type Parameters
///
/// * `A` - The target array type to downcast to
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        ScheduleError::Arrow(ArrowError::CastError(format!(
            "Column '{column_name}' is not a {expected_type_name} array (found {})",
            array.data_type()
        )))
    })
}

/// Build a record batch with an explicit row count, so zero-column batches work
pub fn batch_with_row_count(
    schema: Arc<Schema>,
    columns: Vec<ArrayRef>,
    num_rows: usize,
) -> Result<RecordBatch> {
    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}

/// Return a new batch where `field` replaces the column of the same name, or
/// is appended when no such column exists
pub fn upsert_column(batch: &RecordBatch, field: Field, array: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Arc<Field>> = schema.fields().iter().cloned().collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    if let Ok(idx) = schema.index_of(field.name()) {
        fields[idx] = Arc::new(field);
        columns[idx] = array;
    } else {
        fields.push(Arc::new(field));
        columns.push(array);
    }

    let new_schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    batch_with_row_count(new_schema, columns, batch.num_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringArray;
    use arrow::datatypes::DataType;

    fn sample() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Utf8, true)]));
        let col: ArrayRef = Arc::new(StringArray::from(vec![Some("x"), None]));
        RecordBatch::try_new(schema, vec![col]).unwrap()
    }

    #[test]
    fn test_upsert_appends_then_replaces() {
        let batch = sample();
        let b: ArrayRef = Arc::new(StringArray::from(vec!["1", "2"]));
        let appended =
            upsert_column(&batch, Field::new("b", DataType::Utf8, true), b.clone()).unwrap();
        assert_eq!(appended.num_columns(), 2);

        let replaced = upsert_column(&appended, Field::new("a", DataType::Utf8, true), b).unwrap();
        assert_eq!(replaced.num_columns(), 2);
        assert_eq!(replaced.schema().field(0).name(), "a");
        // Original is untouched
        assert!(batch.column(0).is_null(1));
    }

    #[test]
    fn test_missing_column_error() {
        let batch = sample();
        assert!(matches!(
            get_column_index(&batch, "zzz"),
            Err(ScheduleError::ColumnNotFound(_))
        ));
        assert!(optional_column(&batch, "zzz").is_none());
    }
}
