#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use sched_reader::filter::FilterConfig;
use sched_reader::temporal::DateFormatConfig;
use sched_reader::utils::arrow::cell_text;
use sched_reader::{FilterEngine, PipelineConfig, SchedulePipeline};

/// Directory holding the upload fixtures
#[must_use]
pub fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

/// Path to one fixture file
#[must_use]
pub fn fixture(name: &str) -> PathBuf {
    test_data_dir().join(name)
}

/// Build an all-`Utf8` raw table, the shape the upload readers produce
pub fn raw_batch(headers: &[&str], rows: &[Vec<Option<&str>>]) -> RecordBatch {
    let fields: Vec<Field> = headers
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, true))
        .collect();
    let columns: Vec<ArrayRef> = (0..headers.len())
        .map(|col| {
            let values: Vec<Option<&str>> = rows.iter().map(|row| row[col]).collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap()
}

/// The two-row upload from the reference scenario, Portuguese headers
pub fn scenario_batch() -> RecordBatch {
    raw_batch(
        &["Data", "Hora", "Profissional", "Atendido", "Tipo Falta"],
        &[
            vec![Some("10/01/2024"), Some("09:00"), Some("Dr.A"), Some("P1"), Some("Atendido")],
            vec![Some("10/01/2024"), Some("09:00"), Some("Dr.A"), Some("P2"), Some("Paciente")],
        ],
    )
}

/// Pipeline with default configuration
pub fn default_pipeline() -> SchedulePipeline {
    SchedulePipeline::new(PipelineConfig::default()).unwrap()
}

/// Engine that only treats columns with fewer than `threshold` distinct
/// values as categorical
pub fn engine_with_threshold(threshold: usize) -> FilterEngine {
    FilterEngine::new(
        FilterConfig {
            categorical_threshold: threshold,
            categorical_columns: Vec::new(),
        },
        DateFormatConfig::default(),
    )
}

/// All cells of a column as text
pub fn column_text(batch: &RecordBatch, name: &str) -> Vec<Option<String>> {
    let column = batch.column_by_name(name).unwrap();
    (0..batch.num_rows()).map(|row| cell_text(column, row)).collect()
}
