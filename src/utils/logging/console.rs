//! Console output utilities
//!
//! Human-readable summaries printed by the command-line tool.

use arrow::record_batch::RecordBatch;

use crate::filter::{ColumnDescriptor, ColumnKind, ValueRange};
use crate::metrics::CategoryMetric;
use crate::utils::arrow::{cell_text, format_iso};

/// Print row counts for a prepared table and its filtered view
pub fn print_table_summary(total_rows: usize, visible_rows: usize, elapsed: std::time::Duration) {
    println!("Prepared {total_rows} appointments in {elapsed:?}");
    println!("Rows after filtering: {visible_rows}");
}

/// Print every column name with its Arrow type
pub fn print_schema_info(batch: &RecordBatch) {
    println!("Schema:");
    for field in batch.schema().fields() {
        println!("  - {} ({})", field.name(), field.data_type());
    }
}

/// Print the inferred kind of each column and its selectable domain
pub fn print_descriptors(descriptors: &[ColumnDescriptor]) {
    println!("Columns:");
    for descriptor in descriptors {
        let domain = match &descriptor.range {
            Some(ValueRange::Numeric { min, max }) => format!("[{min}, {max}]"),
            Some(ValueRange::Temporal { min, max }) => {
                format!("[{}, {}]", format_iso(*min), format_iso(*max))
            }
            None if descriptor.kind == ColumnKind::Text => "free text".to_string(),
            None if descriptor.distinct_values.len() <= 10 => {
                descriptor.distinct_values.join(" | ")
            }
            None => format!("{} distinct values", descriptor.distinct_values.len()),
        };
        println!("  - {} ({}): {domain}", descriptor.name, descriptor.kind);
    }
}

/// Print per-category counts and percentages
pub fn print_metrics(metrics: &[CategoryMetric]) {
    println!("Outcomes:");
    for metric in metrics {
        println!(
            "  - {}: {} ({:.2}%)",
            metric.category, metric.count, metric.ratio
        );
    }
}

/// Print the first rows of a batch
pub fn print_sample_rows(batch: &RecordBatch, num_rows: usize) {
    let schema = batch.schema();
    println!("First {} rows:", num_rows.min(batch.num_rows()));
    for row_idx in 0..num_rows.min(batch.num_rows()) {
        let cells: Vec<String> = batch
            .columns()
            .iter()
            .zip(schema.fields())
            .map(|(column, field)| {
                let value = cell_text(column, row_idx).unwrap_or_else(|| "NULL".to_string());
                format!("{}: {value}", field.name())
            })
            .collect();
        println!("Row {row_idx}: [{}]", cells.join(", "));
    }
}
