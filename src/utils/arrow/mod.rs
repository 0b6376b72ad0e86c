//! Arrow data handling utilities
//!
//! Helpers for column lookup, replacement and cell value extraction on
//! record batches.

pub mod array_utils;
pub mod conversion;

// Re-export commonly used functions for convenience
pub use array_utils::{
    batch_with_row_count, downcast_array, get_column_by_name, get_column_index, optional_column,
    upsert_column,
};
pub use conversion::{
    ISO_FORMAT, cell_text, cell_timestamp, format_iso, millis_to_naive, naive_to_millis,
    timestamp_type,
};
