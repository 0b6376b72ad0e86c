//! A Rust library for normalizing uploaded appointment schedules and
//! filtering them by inferred column types.
//!
//! An upload (delimited text or spreadsheet) is read into an Arrow
//! `RecordBatch`, its bilingual headers are mapped to canonical names, start
//! and end instants are reconstructed, outcomes are classified for colouring,
//! and the resulting table is filtered by predicates built from each
//! column's inferred kind.

pub mod appointment;
pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod temporal;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::PipelineConfig;
pub use error::{Result, ScheduleError};
pub use pipeline::{PreparedSchedule, SchedulePipeline};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Pipeline stages
pub use appointment::{CanonicalAppointment, add_titles, appointment_title};
pub use classify::{CategorySynonyms, OutcomeCategory, classify_batch};
pub use loader::{SourceFormat, read_delimited, read_delimited_bytes, read_table};
pub use schema::{ColumnSynonyms, normalize};
pub use temporal::{TimestampPolicy, reconstruct};

// Filtering capabilities
pub use filter::{
    ColumnDescriptor, ColumnKind, FilterConfig, FilterEngine, FilterParams, FilterPredicate,
    FilterSession, FilteredView, TemporalBound, ValueRange,
};

// Outputs
pub use events::{CalendarEvent, events_from_view, write_events_json};
pub use metrics::{CategoryMetric, category_breakdown, category_ratio};
pub use store::{DocumentStore, JsonLinesStore, MemoryStore, PersistReport, persist_rows};
