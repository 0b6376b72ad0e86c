//! Canonical appointment schema.
//!
//! Uploaded schedules arrive with headers in Portuguese or English and in any
//! casing. This module defines the language-neutral attribute names the rest
//! of the pipeline works with and the normalizer that maps headers onto them.

pub mod normalize;

use std::collections::HashMap;

use arrow::datatypes::Field;

pub use normalize::{ColumnSynonyms, check_required_columns, normalize, normalize_columns};

/// Appointment date
pub const DATE: &str = "date";
/// Time of day the appointment starts
pub const START_TIME: &str = "start_time";
/// Professional attending the appointment
pub const PROFESSIONAL: &str = "professional";
/// Patient name
pub const PATIENT: &str = "patient";
/// Free-text notes
pub const DESCRIPTION: &str = "description";
/// Per-row duration in minutes
pub const DURATION_MINUTES: &str = "duration_minutes";
/// Free-text outcome of the appointment
pub const OUTCOME_CATEGORY: &str = "outcome_category";
/// Sector / department
pub const SECTOR: &str = "sector";

/// Derived absolute start instant
pub const START: &str = "start";
/// Derived absolute end instant
pub const END: &str = "end";
/// Derived event title
pub const TITLE: &str = "title";
/// Derived outcome tag used for colour-coding
pub const COLOR_TAG: &str = "color_tag";

/// Attributes every upload must provide after normalization
pub const REQUIRED_COLUMNS: [&str; 4] = [DATE, START_TIME, PROFESSIONAL, PATIENT];

/// Field metadata key carrying an upstream column-kind hint
pub const KIND_METADATA_KEY: &str = "kind";
/// Metadata value marking a column as categorical
pub const CATEGORICAL_KIND: &str = "categorical";

/// Mark a field as categorical so the filter engine skips type probing
#[must_use]
pub fn tag_categorical(field: Field) -> Field {
    let mut metadata: HashMap<String, String> = field.metadata().clone();
    metadata.insert(KIND_METADATA_KEY.to_string(), CATEGORICAL_KIND.to_string());
    field.with_metadata(metadata)
}

/// Whether a field was tagged categorical upstream
#[must_use]
pub fn is_tagged_categorical(field: &Field) -> bool {
    field
        .metadata()
        .get(KIND_METADATA_KEY)
        .is_some_and(|kind| kind == CATEGORICAL_KIND)
}
