//! Canonical appointment rows and their derived display title.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::classify::OutcomeCategory;
use crate::error::Result;
use crate::schema::{
    COLOR_TAG, DATE, DESCRIPTION, DURATION_MINUTES, END, OUTCOME_CATEGORY, PATIENT,
    PROFESSIONAL, SECTOR, START, START_TIME, TITLE,
};
use crate::utils::arrow::{cell_text, cell_timestamp, get_column_by_name, optional_column, upsert_column};

/// Maximum number of description characters shown in a title
pub const TITLE_DESCRIPTION_CHARS: usize = 30;

/// Build an event title from the patient name and an optional description
///
/// A non-blank description adds ` (<first 30 chars>)`.
#[must_use]
pub fn appointment_title(patient: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => {
            let short: String = description.chars().take(TITLE_DESCRIPTION_CHARS).collect();
            format!("{patient} ({short})")
        }
        None => patient.to_string(),
    }
}

/// Append the `title` column computed from `patient` and `description`
pub fn add_titles(batch: &RecordBatch) -> Result<RecordBatch> {
    let patients = get_column_by_name(batch, PATIENT)?;
    let descriptions = optional_column(batch, DESCRIPTION);

    let titles: Vec<String> = (0..batch.num_rows())
        .map(|row| {
            let patient = cell_text(&patients, row).unwrap_or_default();
            let description = descriptions.as_ref().and_then(|col| cell_text(col, row));
            appointment_title(patient.trim(), description.as_deref())
        })
        .collect();

    let array: ArrayRef = Arc::new(StringArray::from(titles));
    upsert_column(batch, Field::new(TITLE, DataType::Utf8, false), array)
}

/// One normalized appointment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalAppointment {
    /// Appointment date as uploaded
    pub date: Option<String>,
    /// Start time as uploaded
    pub start_time: Option<String>,
    /// Professional attending the appointment
    pub professional: Option<String>,
    /// Patient name
    pub patient: Option<String>,
    /// Free-text notes
    pub description: Option<String>,
    /// Resolved length in minutes
    pub duration_minutes: Option<i64>,
    /// Raw outcome text
    pub outcome_category: Option<String>,
    /// Sector or department
    pub sector: Option<String>,
    /// `None` when the row's timestamp could not be parsed
    pub start: Option<NaiveDateTime>,
    /// `start` plus the resolved duration
    pub end: Option<NaiveDateTime>,
    /// Display title
    pub title: String,
    /// Classified outcome
    pub color_tag: OutcomeCategory,
}

impl CanonicalAppointment {
    /// Convert a prepared schedule batch into appointments, one per row
    ///
    /// # Errors
    /// Returns `ColumnNotFound` when a required column is absent.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let dates = get_column_by_name(batch, DATE)?;
        let times = get_column_by_name(batch, START_TIME)?;
        let professionals = get_column_by_name(batch, PROFESSIONAL)?;
        let patients = get_column_by_name(batch, PATIENT)?;

        let text = |name: &str| optional_column(batch, name);
        let descriptions = text(DESCRIPTION);
        let durations = text(DURATION_MINUTES);
        let outcomes = text(OUTCOME_CATEGORY);
        let sectors = text(SECTOR);
        let starts = text(START);
        let ends = text(END);
        let titles = text(TITLE);
        let tags = text(COLOR_TAG);

        let cell = |column: &Option<ArrayRef>, row: usize| {
            column.as_ref().and_then(|col| cell_text(col, row))
        };
        let instant = |column: &Option<ArrayRef>, row: usize| {
            column.as_ref().and_then(|col| cell_timestamp(col, row))
        };

        let appointments = (0..batch.num_rows())
            .map(|row| {
                let patient = cell_text(&patients, row);
                let description = cell(&descriptions, row);
                let title = cell(&titles, row).unwrap_or_else(|| {
                    appointment_title(
                        patient.as_deref().unwrap_or_default().trim(),
                        description.as_deref(),
                    )
                });
                Self {
                    date: cell_text(&dates, row),
                    start_time: cell_text(&times, row),
                    professional: cell_text(&professionals, row),
                    patient,
                    description,
                    duration_minutes: cell(&durations, row).and_then(|d| d.parse().ok()),
                    outcome_category: cell(&outcomes, row),
                    sector: cell(&sectors, row),
                    start: instant(&starts, row),
                    end: instant(&ends, row),
                    title,
                    color_tag: cell(&tags, row)
                        .and_then(|tag| tag.parse().ok())
                        .unwrap_or(OutcomeCategory::Unclassified),
                }
            })
            .collect();
        Ok(appointments)
    }
}
