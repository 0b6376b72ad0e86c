//! Calendar events handed to the presentation layer.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::appointment::CanonicalAppointment;
use crate::error::{Result, ScheduleError};
use crate::error::util::safe_create_file;
use crate::filter::FilteredView;
use crate::utils::arrow::format_iso;

/// Opaque properties carried alongside an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedProps {
    /// Professional attending the appointment
    pub professional: Option<String>,
    /// Patient name
    pub patient: Option<String>,
    /// Free-text notes
    pub description: Option<String>,
}

/// One calendar event in the shape the calendar widget expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Patient name with the shortened description
    pub title: String,
    /// ISO-8601 local instant
    pub start: String,
    /// ISO-8601 local instant
    pub end: String,
    /// Fill color of the outcome category
    pub background_color: String,
    /// Border color of the outcome category
    pub border_color: String,
    /// Row details carried for the detail popup
    pub extended_props: ExtendedProps,
}

impl CalendarEvent {
    /// Build the event for an appointment; `None` when it has no start
    #[must_use]
    pub fn from_appointment(appointment: &CanonicalAppointment) -> Option<Self> {
        let start = appointment.start?;
        let end = appointment.end.unwrap_or(start);
        let colors = appointment.color_tag.palette();
        Some(Self {
            title: appointment.title.clone(),
            start: format_iso(start),
            end: format_iso(end),
            background_color: colors.background.to_string(),
            border_color: colors.border.to_string(),
            extended_props: ExtendedProps {
                professional: appointment.professional.clone(),
                patient: appointment.patient.clone(),
                description: appointment.description.clone(),
            },
        })
    }
}

/// Events for every row of the view that has a start instant
pub fn events_from_view(view: &FilteredView) -> Result<Vec<CalendarEvent>> {
    let appointments = CanonicalAppointment::from_record_batch(view.batch())?;
    let events: Vec<CalendarEvent> = appointments
        .iter()
        .filter_map(CalendarEvent::from_appointment)
        .collect();
    let skipped = appointments.len() - events.len();
    if skipped > 0 {
        log::warn!("Skipped {skipped} rows without a start instant");
    }
    Ok(events)
}

/// Write events as a JSON array
pub fn write_events_json(events: &[CalendarEvent], path: &Path) -> Result<()> {
    let file = safe_create_file(path, "writing calendar events")?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, events)?;
    writer.flush().map_err(|e| ScheduleError::io(path, e))?;
    log::info!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::classify::OutcomeCategory;

    fn appointment(start: Option<NaiveDateTime>) -> CanonicalAppointment {
        CanonicalAppointment {
            date: Some("10/01/2024".to_string()),
            start_time: Some("09:00".to_string()),
            professional: Some("Dr.A".to_string()),
            patient: Some("P1".to_string()),
            description: None,
            duration_minutes: Some(30),
            outcome_category: Some("Atendido".to_string()),
            sector: None,
            start,
            end: start.map(|s| s + chrono::Duration::minutes(30)),
            title: "P1".to_string(),
            color_tag: OutcomeCategory::Attended,
        }
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let event = CalendarEvent::from_appointment(&appointment(Some(start))).unwrap();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["start"], "2024-01-10T09:00:00");
        assert_eq!(json["end"], "2024-01-10T09:30:00");
        assert_eq!(json["backgroundColor"], OutcomeCategory::Attended.palette().background);
        assert_eq!(json["borderColor"], OutcomeCategory::Attended.palette().border);
        assert_eq!(json["extendedProps"]["professional"], "Dr.A");
    }

    #[test]
    fn test_row_without_start_has_no_event() {
        assert!(CalendarEvent::from_appointment(&appointment(None)).is_none());
    }
}
