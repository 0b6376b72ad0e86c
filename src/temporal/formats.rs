//! Day-first date and time parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Configuration for date format handling
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateFormatConfig {
    /// Formats tried, in order, on joined `date time` text
    pub datetime_formats: Vec<String>,
    /// Formats tried on date-only text; the result is taken at midnight
    pub date_formats: Vec<String>,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            datetime_formats: vec![
                "%d/%m/%Y %H:%M:%S".to_string(), // 10/01/2024 09:00:00
                "%d/%m/%Y %H:%M".to_string(),    // 10/01/2024 09:00
                "%d/%m/%y %H:%M:%S".to_string(), // 10/01/24 09:00:00
                "%d/%m/%y %H:%M".to_string(),    // 10/01/24 09:00
                "%d-%m-%Y %H:%M:%S".to_string(),
                "%d-%m-%Y %H:%M".to_string(),
                "%d.%m.%Y %H:%M:%S".to_string(), // 10.01.2024 09:00:00
                "%d.%m.%Y %H:%M".to_string(),
                "%Y-%m-%d %H:%M:%S%.f".to_string(), // ISO with fraction
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M".to_string(),
                "%Y/%m/%d %H:%M:%S".to_string(),
                "%Y/%m/%d %H:%M".to_string(),
            ],
            date_formats: vec![
                "%d/%m/%Y".to_string(),
                "%d/%m/%y".to_string(),
                "%d-%m-%Y".to_string(),
                "%d.%m.%Y".to_string(),
                "%Y-%m-%d".to_string(),
                "%Y/%m/%d".to_string(),
                "%Y%m%d".to_string(),
            ],
        }
    }
}

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date(text: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    let text = text.trim();
    config
        .date_formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Parse a timestamp string, day-first
///
/// Offsets are stripped: `2024-01-10T09:00:00+02:00` parses to the wall-clock
/// instant `2024-01-10 09:00:00`. Date-only text is taken at midnight.
#[must_use]
pub fn parse_datetime(text: &str, config: &DateFormatConfig) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.naive_local());
    }

    config
        .datetime_formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| parse_date(text, config).and_then(|date| date.and_hms_opt(0, 0, 0)))
}

/// Join a date cell and a time-of-day cell into one timestamp text
///
/// Spreadsheet exports often render the date cell with a midnight time
/// component; that component is dropped so the time-of-day cell decides.
#[must_use]
pub fn join_date_time(date: &str, time: &str) -> String {
    let date = date.trim();
    let date = [" 00:00:00", "T00:00:00", " 00:00"]
        .iter()
        .find_map(|suffix| date.strip_suffix(suffix))
        .unwrap_or(date);
    format!("{date} {}", time.trim())
}
