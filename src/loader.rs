//! Upload loading utilities
//!
//! Reads delimited text or the first worksheet of a spreadsheet into a raw
//! table: one nullable `Utf8` column per header, header and row order kept,
//! empty cells null.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::util::safe_open_file;
use crate::error::{Result, ScheduleError};
use crate::utils::arrow::batch_with_row_count;
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Parser family chosen from an upload's file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma- or semicolon-delimited text
    Delimited,
    /// Spreadsheet workbook; the first worksheet is read
    Spreadsheet,
}

impl SourceFormat {
    /// Pick the parser for `path` from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Delimited),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(ScheduleError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Pick the delimiter from the header line: semicolon when it occurs more
/// often than comma, comma otherwise
#[must_use]
pub fn detect_delimiter(header_line: &str) -> u8 {
    let commas = header_line.matches(',').count();
    let semicolons = header_line.matches(';').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Raw column-major cell buffer
struct RawColumns {
    headers: Vec<String>,
    cells: Vec<Vec<Option<String>>>,
    num_rows: usize,
}

impl RawColumns {
    fn new(headers: Vec<String>) -> Self {
        let cells = vec![Vec::new(); headers.len()];
        Self {
            headers,
            cells,
            num_rows: 0,
        }
    }

    /// Append a row, padding short rows with nulls and dropping extra cells
    fn push_row(&mut self, row: impl IntoIterator<Item = Option<String>>) {
        let mut row = row.into_iter();
        let width = self.headers.len();
        for column in &mut self.cells {
            column.push(row.next().flatten());
        }
        let extra = row.filter(Option::is_some).count();
        if extra > 0 {
            log::debug!(
                "Row {} has {extra} cells beyond the {width} headers, ignoring them",
                self.num_rows
            );
        }
        self.num_rows += 1;
    }

    fn into_batch(self) -> Result<RecordBatch> {
        let fields: Vec<Field> = self
            .headers
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, true))
            .collect();
        let columns: Vec<ArrayRef> = self
            .cells
            .into_iter()
            .map(|values| Arc::new(StringArray::from(values)) as ArrayRef)
            .collect();
        batch_with_row_count(Arc::new(Schema::new(fields)), columns, self.num_rows)
    }
}

fn non_blank(text: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| text.to_string())
}

/// Read delimited text with a known delimiter
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<RecordBatch> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = if idx == 0 { name.trim_start_matches('\u{feff}') } else { name };
            name.to_string()
        })
        .collect();

    let mut raw = RawColumns::new(headers);
    for record in csv_reader.records() {
        let record = record?;
        raw.push_row(record.iter().map(non_blank));
    }
    raw.into_batch()
}

/// Read delimited text from memory, detecting the delimiter
pub fn read_delimited_bytes(bytes: &[u8]) -> Result<RecordBatch> {
    let header_line = String::from_utf8_lossy(bytes)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    read_delimited(bytes, detect_delimiter(&header_line))
}

/// Read a delimited text file, detecting the delimiter
pub fn read_delimited_file(path: &Path) -> Result<RecordBatch> {
    let mut file = safe_open_file(path, "reading delimited upload")?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ScheduleError::io(path, e))?;
    read_delimited_bytes(&bytes)
}

/// Render an Excel date serial as text the temporal parser accepts
#[allow(clippy::cast_possible_truncation)]
fn render_excel_serial(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let seconds = (serial * 86_400.0).round() as i64;
    let instant = epoch.checked_add_signed(Duration::seconds(seconds))?;
    let text = if serial < 1.0 {
        instant.format("%H:%M:%S").to_string()
    } else if instant.time() == NaiveTime::MIN {
        instant.format("%Y-%m-%d").to_string()
    } else {
        instant.format("%Y-%m-%d %H:%M:%S").to_string()
    };
    Some(text)
}

/// Render one spreadsheet cell as text; empty and error cells are null
#[allow(clippy::cast_possible_truncation)]
fn render_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => non_blank(text),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            Some((*value as i64).to_string())
        }
        Data::Float(value) => Some(value.to_string()),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) => render_excel_serial(value.as_f64()),
        Data::Error(error) => {
            log::debug!("Spreadsheet cell error {error:?}, reading as empty");
            None
        }
    }
}

/// Read the first worksheet of a workbook; the first non-empty row is the header
pub fn read_spreadsheet(path: &Path) -> Result<RecordBatch> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ScheduleError::Spreadsheet(format!("{}: {e}", path.display())))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScheduleError::Spreadsheet(format!("{}: no worksheets", path.display())))?
        .map_err(|e| ScheduleError::Spreadsheet(format!("{}: {e}", path.display())))?;

    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|cell| render_cell(cell).is_none()));

    let Some(header_row) = rows.next() else {
        log_warning("Worksheet is empty", Some(path));
        return RawColumns::new(Vec::new()).into_batch();
    };
    let headers = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| render_cell(cell).unwrap_or_else(|| format!("column_{idx}")))
        .collect();

    let mut raw = RawColumns::new(headers);
    for row in rows {
        raw.push_row(row.iter().map(render_cell));
    }
    raw.into_batch()
}

/// Read an upload into a raw table, choosing the parser by extension
pub fn read_table(path: &Path) -> Result<RecordBatch> {
    let start = Instant::now();
    log_operation_start("Reading upload", path);

    let batch = match SourceFormat::from_path(path)? {
        SourceFormat::Delimited => read_delimited_file(path)?,
        SourceFormat::Spreadsheet => read_spreadsheet(path)?,
    };

    log_operation_complete("read", path, batch.num_rows(), Some(start.elapsed()));
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::arrow::cell_text;

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("agenda.CSV")).unwrap(),
            SourceFormat::Delimited
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("agenda.xlsx")).unwrap(),
            SourceFormat::Spreadsheet
        );
        assert!(matches!(
            SourceFormat::from_path(Path::new("agenda.pdf")),
            Err(ScheduleError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("Data;Hora;Profissional;Atendido"), b';');
        assert_eq!(detect_delimiter("date,start_time,professional"), b',');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_read_semicolon_bytes_pads_and_nulls() {
        let input = "\u{feff}Data;Hora;Profissional\n10/01/2024;09:00;Dr.A\n11/01/2024;;\n12/01/2024\n";
        let batch = read_delimited_bytes(input.as_bytes()).unwrap();

        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.schema().field(0).name(), "Data");
        let hours = batch.column(1);
        assert_eq!(cell_text(hours, 0).as_deref(), Some("09:00"));
        assert!(cell_text(hours, 1).is_none());
        assert!(cell_text(batch.column(2), 2).is_none());
    }

    #[test]
    fn test_excel_serial_rendering() {
        // 2024-01-10 is serial 45301
        assert_eq!(render_excel_serial(45301.0).as_deref(), Some("2024-01-10"));
        assert_eq!(render_excel_serial(45301.375).as_deref(), Some("2024-01-10 09:00:00"));
        assert_eq!(render_excel_serial(0.375).as_deref(), Some("09:00:00"));
    }

    #[test]
    fn test_float_cells_drop_trailing_zeros() {
        assert_eq!(render_cell(&Data::Float(45.0)).as_deref(), Some("45"));
        assert_eq!(render_cell(&Data::Float(12.5)).as_deref(), Some("12.5"));
        assert!(render_cell(&Data::String("  ".to_string())).is_none());
    }
}
