mod utils;

use sched_reader::schema::{ColumnSynonyms, normalize, normalize_columns};
use sched_reader::{Result, ScheduleError};

use crate::utils::raw_batch;

fn header_names(batch: &sched_reader::RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

#[test]
fn test_both_header_languages_normalize_identically() -> Result<()> {
    let synonyms = ColumnSynonyms::default();
    let row = vec![Some("10/01/2024"), Some("09:00"), Some("Dr.A"), Some("P1")];

    let portuguese = raw_batch(&["DATA", " Hora ", "PROFISSIONAL", "atendido"], &[row.clone()]);
    let english = raw_batch(&["Date", "Start_Time", "Professional", "PATIENT"], &[row]);

    let expected = vec!["date", "start_time", "professional", "patient"];
    assert_eq!(header_names(&normalize(&portuguese, &synonyms)?), expected);
    assert_eq!(header_names(&normalize(&english, &synonyms)?), expected);
    Ok(())
}

#[test]
fn test_optional_headers_and_passthrough() -> Result<()> {
    let batch = raw_batch(
        &["Data", "Hora", "Profissional", "Paciente", "Observações", "Duração", "Tipo Falta", "Setor", "Convênio"],
        &[vec![None; 9]],
    );
    let normalized = normalize(&batch, &ColumnSynonyms::default())?;
    assert_eq!(
        header_names(&normalized),
        vec![
            "date",
            "start_time",
            "professional",
            "patient",
            "description",
            "duration_minutes",
            "outcome_category",
            "sector",
            "convênio",
        ]
    );
    // Column data is untouched
    assert_eq!(normalized.num_rows(), 1);
    Ok(())
}

#[test]
fn test_missing_required_columns_are_named() {
    let batch = raw_batch(&["Data", "Profissional"], &[vec![Some("10/01/2024"), Some("Dr.A")]]);
    match normalize(&batch, &ColumnSynonyms::default()) {
        Err(ScheduleError::MissingColumns { missing }) => {
            assert_eq!(missing, vec!["patient".to_string(), "start_time".to_string()]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn test_duplicate_canonical_header_keeps_first() -> Result<()> {
    let batch = raw_batch(
        &["Atendido", "Paciente"],
        &[vec![Some("P1"), Some("P1 again")]],
    );
    let normalized = normalize_columns(&batch, &ColumnSynonyms::default())?;
    assert_eq!(header_names(&normalized), vec!["patient", "paciente"]);
    Ok(())
}

#[test]
fn test_custom_synonym() -> Result<()> {
    let mut synonyms = ColumnSynonyms::default();
    synonyms.insert("Médico", "professional");
    let batch = raw_batch(
        &["data", "hora", "médico", "paciente"],
        &[vec![Some("10/01/2024"), Some("09:00"), Some("Dr.A"), Some("P1")]],
    );
    let normalized = normalize(&batch, &synonyms)?;
    assert!(normalized.column_by_name("professional").is_some());
    Ok(())
}
