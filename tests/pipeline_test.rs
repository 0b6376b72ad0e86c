mod utils;

use std::io::{BufRead, BufReader};

use sched_reader::schema::{COLOR_TAG, DURATION_MINUTES, TITLE};
use sched_reader::store::ID_FIELD;
use sched_reader::{
    JsonLinesStore, MemoryStore, OutcomeCategory, PipelineConfig, Result, ScheduleError,
    SchedulePipeline, TimestampPolicy, category_breakdown, category_ratio, events_from_view,
    persist_rows, read_table,
};

use crate::utils::{column_text, default_pipeline, fixture, raw_batch, scenario_batch};

#[test]
fn test_reference_scenario() -> Result<()> {
    let prepared = default_pipeline().run(&scenario_batch())?;
    let view = prepared.full_view();

    let events = events_from_view(&view)?;
    assert_eq!(events.len(), 2);
    for event in &events {
        assert_eq!(event.start, "2024-01-10T09:00:00");
        assert_eq!(event.end, "2024-01-10T09:30:00");
    }
    let attended = OutcomeCategory::Attended.palette();
    let absent = OutcomeCategory::PatientAbsent.palette();
    assert_eq!(events[0].background_color, attended.background);
    assert_eq!(events[1].background_color, absent.background);
    assert_eq!(events[1].border_color, absent.border);
    assert_eq!(events[0].title, "P1");

    assert_eq!(
        column_text(&prepared.table, COLOR_TAG),
        vec![Some("attended".to_string()), Some("patient_absent".to_string())]
    );
    assert!((category_ratio(&view, OutcomeCategory::PatientAbsent) - 50.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn test_fixture_upload() -> Result<()> {
    let prepared = default_pipeline().load(&fixture("schedule.csv"))?;
    let table = &prepared.table;
    assert_eq!(table.num_rows(), 5);
    assert!(prepared.unparsed_rows.is_empty());
    assert_eq!(prepared.defaulted_durations, 3);

    assert_eq!(
        column_text(table, DURATION_MINUTES),
        ["45", "30", "30", "30", "20"]
            .iter()
            .map(|v| Some((*v).to_string()))
            .collect::<Vec<_>>()
    );
    assert_eq!(
        column_text(table, COLOR_TAG),
        ["attended", "patient_absent", "professional_absent", "unclassified", "attended"]
            .iter()
            .map(|v| Some((*v).to_string()))
            .collect::<Vec<_>>()
    );
    let titles = column_text(table, TITLE);
    assert_eq!(titles[0].as_deref(), Some("Maria Souza (Retorno pós-operatório com ava)"));
    assert_eq!(titles[1].as_deref(), Some("João Lima"));

    let view = prepared.full_view();
    let breakdown = category_breakdown(&view);
    assert_eq!(breakdown[0].category, OutcomeCategory::Attended);
    assert_eq!(breakdown[0].count, 2);
    assert!((breakdown[0].ratio - 40.0).abs() < f64::EPSILON);

    let events = events_from_view(&view)?;
    assert_eq!(events[0].end, "2024-01-10T09:45:00");
    assert_eq!(events[0].extended_props.professional.as_deref(), Some("Dr. Ana"));
    assert!(events[1].extended_props.description.is_none());
    Ok(())
}

#[test]
fn test_missing_columns_stop_before_reconstruction() {
    let raw = raw_batch(
        &["Data", "Hora", "Atendido"],
        // The date would also fail to parse; the column check comes first
        &[vec![Some("not a date"), Some("09:00"), Some("P1")]],
    );
    let result = default_pipeline().run(&raw);
    match result {
        Err(error @ ScheduleError::MissingColumns { .. }) => assert!(error.is_structural()),
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn test_null_row_policy_skips_event() -> Result<()> {
    let pipeline = SchedulePipeline::new(PipelineConfig {
        timestamp_policy: TimestampPolicy::NullRow,
        ..Default::default()
    })?;
    let raw = raw_batch(
        &["Data", "Hora", "Profissional", "Atendido"],
        &[
            vec![Some("10/01/2024"), Some("09:00"), Some("Dr.A"), Some("P1")],
            vec![Some("10/01/2024"), None, Some("Dr.A"), Some("P2")],
        ],
    );
    let prepared = pipeline.run(&raw)?;

    assert_eq!(prepared.table.num_rows(), 2);
    assert_eq!(prepared.unparsed_rows, vec![1]);
    let events = events_from_view(&prepared.full_view())?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "P1");
    Ok(())
}

#[test]
fn test_empty_view_metrics_are_zero() -> Result<()> {
    let pipeline = default_pipeline();
    let prepared = pipeline.run(&scenario_batch())?;
    let mut session = pipeline.session();
    session.select(
        "patient",
        sched_reader::FilterParams::Values(std::collections::BTreeSet::new()),
    );
    let view = session.apply(&prepared.table)?;

    assert!(view.is_empty());
    for metric in category_breakdown(&view) {
        assert_eq!(metric.count, 0);
        assert!(metric.ratio.abs() < f64::EPSILON);
    }
    assert!(events_from_view(&view)?.is_empty());
    Ok(())
}

#[test]
fn test_comma_delimited_bytes() -> Result<()> {
    let upload = "date,start_time,professional,patient,outcome\n2024-01-10,09:00,Dr.A,P1,no-show\n";
    let prepared = default_pipeline().load_delimited_bytes(upload.as_bytes())?;
    assert_eq!(
        column_text(&prepared.table, COLOR_TAG),
        vec![Some("patient_absent".to_string())]
    );
    Ok(())
}

#[test]
fn test_persist_every_prepared_row() -> Result<()> {
    let prepared = default_pipeline().load(&fixture("schedule.csv"))?;
    let mut store = MemoryStore::new();
    let report = persist_rows(&prepared.table, &mut store);

    assert_eq!(report.stored.len(), 5);
    assert!(report.failures.is_empty());
    let (_, first) = &store.documents()[0];
    assert_eq!(first["patient"], "Maria Souza");
    assert_eq!(first["start"], "2024-01-10T09:00:00");
    assert_eq!(first["color_tag"], "attended");
    Ok(())
}

#[test]
fn test_json_lines_store_appends_ids() -> Result<()> {
    let path = std::env::temp_dir().join(format!("sched-reader-{}.jsonl", uuid::Uuid::new_v4()));
    let prepared = default_pipeline().run(&scenario_batch())?;
    {
        let mut store = JsonLinesStore::open(&path)?;
        let report = persist_rows(&prepared.table, &mut store);
        assert_eq!(report.stored.len(), 2);
    }

    let file = std::fs::File::open(&path).unwrap();
    let lines: Vec<serde_json::Value> = BufReader::new(file)
        .lines()
        .map(|line| serde_json::from_str(&line.unwrap()).unwrap())
        .collect();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|doc| doc[ID_FIELD].is_string()));
    assert_eq!(lines[1]["patient"], "P2");
    Ok(())
}

#[test]
fn test_unsupported_upload_extension() {
    let result = default_pipeline().load(std::path::Path::new("agenda.pdf"));
    assert!(matches!(result, Err(ScheduleError::UnsupportedFormat(_))));
}

#[test]
fn test_spreadsheet_upload_headers_and_serials() -> Result<()> {
    let path = fixture("schedule.xlsx");
    let raw = read_table(&path)?;
    let headers: Vec<String> = raw.schema().fields().iter().map(|f| f.name().clone()).collect();
    assert_eq!(
        headers,
        ["Data", "Hora", "Profissional", "Atendido", "Tipo Falta", "Duração", "column_6"]
    );
    assert_eq!(raw.num_rows(), 2);
    assert_eq!(
        column_text(&raw, "Data"),
        vec![Some("2024-01-10".to_string()), Some("2024-01-11".to_string())]
    );
    assert_eq!(
        column_text(&raw, "Hora"),
        vec![Some("09:00:00".to_string()), Some("12:00:00".to_string())]
    );
    assert_eq!(column_text(&raw, "Duração"), vec![Some("45".to_string()), None]);
    assert_eq!(column_text(&raw, "column_6"), vec![Some("sala 2".to_string()), None]);

    let prepared = default_pipeline().load(&path)?;
    assert_eq!(prepared.defaulted_durations, 1);
    assert_eq!(
        column_text(&prepared.table, COLOR_TAG),
        vec![Some("attended".to_string()), Some("patient_absent".to_string())]
    );
    let events = events_from_view(&prepared.full_view())?;
    assert_eq!(events[0].start, "2024-01-10T09:00:00");
    assert_eq!(events[0].end, "2024-01-10T09:45:00");
    assert_eq!(events[1].start, "2024-01-11T12:00:00");
    assert_eq!(events[1].end, "2024-01-11T12:30:00");
    Ok(())
}
