use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use log::info;

use sched_reader::filter::values::parse_number;
use sched_reader::utils::logging::console;
use sched_reader::{
    ColumnDescriptor, ColumnKind, FilterParams, FilterSession, JsonLinesStore, OutcomeCategory,
    PipelineConfig, RecordBatch, SchedulePipeline, TemporalBound, TimestampPolicy,
    category_breakdown, category_ratio, events_from_view, persist_rows, write_events_json,
};
use sched_reader::temporal::DateFormatConfig;

/// Normalize an appointment schedule upload and filter it by column
#[derive(Debug, Parser)]
#[command(name = "sched-reader", version)]
struct Args {
    /// Delimited text (.csv, .txt) or spreadsheet (.xlsx, .xls, .ods) upload
    file: PathBuf,

    /// JSON pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Handling of rows whose date and time cannot be parsed
    #[arg(long, value_name = "fail-fast|null-row")]
    policy: Option<TimestampPolicy>,

    /// Print the inferred kind and domain of every column
    #[arg(long)]
    describe: bool,

    /// Keep rows whose column value is one of the listed values
    #[arg(long = "values", value_name = "COL=a,b")]
    values: Vec<String>,

    /// Keep rows whose numeric or date column lies in the closed interval
    #[arg(long = "range", value_name = "COL=lo..hi")]
    ranges: Vec<String>,

    /// Keep rows whose text column matches a substring or regex
    #[arg(long = "match", value_name = "COL=pattern")]
    patterns: Vec<String>,

    /// Print the percentage of one outcome tag
    #[arg(long)]
    metric: Option<OutcomeCategory>,

    /// Write calendar events for the filtered rows as JSON
    #[arg(long)]
    events: Option<PathBuf>,

    /// Append every prepared row to a JSON lines document file
    #[arg(long)]
    persist: Option<PathBuf>,
}

fn split_assignment(arg: &str) -> anyhow::Result<(&str, &str)> {
    arg.split_once('=')
        .map(|(column, value)| (column.trim(), value))
        .with_context(|| format!("expected COL=VALUE, got '{arg}'"))
}

/// Turn `lo..hi` into interval parameters; an empty end takes the observed bound
fn range_params(
    descriptor: &ColumnDescriptor,
    bounds: &str,
    formats: &DateFormatConfig,
) -> anyhow::Result<FilterParams> {
    let (lo, hi) = bounds
        .split_once("..")
        .with_context(|| format!("expected lo..hi for '{}', got '{bounds}'", descriptor.name))?;
    let (lo, hi) = (lo.trim(), hi.trim());

    match (descriptor.kind, FilterParams::default_for(descriptor)) {
        (ColumnKind::Numeric, FilterParams::NumericRange { lo: min, hi: max }) => {
            let bound = |text: &str, fallback: f64| -> anyhow::Result<f64> {
                if text.is_empty() {
                    return Ok(fallback);
                }
                parse_number(text).with_context(|| format!("'{text}' is not a number"))
            };
            Ok(FilterParams::NumericRange {
                lo: bound(lo, min)?,
                hi: bound(hi, max)?,
            })
        }
        (ColumnKind::Temporal, FilterParams::TemporalRange { from, to }) => {
            let bound = |text: &str, fallback: TemporalBound| -> anyhow::Result<TemporalBound> {
                if text.is_empty() {
                    return Ok(fallback);
                }
                TemporalBound::parse(text, formats)
                    .with_context(|| format!("'{text}' is not a date"))
            };
            Ok(FilterParams::TemporalRange {
                from: bound(lo, from)?,
                to: bound(hi, to)?,
            })
        }
        (kind, _) => bail!(
            "column '{}' is {kind}, ranges apply to numeric or temporal columns",
            descriptor.name
        ),
    }
}

fn apply_selections(
    args: &Args,
    session: &mut FilterSession,
    table: &RecordBatch,
    formats: &DateFormatConfig,
) -> anyhow::Result<()> {
    for arg in &args.values {
        let (column, list) = split_assignment(arg)?;
        let values = list.split(',').map(|v| v.trim().to_string()).collect();
        session.select(column, FilterParams::Values(values));
    }
    for arg in &args.ranges {
        let (column, bounds) = split_assignment(arg)?;
        let descriptor = session.expose(table, column)?;
        session.select(column, range_params(&descriptor, bounds, formats)?);
    }
    for arg in &args.patterns {
        let (column, pattern) = split_assignment(arg)?;
        session.select(column, FilterParams::Pattern(pattern.to_string()));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(policy) = args.policy {
        config.timestamp_policy = policy;
    }
    info!("Timestamp policy: {}", config.timestamp_policy);

    let start = Instant::now();
    let pipeline = SchedulePipeline::new(config)?;
    let prepared = pipeline
        .load(&args.file)
        .with_context(|| format!("Failed to prepare {}", args.file.display()))?;
    let table = &prepared.table;

    let mut session = pipeline.session();
    if args.describe {
        console::print_schema_info(table);
        console::print_descriptors(&session.engine().describe_columns(table)?);
    }

    apply_selections(&args, &mut session, table, &pipeline.config().date_formats)?;
    let view = session.apply(table)?;
    console::print_table_summary(table.num_rows(), view.num_rows(), start.elapsed());
    console::print_sample_rows(view.batch(), 5);

    if let Some(category) = args.metric {
        println!("{category}: {:.2}%", category_ratio(&view, category));
    } else {
        console::print_metrics(&category_breakdown(&view));
    }

    if let Some(path) = &args.events {
        let events = events_from_view(&view)?;
        write_events_json(&events, path)?;
    }

    if let Some(path) = &args.persist {
        let mut store = JsonLinesStore::open(path)?;
        let report = persist_rows(table, &mut store);
        if !report.failures.is_empty() {
            log::warn!(
                "{} of {} rows were not persisted",
                report.failures.len(),
                table.num_rows()
            );
        }
    }

    Ok(())
}
