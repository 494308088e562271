// inspect: show how a batch is read and how column texts resolve, without writing anything

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use lotegen_config::Settings;
use lotegen_engine::resolver::closest;
use lotegen_engine::{materialize, Event, HeaderLocation, Resolution, SourceTable};
use lotegen_io::read_batch;

use crate::error::CliError;
use crate::generate::non_blank;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Batch spreadsheet (xlsx, xls, xlsb, ods, csv, tsv)
    pub batch: PathBuf,

    /// Header text of the process column; also anchors header detection
    #[arg(long, value_name = "TEXT")]
    pub process_column: Option<String>,

    /// Column text to resolve (repeatable). Default: the configured event columns
    #[arg(long = "column", short = 'c', value_name = "TEXT")]
    pub columns: Vec<String>,

    /// Settings file (default: <config dir>/lotegen/settings.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub batch: PathBuf,
    pub header: HeaderLocation,
    pub rows: usize,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<String>,
    pub candidates: Vec<CandidateReport>,
}

#[derive(Debug, Serialize)]
pub struct CandidateReport {
    /// `PROCESSO`, an event id, or `column` for `--column` texts.
    pub field: String,
    pub text: String,
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest: Option<(String, f64)>,
}

pub fn cmd_inspect(args: InspectArgs) -> Result<(), CliError> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(text) = &args.process_column {
        settings.columns.process = non_blank("--process-column", text)?;
    }

    let matrix = read_batch(&args.batch)?;
    let header = settings.header_locator().locate(&matrix)?;
    let source = materialize(&matrix, header.row)?;

    let mut wanted: Vec<(String, String)> =
        vec![("PROCESSO".to_string(), settings.columns.process.clone())];
    if args.columns.is_empty() {
        for event in Event::ALL {
            let text = settings.columns.event(event).trim();
            if !text.is_empty() {
                wanted.push((event.id().to_string(), text.to_string()));
            }
        }
    } else {
        wanted.extend(args.columns.iter().map(|t| ("column".to_string(), t.clone())));
    }

    let resolver = settings.column_resolver();
    let candidates = wanted
        .into_iter()
        .map(|(field, text)| candidate_report(&resolver, &source, field, text))
        .collect();

    let report = InspectReport {
        batch: args.batch.clone(),
        header,
        rows: source.row_count(),
        columns: source.columns().to_vec(),
        collisions: source.collisions().to_vec(),
        candidates,
    };

    if args.json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("failed to serialize report: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}

fn candidate_report(
    resolver: &lotegen_engine::ColumnResolver,
    source: &SourceTable,
    field: String,
    text: String,
) -> CandidateReport {
    let resolution = resolver.resolve(source, &text);
    let closest = match resolution {
        Some(_) => None,
        None => closest(&text, source.columns())
            .map(|(i, score)| (source.columns()[i].clone(), score)),
    };
    CandidateReport { field, text, resolution, closest }
}

fn render_text(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "header: row {} ({})",
        report.header.row + 1,
        report.header.located_by.as_str()
    );
    let _ = writeln!(out, "rows:   {}", report.rows);
    let _ = writeln!(out, "columns:");
    for (i, name) in report.columns.iter().enumerate() {
        let _ = writeln!(out, "  {:>3}  {}", i + 1, name);
    }
    for name in &report.collisions {
        let _ = writeln!(out, "collision: '{name}'");
    }

    let _ = writeln!(out, "resolution:");
    for c in &report.candidates {
        match (&c.resolution, &c.closest) {
            (Some(r), _) => {
                let score = r.score.map(|s| format!(" {s:.2}")).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "  {:<9} '{}' -> '{}' ({}{})",
                    c.field,
                    c.text,
                    r.column,
                    r.stage.as_str(),
                    score
                );
            }
            (None, Some((name, score))) => {
                let _ = writeln!(
                    out,
                    "  {:<9} '{}' -> not found (closest '{}' at {:.2})",
                    c.field, c.text, name, score
                );
            }
            (None, None) => {
                let _ = writeln!(out, "  {:<9} '{}' -> not found", c.field, c.text);
            }
        }
    }
    out
}
