// generate: batch + template -> one filled copy of the template per event

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use lotegen_config::Settings;
use lotegen_engine::assemble::DATE_FORMAT;
use lotegen_engine::{
    materialize, Assembler, Diagnostic, Event, HeaderLocation, OutputColumn,
};
use lotegen_io::{output_path, read_batch, read_template, template_dir, write_output, IoError};

use crate::error::CliError;

/// Column texts typed by the operator. Each flag overrides `[columns]` in
/// settings.toml.
#[derive(Args, Debug, Default, Clone)]
pub struct ColumnArgs {
    /// Header text of the process column; also anchors header detection
    #[arg(long, value_name = "TEXT")]
    pub process_column: Option<String>,

    /// Batch column holding the HC30% amounts
    #[arg(long, value_name = "TEXT")]
    pub hc30: Option<String>,

    /// Batch column holding the HCP amounts
    #[arg(long, value_name = "TEXT")]
    pub hcp: Option<String>,

    /// Batch column holding the CALCS amounts
    #[arg(long, value_name = "TEXT")]
    pub calcs: Option<String>,

    /// Batch column holding the HSP amounts
    #[arg(long, value_name = "TEXT")]
    pub hsp: Option<String>,

    /// Batch column holding the CALCP amounts
    #[arg(long, value_name = "TEXT")]
    pub calcp: Option<String>,
}

impl ColumnArgs {
    fn event(&self, event: Event) -> Option<&String> {
        match event {
            Event::Hc30 => self.hc30.as_ref(),
            Event::Hcp => self.hcp.as_ref(),
            Event::Calcs => self.calcs.as_ref(),
            Event::Hsp => self.hsp.as_ref(),
            Event::Calcp => self.calcp.as_ref(),
        }
    }

    /// Copy the given flags into `settings`. Blank values are usage errors.
    pub fn apply(&self, settings: &mut Settings) -> Result<(), CliError> {
        if let Some(text) = &self.process_column {
            settings.columns.process = non_blank("--process-column", text)?;
        }
        for event in Event::ALL {
            if let Some(text) = self.event(event) {
                let flag = format!("--{}", flag_name(event));
                *settings.columns.event_mut(event) = non_blank(&flag, text)?;
            }
        }
        Ok(())
    }
}

fn flag_name(event: Event) -> &'static str {
    match event {
        Event::Hc30 => "hc30",
        Event::Hcp => "hcp",
        Event::Calcs => "calcs",
        Event::Hsp => "hsp",
        Event::Calcp => "calcp",
    }
}

pub(crate) fn non_blank(flag: &str, text: &str) -> Result<String, CliError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CliError::usage(format!("{flag} must not be blank")));
    }
    Ok(trimmed.to_string())
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Batch spreadsheet (xlsx, xls, xlsb, ods, csv, tsv)
    pub batch: PathBuf,

    /// Template whose first row defines the output columns
    #[arg(long, short = 't', value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Where outputs are written (default: the template's directory)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Requester id written into SOLICITADO_POR
    #[arg(long, value_name = "ID")]
    pub requester: Option<String>,

    /// Date written into DATA, as DD/MM/YYYY (default: today)
    #[arg(long, value_name = "DD/MM/YYYY")]
    pub date: Option<String>,

    /// Settings file (default: <config dir>/lotegen/settings.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit 6 when any column was left empty
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub batch: PathBuf,
    pub template: PathBuf,
    pub header: HeaderLocation,
    pub source_rows: usize,
    pub source_columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<String>,
    pub outputs: Vec<OutputReport>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<FailedWrite>,
}

#[derive(Debug, Serialize)]
pub struct OutputReport {
    pub event: Event,
    pub path: PathBuf,
    pub rows: usize,
    /// Template columns copied from the batch, with how each was matched.
    pub bindings: Vec<OutputColumn>,
}

#[derive(Debug, Serialize)]
pub struct FailedWrite {
    pub event: Event,
    pub path: PathBuf,
    pub reason: String,
}

pub fn cmd_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut settings = Settings::load(args.config.as_deref())?;
    args.columns.apply(&mut settings)?;
    if let Some(template) = &args.template {
        settings.template = template.clone();
    }
    if let Some(requester) = &args.requester {
        settings.requester_id = non_blank("--requester", requester)?;
    }
    let today = match &args.date {
        Some(text) => NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| {
            CliError::usage(format!("invalid --date '{text}'")).with_hint("use DD/MM/YYYY")
        })?,
        None => chrono::Local::now().date_naive(),
    };

    let template = read_template(&settings.template)?;
    let matrix = read_batch(&args.batch)?;
    let header = settings.header_locator().locate(&matrix)?;
    let source = materialize(&matrix, header.row)?;
    tracing::info!(
        row = header.row,
        strategy = header.located_by.as_str(),
        rows = source.row_count(),
        columns = source.columns().len(),
        "batch materialized"
    );

    let mapping = settings.field_mapping();
    let assembler = Assembler::new(&source, &template, &mapping, today)
        .with_resolver(settings.column_resolver());

    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| template_dir(&settings.template));

    let mut report = RunReport {
        batch: args.batch.clone(),
        template: settings.template.clone(),
        header,
        source_rows: source.row_count(),
        source_columns: source.columns().to_vec(),
        collisions: source.collisions().to_vec(),
        outputs: Vec::new(),
        diagnostics: Vec::new(),
        failed: None,
    };

    let mut write_error = None;
    if let Err(err) = std::fs::create_dir_all(&out_dir) {
        write_error = Some(IoError::WriteFailure { path: out_dir.clone(), reason: err.to_string() });
    }

    if write_error.is_none() {
        for assembled in assembler.assemble_all() {
            let event = assembled.table.event;
            report.diagnostics.extend(assembled.diagnostics);

            let path = output_path(&out_dir, event);
            match write_output(&assembled.table, &path) {
                Ok(result) => {
                    tracing::info!(
                        event = event.id(),
                        path = %path.display(),
                        rows = result.rows_exported,
                        cells = result.cells_exported,
                        elapsed_ms = result.export_duration_ms as u64,
                        "output written"
                    );
                    report.outputs.push(OutputReport {
                        event,
                        path,
                        rows: assembled.table.row_count,
                        bindings: assembled
                            .table
                            .columns
                            .into_iter()
                            .filter(|c| c.binding.is_some())
                            .collect(),
                    });
                }
                Err(err) => {
                    report.failed = Some(FailedWrite {
                        event,
                        path: err.path().to_path_buf(),
                        reason: err.to_string(),
                    });
                    write_error = Some(err);
                    break;
                }
            }
        }
    }

    print_report(&report, args.json)?;

    if let Some(err) = write_error {
        return Err(err.into());
    }
    if args.strict && !report.diagnostics.is_empty() {
        return Err(CliError::diagnostics(report.diagnostics.len()));
    }
    Ok(())
}

fn print_report(report: &RunReport, json: bool) -> Result<(), CliError> {
    if json {
        let text = serde_json::to_string_pretty(report)
            .map_err(|e| CliError::general(format!("failed to serialize report: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", render_text(report));
    }
    Ok(())
}

fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "batch:     {}", report.batch.display());
    let _ = writeln!(out, "template:  {}", report.template.display());
    let _ = writeln!(
        out,
        "header:    row {} ({}), {} data rows, {} columns",
        report.header.row + 1,
        report.header.located_by.as_str(),
        report.source_rows,
        report.source_columns.len()
    );
    for name in &report.collisions {
        let _ = writeln!(out, "collision: several columns normalize like '{name}'; the last one is used");
    }

    for output in &report.outputs {
        let _ = writeln!(out, "{:<6}  {} rows  {}", output.event.id(), output.rows, output.path.display());
        for column in &output.bindings {
            if let Some(binding) = &column.binding {
                let _ = writeln!(
                    out,
                    "          {} <- '{}' ({})",
                    column.name,
                    binding.column,
                    binding.stage.as_str()
                );
            }
        }
    }

    if !report.diagnostics.is_empty() {
        let _ = writeln!(out, "diagnostics:");
        for d in &report.diagnostics {
            let _ = writeln!(out, "  {d}");
        }
    }
    if let Some(failed) = &report.failed {
        let _ = writeln!(out, "failed:    {} ({})", failed.path.display(), failed.reason);
    }
    let _ = writeln!(out, "wrote {} of {} file(s)", report.outputs.len(), Event::ALL.len());
    out
}
