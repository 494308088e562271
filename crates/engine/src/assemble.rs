// Output assembly: one template-shaped table per event.
//
// Resolution problems never abort assembly. They leave the column empty and
// come back as diagnostics for the run's aggregate report.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::cell::CellValue;
use crate::event::{Event, FieldMapping, LogicalField};
use crate::resolver::{closest, ColumnResolver, Resolution};
use crate::table::SourceTable;
use crate::template::{ColumnRole, TemplateColumns};

/// Constant written into `RESULT`.
pub const STATUS_OK: &str = "OK";

/// Date layout written into `DATA`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No batch column matched the operator's text for a field.
    ColumnUnresolved {
        field: LogicalField,
        text: String,
        event: Event,
        fuzzy_threshold: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        closest: Option<(String, f64)>,
    },
    /// The operator gave no column text for this event.
    EventUnmapped { event: Event },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ColumnUnresolved { field, text, event, fuzzy_threshold, closest } => {
                write!(
                    f,
                    "{event}: {field} column '{text}' not found \
                     (tried exact, loose, normalized, fuzzy >= {fuzzy_threshold:.2}, substring)"
                )?;
                if let Some((name, score)) = closest {
                    write!(f, "; closest was '{name}' at {score:.2}")?;
                }
                Ok(())
            }
            Diagnostic::EventUnmapped { event } => {
                write!(f, "{event}: no EVENTO column given for this event; column left empty")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputColumn {
    pub name: String,
    pub role: ColumnRole,
    /// Source binding for `PROCESSO`/`EVENTO` columns that resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<Resolution>,
    #[serde(skip)]
    pub values: Vec<CellValue>,
}

impl OutputColumn {
    pub fn is_populated(&self) -> bool {
        self.values.iter().any(|v| !v.is_missing())
    }
}

/// One event's output, shaped exactly like the template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputTable {
    pub event: Event,
    pub row_count: usize,
    pub columns: Vec<OutputColumn>,
}

impl OutputTable {
    pub fn column(&self, name: &str) -> Option<&OutputColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn values(&self, name: &str) -> Option<&[CellValue]> {
        self.column(name).map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Row `i` across all columns, in template order.
    pub fn row(&self, i: usize) -> Option<Vec<&CellValue>> {
        if i >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[i]).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub table: OutputTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds output tables from one source table and one operator request.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    source: &'a SourceTable,
    template: &'a TemplateColumns,
    mapping: &'a FieldMapping,
    resolver: ColumnResolver,
    today: NaiveDate,
}

impl<'a> Assembler<'a> {
    pub fn new(
        source: &'a SourceTable,
        template: &'a TemplateColumns,
        mapping: &'a FieldMapping,
        today: NaiveDate,
    ) -> Self {
        Self { source, template, mapping, resolver: ColumnResolver::default(), today }
    }

    pub fn with_resolver(mut self, resolver: ColumnResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn assemble(&self, event: Event) -> Assembled {
        let n = self.source.row_count();
        let mut diagnostics = Vec::new();

        let mut process: Option<Option<Resolution>> = None;
        let mut amount: Option<Option<Resolution>> = None;

        let mut columns = Vec::with_capacity(self.template.len());
        for (name, role) in self.template.roles() {
            let mut binding = None;
            let values = match role {
                ColumnRole::Process => {
                    let text = self.mapping.process_column.as_str();
                    binding = process
                        .get_or_insert_with(|| {
                            self.bind(LogicalField::Process, text, event, &mut diagnostics)
                        })
                        .clone();
                    self.copy_or_empty(binding.as_ref())
                }
                ColumnRole::EventAmount => {
                    binding = amount
                        .get_or_insert_with(|| match self.mapping.event_column(event) {
                            Some(text) => {
                                self.bind(LogicalField::EventAmount, text, event, &mut diagnostics)
                            }
                            None => {
                                let d = Diagnostic::EventUnmapped { event };
                                tracing::warn!("{d}");
                                diagnostics.push(d);
                                None
                            }
                        })
                        .clone();
                    self.copy_or_empty(binding.as_ref())
                }
                ColumnRole::Date => {
                    fill(n, &self.today.format(DATE_FORMAT).to_string())
                }
                ColumnRole::Status => fill(n, STATUS_OK),
                ColumnRole::Requester => fill(n, &self.mapping.requester_id),
                ColumnRole::EventId => fill(n, event.id()),
                ColumnRole::Other => vec![CellValue::Empty; n],
            };
            columns.push(OutputColumn { name: name.to_string(), role, binding, values });
        }

        Assembled { table: OutputTable { event, row_count: n, columns }, diagnostics }
    }

    /// One output per event in [`Event::ALL`] order.
    pub fn assemble_all(&self) -> Vec<Assembled> {
        Event::ALL.iter().map(|&e| self.assemble(e)).collect()
    }

    fn bind(
        &self,
        field: LogicalField,
        text: &str,
        event: Event,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Resolution> {
        let resolution = self.resolver.resolve(self.source, text);
        if resolution.is_none() {
            let d = Diagnostic::ColumnUnresolved {
                field,
                text: text.to_string(),
                event,
                fuzzy_threshold: self.resolver.fuzzy_threshold(),
                closest: closest(text, self.source.columns())
                    .map(|(i, score)| (self.source.columns()[i].clone(), score)),
            };
            tracing::warn!("{d}");
            diagnostics.push(d);
        }
        resolution
    }

    fn copy_or_empty(&self, binding: Option<&Resolution>) -> Vec<CellValue> {
        binding
            .and_then(|r| self.source.column_values(&r.column))
            .unwrap_or_else(|| vec![CellValue::Empty; self.source.row_count()])
    }
}

fn fill(n: usize, text: &str) -> Vec<CellValue> {
    vec![CellValue::Text(text.to_string()); n]
}

/// Assemble the output for a single event with the default resolver.
pub fn assemble(
    source: &SourceTable,
    template: &TemplateColumns,
    mapping: &FieldMapping,
    event: Event,
    today: NaiveDate,
) -> Assembled {
    Assembler::new(source, template, mapping, today).assemble(event)
}
