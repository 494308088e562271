// Excel batch/template import (xlsx, xls, xlsb, ods) and output export (xlsx only)
//
// Import: first worksheet as a raw headerless matrix. Absolute sheet row
//         indices are kept when the used range does not start at A1.
// Export: one template-shaped table per file, bold header row.

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use lotegen_engine::assemble::OutputTable;
use lotegen_engine::{CellValue, RawMatrix, TemplateColumns};

/// Number format applied to date cells carried through from the batch.
const DATE_NUM_FORMAT: &str = "dd/mm/yyyy";

/// Read the first worksheet of an Excel file as a raw matrix.
pub fn import(path: &Path) -> Result<RawMatrix, String> {
    let start_time = Instant::now();
    let range = first_sheet_range(path)?;

    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "excel sheet imported"
    );
    Ok(RawMatrix::new(rows))
}

/// Read the template's header row: the first row of the first worksheet's
/// used range. Trailing blank headers are dropped; interior blanks become
/// `Unnamed: {col}`.
pub fn import_template(path: &Path) -> Result<TemplateColumns, String> {
    let range = first_sheet_range(path)?;
    let start_col = range.start().map(|(_, c)| c as usize).unwrap_or(0);

    let header: Vec<CellValue> = range
        .rows()
        .next()
        .map(|row| row.iter().map(convert_cell).collect())
        .unwrap_or_default();

    template_from_header_cells(&header, start_col)
}

pub(crate) fn template_from_header_cells(
    header: &[CellValue],
    start_col: usize,
) -> Result<TemplateColumns, String> {
    let last = header
        .iter()
        .rposition(|c| !c.is_missing())
        .ok_or_else(|| "template has no header row".to_string())?;

    Ok(TemplateColumns::new(header[..=last].iter().enumerate().map(|(i, cell)| {
        if cell.is_missing() {
            format!("Unnamed: {}", start_col + i)
        } else {
            cell.raw_display()
        }
    })))
}

fn first_sheet_range(path: &Path) -> Result<Range<Data>, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_input(s),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Store error as text representation
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // Serial kept as-is (1900 date system assumed)
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_input(s),
    }
}

/// Result of an export operation
#[derive(Debug, Default, Clone)]
pub struct ExportResult {
    pub rows_exported: usize,
    pub cells_exported: usize,
    pub export_duration_ms: u128,
}

/// Write one output table as an xlsx file.
///
/// Column order follows the table (i.e. the template). Empty cells are left
/// unwritten so they read back as blanks.
pub fn export(table: &OutputTable, path: &Path) -> Result<ExportResult, String> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();

    let mut xlsx_workbook = XlsxWorkbook::new();
    let worksheet = xlsx_workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);

    for (col_idx, column) in table.columns.iter().enumerate() {
        let col = u16::try_from(col_idx).map_err(|_| "too many columns for xlsx".to_string())?;
        worksheet
            .write_string_with_format(0, col, &column.name, &header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", column.name, e))?;

        for (row_idx, value) in column.values.iter().enumerate() {
            let row = u32::try_from(row_idx + 1).map_err(|_| "too many rows for xlsx".to_string())?;
            let written = match value {
                CellValue::Empty => continue,
                CellValue::Text(s) if s.is_empty() => continue,
                CellValue::Text(s) => worksheet.write_string(row, col, s),
                CellValue::Number(n) => worksheet.write_number(row, col, *n),
                CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
                CellValue::DateTime(serial) => {
                    worksheet.write_number_with_format(row, col, *serial, &date_format)
                }
            };
            written.map_err(|e| {
                format!("Failed to write {} at row {}: {}", column.name, row_idx + 1, e)
            })?;
            result.cells_exported += 1;
        }
    }
    result.rows_exported = table.row_count;

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    #[test]
    fn template_header_drops_trailing_blanks() {
        let cells = [text("PROCESSO"), CellValue::Empty, text("EVENTO"), CellValue::Empty];
        let t = template_from_header_cells(&cells, 0).unwrap();
        assert_eq!(t.names(), ["PROCESSO", "Unnamed: 1", "EVENTO"]);
    }

    #[test]
    fn template_without_header_is_rejected() {
        let err = template_from_header_cells(&[CellValue::Empty], 0).unwrap_err();
        assert_eq!(err, "template has no header row");
    }

    #[test]
    fn converts_calamine_cells() {
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(convert_cell(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Bool(true));
    }
}
