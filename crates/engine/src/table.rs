use crate::cell::CellValue;
use crate::error::EngineError;
use crate::matrix::RawMatrix;
use crate::normalize::light_value;

/// Structured batch data below the located header row.
///
/// Column names are unique and keep sheet order. Every row holds exactly one
/// value per column. Read-only once materialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    collisions: Vec<String>,
}

impl SourceTable {
    /// Build directly from named columns and row-major data.
    /// Rows are padded or truncated to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, CellValue::Empty);
                r
            })
            .collect();
        Self { columns, rows, collisions: Vec::new() }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Header names that appeared more than once; the last column kept its data.
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].clone()).collect())
    }
}

/// Slice `matrix` below `header_row` into a [`SourceTable`].
///
/// Columns whose data cells are all missing are dropped first, then rows that
/// are missing in every surviving column. Blank header cells over live data
/// become `Unnamed: {col}`.
pub fn materialize(matrix: &RawMatrix, header_row: usize) -> Result<SourceTable, EngineError> {
    if header_row >= matrix.len() {
        return Err(EngineError::HeaderRowOutOfBounds { row: header_row, rows: matrix.len() });
    }

    let width = matrix.width();
    let data_rows = header_row + 1..matrix.len();

    let live_cols: Vec<usize> = (0..width)
        .filter(|&c| data_rows.clone().any(|r| !matrix.cell(r, c).is_missing()))
        .collect();

    let mut columns: Vec<String> = Vec::with_capacity(live_cols.len());
    // Source column feeding each output position; a later duplicate replaces the feed.
    let mut sources: Vec<usize> = Vec::with_capacity(live_cols.len());
    let mut collisions = Vec::new();

    for &c in &live_cols {
        let mut name = light_value(matrix.cell(header_row, c));
        if name.is_empty() {
            name = format!("Unnamed: {c}");
        }
        match columns.iter().position(|existing| *existing == name) {
            Some(pos) => {
                tracing::warn!(column = %name, "duplicate header; keeping the last column's data");
                sources[pos] = c;
                if !collisions.contains(&name) {
                    collisions.push(name);
                }
            }
            None => {
                columns.push(name);
                sources.push(c);
            }
        }
    }

    let rows: Vec<Vec<CellValue>> = data_rows
        .map(|r| sources.iter().map(|&c| matrix.cell(r, c).clone()).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|v| !v.is_missing()))
        .collect();

    tracing::debug!(
        header_row,
        columns = columns.len(),
        rows = rows.len(),
        "materialized source table"
    );

    Ok(SourceTable { columns, rows, collisions })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    #[test]
    fn drops_empty_columns_and_rows() {
        let m = RawMatrix::from_text_rows(&[
            vec!["Título"],
            vec!["Número do  Processo", "Vazia", "Valor"],
            vec!["001", "", "10"],
            vec!["", "", ""],
            vec!["002", "", ""],
        ]);
        let t = materialize(&m, 1).unwrap();
        assert_eq!(t.columns(), ["Número do Processo", "Valor"]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.rows()[1], [text("002"), CellValue::Empty]);
    }

    #[test]
    fn header_only_column_is_dropped() {
        let m = RawMatrix::from_text_rows(&[vec!["A", "B"], vec!["1", ""]]);
        let t = materialize(&m, 0).unwrap();
        assert_eq!(t.columns(), ["A"]);
    }

    #[test]
    fn blank_header_over_data_gets_placeholder_name() {
        let m = RawMatrix::from_text_rows(&[vec!["A", "", "C"], vec!["1", "2", "3"]]);
        let t = materialize(&m, 0).unwrap();
        assert_eq!(t.columns(), ["A", "Unnamed: 1", "C"]);
    }

    #[test]
    fn numeric_headers_become_text_names() {
        let m = RawMatrix::new(vec![
            vec![CellValue::Number(2025.0), text("Nome")],
            vec![text("x"), text("y")],
        ]);
        let t = materialize(&m, 0).unwrap();
        assert_eq!(t.columns(), ["2025", "Nome"]);
    }

    #[test]
    fn duplicate_headers_keep_last_data() {
        let m = RawMatrix::from_text_rows(&[
            vec!["Valor", "Nome", "Valor\u{00A0}"],
            vec!["first", "n", "second"],
        ]);
        let t = materialize(&m, 0).unwrap();
        assert_eq!(t.columns(), ["Valor", "Nome"]);
        assert_eq!(t.column_values("Valor"), Some(vec![text("second")]));
        assert_eq!(t.collisions(), ["Valor"]);
    }

    #[test]
    fn header_past_end_is_rejected() {
        let m = RawMatrix::from_text_rows(&[vec!["A"]]);
        assert_eq!(
            materialize(&m, 3),
            Err(EngineError::HeaderRowOutOfBounds { row: 3, rows: 1 })
        );
    }

    #[test]
    fn header_on_last_row_yields_empty_table() {
        let m = RawMatrix::from_text_rows(&[vec!["A", "B", "C"]]);
        let t = materialize(&m, 0).unwrap();
        assert!(t.columns().is_empty());
        assert_eq!(t.row_count(), 0);
    }

    #[test]
    fn column_values_follow_row_order() {
        let t = SourceTable::new(
            vec!["A".into(), "B".into()],
            vec![vec![text("1")], vec![text("2"), text("b")]],
        );
        assert_eq!(t.column_values("A"), Some(vec![text("1"), text("2")]));
        assert_eq!(t.column_values("B"), Some(vec![CellValue::Empty, text("b")]));
        assert_eq!(t.column_values("Z"), None);
    }
}
