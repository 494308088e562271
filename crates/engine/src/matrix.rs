use crate::cell::CellValue;

/// Headerless cell grid exactly as read from the first worksheet.
/// Rows may be ragged; cells past the end of a row read as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMatrix {
    rows: Vec<Vec<CellValue>>,
}

static MISSING: CellValue = CellValue::Empty;

impl RawMatrix {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Build a matrix from string literals; "" becomes a missing cell.
    pub fn from_text_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self::new(
            rows.iter()
                .map(|r| r.iter().map(|s| CellValue::from_input(s.as_ref())).collect())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&MISSING)
    }

    /// Number of non-missing cells in a row.
    pub fn filled_count(&self, row: usize) -> usize {
        self.row(row)
            .map(|r| r.iter().filter(|c| !c.is_missing()).count())
            .unwrap_or(0)
    }
}
