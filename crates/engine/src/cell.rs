use serde::Serialize;

/// A raw cell value as read from a batch or template sheet.
///
/// Dates keep their spreadsheet serial so the writer can re-emit them with a
/// date number format instead of a plain number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(f64),
}

impl CellValue {
    pub fn from_input(input: &str) -> Self {
        if input.is_empty() {
            return CellValue::Empty;
        }
        CellValue::Text(input.to_string())
    }

    /// Missing cells: explicit blanks and zero-length text.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Canonical text form used for header matching and column naming.
    pub fn raw_display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) | CellValue::DateTime(n) => format_number(*n),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

/// Integers without decimals, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_display())
    }
}
