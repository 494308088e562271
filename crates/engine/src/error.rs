use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Neither the label anchor nor the density fallback found a header row.
    HeaderNotFound { target: String, rows_scanned: usize },
    /// A header row index outside the matrix was handed to the materializer.
    HeaderRowOutOfBounds { row: usize, rows: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderNotFound { target, rows_scanned } => write!(
                f,
                "could not locate the header row: no cell equals '{target}' and no row \
                 is dense enough ({rows_scanned} rows scanned)"
            ),
            Self::HeaderRowOutOfBounds { row, rows } => {
                write!(f, "header row {row} is outside the sheet ({rows} rows)")
            }
        }
    }
}

impl std::error::Error for EngineError {}
