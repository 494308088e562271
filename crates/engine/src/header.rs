// Header row discovery for semi-structured batch sheets.
//
// Batch files carry title rows, merged banners and blank spacers above the
// real header. Two strategies run in order: anchor on the process-column
// label, then fall back to the first row that is dense enough.

use serde::Serialize;

use crate::error::EngineError;
use crate::matrix::RawMatrix;
use crate::normalize::{normalize, normalize_value};

/// Label searched for when the caller supplies none.
pub const DEFAULT_PROCESS_LABEL: &str = "Número do Processo";

/// Minimum non-missing cells for the density fallback.
pub const DEFAULT_MIN_FILLED_CELLS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatedBy {
    LabelAnchor,
    Density,
}

impl LocatedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocatedBy::LabelAnchor => "label_anchor",
            LocatedBy::Density => "density",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderStrategy {
    /// First row holding a cell whose comparison key equals `target`.
    LabelAnchor { target: String },
    /// First row with at least `min_filled` non-missing cells.
    Density { min_filled: usize },
}

impl HeaderStrategy {
    /// Anchor on `label`, or on [`DEFAULT_PROCESS_LABEL`] when blank.
    pub fn label_anchor(label: Option<&str>) -> Self {
        let label = label
            .filter(|l| !normalize(l).is_empty())
            .unwrap_or(DEFAULT_PROCESS_LABEL);
        HeaderStrategy::LabelAnchor { target: normalize(label) }
    }

    pub fn kind(&self) -> LocatedBy {
        match self {
            HeaderStrategy::LabelAnchor { .. } => LocatedBy::LabelAnchor,
            HeaderStrategy::Density { .. } => LocatedBy::Density,
        }
    }

    pub fn try_locate(&self, matrix: &RawMatrix) -> Option<usize> {
        match self {
            HeaderStrategy::LabelAnchor { target } => matrix
                .rows()
                .position(|row| row.iter().any(|cell| normalize_value(cell) == *target)),
            HeaderStrategy::Density { min_filled } => {
                (0..matrix.len()).find(|&r| matrix.filled_count(r) >= *min_filled)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderLocation {
    pub row: usize,
    pub located_by: LocatedBy,
}

/// Ordered header strategies; the first one that finds a row wins.
#[derive(Debug, Clone)]
pub struct HeaderLocator {
    strategies: Vec<HeaderStrategy>,
}

impl HeaderLocator {
    pub fn new(expected_label: Option<&str>) -> Self {
        Self {
            strategies: vec![
                HeaderStrategy::label_anchor(expected_label),
                HeaderStrategy::Density { min_filled: DEFAULT_MIN_FILLED_CELLS },
            ],
        }
    }

    pub fn with_min_filled(mut self, min_filled: usize) -> Self {
        for strategy in &mut self.strategies {
            if let HeaderStrategy::Density { min_filled: n } = strategy {
                *n = min_filled;
            }
        }
        self
    }

    pub fn locate(&self, matrix: &RawMatrix) -> Result<HeaderLocation, EngineError> {
        for strategy in &self.strategies {
            if let Some(row) = strategy.try_locate(matrix) {
                tracing::debug!(row, strategy = strategy.kind().as_str(), "header row located");
                return Ok(HeaderLocation { row, located_by: strategy.kind() });
            }
        }

        let target = self
            .strategies
            .iter()
            .find_map(|s| match s {
                HeaderStrategy::LabelAnchor { target } => Some(target.clone()),
                HeaderStrategy::Density { .. } => None,
            })
            .unwrap_or_default();
        Err(EngineError::HeaderNotFound { target, rows_scanned: matrix.len() })
    }
}

/// Row index of the header, anchored on `expected_label`.
pub fn locate_header_row(
    matrix: &RawMatrix,
    expected_label: Option<&str>,
) -> Result<usize, EngineError> {
    HeaderLocator::new(expected_label).locate(matrix).map(|loc| loc.row)
}
