// Column resolution: free-text column name -> actual batch column.
//
// Stages run in a fixed order and the first one that matches wins. Every stage
// is a pure function of the candidate and the column list.

use std::collections::HashMap;

use serde::Serialize;

use crate::normalize::{loose, normalize};
use crate::table::SourceTable;

/// Minimum similarity accepted by the fuzzy stage.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// Byte-for-byte equality.
    Exact,
    /// NBSP replaced, trimmed, case-insensitive.
    Loose,
    /// Equality of full comparison keys.
    Normalized,
    /// Closest comparison key by similarity ratio.
    Fuzzy,
    /// Comparison key containment in either direction.
    Substring,
}

/// Stage order used by [`ColumnResolver`].
pub const CASCADE: [MatchStage; 5] = [
    MatchStage::Exact,
    MatchStage::Loose,
    MatchStage::Normalized,
    MatchStage::Fuzzy,
    MatchStage::Substring,
];

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Exact => "exact",
            MatchStage::Loose => "loose",
            MatchStage::Normalized => "normalized",
            MatchStage::Fuzzy => "fuzzy",
            MatchStage::Substring => "substring",
        }
    }

    /// Index into `columns` of the match, with the similarity score for fuzzy hits.
    pub fn try_match(
        &self,
        candidate: &str,
        columns: &[String],
        fuzzy_threshold: f64,
    ) -> Option<(usize, Option<f64>)> {
        match self {
            MatchStage::Exact => columns.iter().position(|c| c == candidate).map(|i| (i, None)),
            MatchStage::Loose => {
                let want = loose(candidate).to_lowercase();
                columns
                    .iter()
                    .position(|c| loose(c).to_lowercase() == want)
                    .map(|i| (i, None))
            }
            MatchStage::Normalized => {
                let mut by_key: HashMap<String, usize> = HashMap::new();
                for (i, c) in columns.iter().enumerate() {
                    // later columns overwrite earlier ones with the same key
                    by_key.insert(normalize(c), i);
                }
                by_key.get(&normalize(candidate)).map(|&i| (i, None))
            }
            MatchStage::Fuzzy => closest(candidate, columns)
                .filter(|&(_, score)| score >= fuzzy_threshold)
                .map(|(i, score)| (i, Some(score))),
            MatchStage::Substring => {
                let want = normalize(candidate);
                columns
                    .iter()
                    .position(|c| {
                        let key = normalize(c);
                        !key.is_empty() && (key.contains(&want) || want.contains(&key))
                    })
                    .map(|i| (i, None))
            }
        }
    }
}

/// Similarity ratio in [0, 1] between two comparison keys.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Closest column by similarity of comparison keys; ties go to the earlier column.
pub fn closest(candidate: &str, columns: &[String]) -> Option<(usize, f64)> {
    let want = normalize(candidate);
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in columns.iter().enumerate() {
        let score = similarity(&want, &normalize(c));
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub column: String,
    pub stage: MatchStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnResolver {
    fuzzy_threshold: f64,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self { fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD }
    }
}

impl ColumnResolver {
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Run the cascade against `columns`. A blank candidate never matches.
    pub fn resolve_columns(&self, columns: &[String], candidate: &str) -> Option<Resolution> {
        if normalize(candidate).is_empty() {
            return None;
        }
        CASCADE.iter().find_map(|stage| {
            stage
                .try_match(candidate, columns, self.fuzzy_threshold)
                .map(|(i, score)| Resolution { column: columns[i].clone(), stage: *stage, score })
        })
    }

    pub fn resolve(&self, table: &SourceTable, candidate: &str) -> Option<Resolution> {
        let resolution = self.resolve_columns(table.columns(), candidate);
        match &resolution {
            Some(r) => tracing::debug!(
                candidate,
                column = %r.column,
                stage = r.stage.as_str(),
                "column resolved"
            ),
            None => tracing::debug!(candidate, "column not resolved"),
        }
        resolution
    }
}

/// Best-matching column name for `candidate`, or `None`.
pub fn resolve<'t>(table: &'t SourceTable, candidate: &str) -> Option<&'t str> {
    let r = ColumnResolver::default().resolve_columns(table.columns(), candidate)?;
    table.columns().iter().find(|c| **c == r.column).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn stage_of(columns: &[String], candidate: &str) -> Option<(String, MatchStage)> {
        ColumnResolver::default()
            .resolve_columns(columns, candidate)
            .map(|r| (r.column, r.stage))
    }

    #[test]
    fn exact_wins_over_noisier_fuzzy_match() {
        let c = cols(&["Contratual - 30%x", "Contratual - 30%"]);
        assert_eq!(
            stage_of(&c, "Contratual - 30%"),
            Some(("Contratual - 30%".into(), MatchStage::Exact))
        );
    }

    #[test]
    fn loose_trims_nbsp_and_ignores_case() {
        let c = cols(&["Contratual CHM"]);
        assert_eq!(
            stage_of(&c, "\u{00A0}contratual chm "),
            Some(("Contratual CHM".into(), MatchStage::Loose))
        );
    }

    #[test]
    fn normalized_folds_accents_and_inner_spacing() {
        let c = cols(&["Sucumb.  Preço"]);
        assert_eq!(
            stage_of(&c, "sucumb. preco"),
            Some(("Sucumb.  Preço".into(), MatchStage::Normalized))
        );
    }

    #[test]
    fn normalized_collision_keeps_last_column() {
        let c = cols(&["Ação", "Acao "]);
        assert_eq!(stage_of(&c, "AÇÃO ").map(|(_, s)| s), Some(MatchStage::Loose));
        assert_eq!(
            stage_of(&c, "acão"),
            Some(("Acao ".into(), MatchStage::Normalized))
        );
    }

    #[test]
    fn fuzzy_accepts_at_threshold() {
        // 10 chars, 2 substitutions: similarity 0.8
        let c = cols(&["abcdefghij"]);
        let r = ColumnResolver::default().resolve_columns(&c, "abcdefghXY").unwrap();
        assert_eq!(r.stage, MatchStage::Fuzzy);
        assert!((r.score.unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn fuzzy_rejects_just_below_threshold() {
        // 19 chars, 4 substitutions: similarity ~0.789
        let c = cols(&["abcdefghijklmnopqrs"]);
        assert!(similarity("abcdefghijklmnopqrs", "abcdefghijklmnowxyz") < 0.8);
        assert_eq!(stage_of(&c, "abcdefghijklmnoWXYZ"), None);
    }

    #[test]
    fn fuzzy_accepts_twenty_chars_four_edits() {
        let c = cols(&["abcdefghijklmnopqrst"]);
        assert_eq!(
            stage_of(&c, "abcdefghijklmnopWXYZ").map(|(_, s)| s),
            Some(MatchStage::Fuzzy)
        );
    }

    #[test]
    fn fuzzy_picks_closest_and_breaks_ties_by_order() {
        let c = cols(&["Agosto.2025 - PRINCIPAL", "Agosto.2025 - SUCUMBENCIA"]);
        assert_eq!(
            stage_of(&c, "Agosto.2025 - SUCUMBENCIAS"),
            Some(("Agosto.2025 - SUCUMBENCIA".into(), MatchStage::Fuzzy))
        );

        let tied = cols(&["abcdx", "abcdy"]);
        assert_eq!(closest("abcdz", &tied).map(|(i, _)| i), Some(0));
    }

    #[test]
    fn substring_matches_either_direction() {
        let c = cols(&["Autor", "Valor Contratual CHM Atualizado"]);
        assert_eq!(
            stage_of(&c, "contratual chm"),
            Some(("Valor Contratual CHM Atualizado".into(), MatchStage::Substring))
        );

        let c = cols(&["Processo"]);
        assert_eq!(
            stage_of(&c, "Número do Processo Judicial"),
            Some(("Processo".into(), MatchStage::Substring))
        );
    }

    #[test]
    fn no_relationship_returns_none() {
        let c = cols(&["Autor", "Réu", "Comarca"]);
        assert_eq!(stage_of(&c, "Honorários Periciais"), None);
        assert_eq!(stage_of(&[], "Autor"), None);
    }

    #[test]
    fn blank_candidate_never_matches() {
        let c = cols(&["Autor", ""]);
        assert_eq!(stage_of(&c, ""), None);
        assert_eq!(stage_of(&c, " \u{00A0} "), None);
    }

    #[test]
    fn resolve_returns_table_column_name() {
        let table = SourceTable::new(cols(&["Número do Processo", "Valor"]), vec![]);
        assert_eq!(resolve(&table, "numero do processo"), Some("Número do Processo"));
        assert_eq!(resolve(&table, "zzz"), None);
    }
}
