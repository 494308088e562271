// Text normalization for header matching.
// Comparison keys are folded hard; stored column names only get the light pass.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::cell::CellValue;

/// Characters treated as non-breaking spaces.
const NBSP_CHARS: [char; 3] = ['\u{00A0}', '\u{2007}', '\u{202F}'];

/// Light normalization: NBSP replaced, whitespace collapsed and trimmed.
/// Case and accents are preserved so the result stays human-readable.
pub fn light(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if NBSP_CHARS.contains(&c) { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full comparison key: light pass, then canonical decomposition with
/// combining marks dropped, then lowercase.
pub fn normalize(text: &str) -> String {
    let collapsed = light(text);
    collapsed
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        // to_lowercase can emit a combining mark (e.g. U+0130)
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Full comparison key for any cell value. Missing cells yield "".
pub fn normalize_value(value: &CellValue) -> String {
    if value.is_missing() {
        return String::new();
    }
    normalize(&value.raw_display())
}

/// Light normalization for any cell value. Missing cells yield "".
pub fn light_value(value: &CellValue) -> String {
    if value.is_missing() {
        return String::new();
    }
    light(&value.raw_display())
}

/// NBSP replaced and trimmed, interior whitespace untouched.
pub(crate) fn loose(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if NBSP_CHARS.contains(&c) { ' ' } else { c })
        .collect();
    replaced.trim().to_string()
}
