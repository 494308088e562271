// CSV/TSV batch import

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use lotegen_engine::{CellValue, RawMatrix};

pub fn import(path: &Path) -> Result<RawMatrix, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<RawMatrix, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t')
}

/// Detect the most likely field delimiter from the first few non-blank lines.
///
/// Batch exports often open with a one-cell title line, so the winner is the
/// delimiter whose most frequent field count (>1) covers the most fields;
/// ties keep candidate order (tab, semicolon, comma, pipe).
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for &delim in candidates {
        let mut by_count: HashMap<usize, usize> = HashMap::new();
        for line in &sample_lines {
            let fields = csv::ReaderBuilder::new()
                .delimiter(delim)
                .has_headers(false)
                .flexible(true)
                .from_reader(line.as_bytes())
                .records()
                .next()
                .and_then(|r| r.ok())
                .map(|r| r.len())
                .unwrap_or(1);
            if fields > 1 {
                *by_count.entry(fields).or_default() += 1;
            }
        }

        // Score: lines sharing a field count * that field count
        let score = by_count.iter().map(|(fields, lines)| fields * lines).max().unwrap_or(0);
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    Ok(text.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(text))
}

// Fully blank lines are skipped by the csv reader; delimiter-only lines are kept.
fn import_from_string(content: &str, delimiter: u8) -> Result<RawMatrix, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(CellValue::from_input).collect());
    }

    Ok(RawMatrix::new(rows))
}
