// File I/O: batch and template readers, output writer

pub mod csv;
pub mod error;
pub mod xlsx;

use std::path::{Path, PathBuf};

use lotegen_engine::assemble::OutputTable;
use lotegen_engine::{Event, RawMatrix, TemplateColumns};

pub use error::IoError;

/// Batch formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    Excel,
    Csv,
    Tsv,
}

impl BatchFormat {
    /// Unknown extensions are handed to calamine, which sniffs the container.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") | Some("txt") => BatchFormat::Csv,
            Some("tsv") | Some("tab") => BatchFormat::Tsv,
            _ => BatchFormat::Excel,
        }
    }
}

/// Read a batch file as a raw headerless matrix.
pub fn read_batch(path: &Path) -> Result<RawMatrix, IoError> {
    let result = match BatchFormat::from_path(path) {
        BatchFormat::Excel => xlsx::import(path),
        BatchFormat::Csv => csv::import(path),
        BatchFormat::Tsv => csv::import_tsv(path),
    };
    result.map_err(|reason| IoError::BatchUnreadable { path: path.to_path_buf(), reason })
}

/// Read the template's ordered column names.
pub fn read_template(path: &Path) -> Result<TemplateColumns, IoError> {
    xlsx::import_template(path)
        .map_err(|reason| IoError::TemplateUnreadable { path: path.to_path_buf(), reason })
}

/// Output file name for one event.
pub fn output_file_name(event: Event) -> String {
    format!("1 Cópia de modelo rb 03 - {} preenchido.xlsx", event.id())
}

/// Where an event's output lands: next to the template unless overridden.
pub fn output_path(dir: &Path, event: Event) -> PathBuf {
    dir.join(output_file_name(event))
}

/// Directory holding `template`; `.` for a bare file name.
pub fn template_dir(template: &Path) -> PathBuf {
    match template.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Write one output table, replacing any existing file.
pub fn write_output(table: &OutputTable, path: &Path) -> Result<xlsx::ExportResult, IoError> {
    xlsx::export(table, path)
        .map_err(|reason| IoError::WriteFailure { path: path.to_path_buf(), reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(BatchFormat::from_path(Path::new("lote.XLSX")), BatchFormat::Excel);
        assert_eq!(BatchFormat::from_path(Path::new("lote.csv")), BatchFormat::Csv);
        assert_eq!(BatchFormat::from_path(Path::new("lote.tsv")), BatchFormat::Tsv);
        assert_eq!(BatchFormat::from_path(Path::new("lote")), BatchFormat::Excel);
    }

    #[test]
    fn output_names_embed_event_id() {
        assert_eq!(
            output_file_name(Event::Hc30),
            "1 Cópia de modelo rb 03 - HC30% preenchido.xlsx"
        );
        let p = output_path(Path::new("/tmp/modelos"), Event::Calcp);
        assert!(p.ends_with("1 Cópia de modelo rb 03 - CALCP preenchido.xlsx"));
    }

    #[test]
    fn bare_template_name_lives_in_cwd() {
        assert_eq!(template_dir(Path::new("testesLotes.xlsx")), PathBuf::from("."));
        assert_eq!(template_dir(Path::new("a/b/t.xlsx")), PathBuf::from("a/b"));
    }

    #[test]
    fn missing_batch_is_unreadable() {
        let err = read_batch(Path::new("/nonexistent/lote.xlsx")).unwrap_err();
        assert!(matches!(err, IoError::BatchUnreadable { .. }));
        assert_eq!(err.path(), Path::new("/nonexistent/lote.xlsx"));
        assert!(err.to_string().starts_with("cannot read batch file"));
    }
}
