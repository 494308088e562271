use std::fmt;
use std::path::PathBuf;

/// File-level failures. Each carries the offending path and the underlying
/// reader/writer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoError {
    BatchUnreadable { path: PathBuf, reason: String },
    TemplateUnreadable { path: PathBuf, reason: String },
    WriteFailure { path: PathBuf, reason: String },
}

impl IoError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            IoError::BatchUnreadable { path, .. }
            | IoError::TemplateUnreadable { path, .. }
            | IoError::WriteFailure { path, .. } => path,
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::BatchUnreadable { path, reason } => {
                write!(f, "cannot read batch file {}: {}", path.display(), reason)
            }
            IoError::TemplateUnreadable { path, reason } => {
                write!(f, "cannot read template {}: {}", path.display(), reason)
            }
            IoError::WriteFailure { path, reason } => {
                write!(f, "cannot write {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for IoError {}
