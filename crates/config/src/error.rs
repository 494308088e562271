use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Settings file exists but could not be read.
    Read { path: PathBuf, reason: String },
    /// TOML parse / deserialization error.
    Parse(String),
    /// A value is out of range.
    Validation(String),
    /// `config init` refused to overwrite, or failed to write.
    Write { path: PathBuf, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, reason } => {
                write!(f, "cannot read settings {}: {reason}", path.display())
            }
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Validation(msg) => write!(f, "settings validation error: {msg}"),
            Self::Write { path, reason } => {
                write!(f, "cannot write settings {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
