use lotegen_config::ConfigError;
use lotegen_engine::EngineError;
use lotegen_io::IoError;

use crate::exit_codes::{
    config_exit_code, engine_exit_code, io_exit_code, EXIT_DIAGNOSTICS, EXIT_ERROR, EXIT_USAGE,
};

/// Error surfaced to the shell: message on stderr, optional hint, exit code.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn diagnostics(count: usize) -> Self {
        Self {
            code: EXIT_DIAGNOSTICS,
            message: format!("{count} diagnostic(s) reported"),
            hint: Some("check the column names, or drop --strict".to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        let hint = match &err {
            EngineError::HeaderNotFound { .. } => {
                Some("pass --process-column with the exact header label".to_string())
            }
            EngineError::HeaderRowOutOfBounds { .. } => None,
        };
        Self { code: engine_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::TemplateUnreadable { .. } => {
                Some("pass --template or set `template` in settings.toml".to_string())
            }
            IoError::WriteFailure { .. } => {
                Some("is the file open in another program?".to_string())
            }
            IoError::BatchUnreadable { .. } => None,
        };
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self { code: config_exit_code(&err), message: err.to_string(), hint: None }
    }
}
