//! CLI Exit Code Registry
//!
//! Single source of truth for `lotegen` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, blank column text)          |
//! | 3    | Header row not found in the batch                  |
//! | 4    | Batch, template or settings file unreadable        |
//! | 5    | Output file could not be written                   |
//! | 6    | Completed with diagnostics under `--strict`        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`'s conversions

use lotegen_config::ConfigError;
use lotegen_engine::EngineError;
use lotegen_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, blank column text.
pub const EXIT_USAGE: u8 = 2;

/// Neither the label anchor nor the density fallback found a header row.
pub const EXIT_HEADER_NOT_FOUND: u8 = 3;

/// Batch, template or settings file could not be read.
pub const EXIT_UNREADABLE: u8 = 4;

/// An output file could not be written. Files already written are kept.
pub const EXIT_WRITE_FAILURE: u8 = 5;

/// Run completed but left columns empty, and `--strict` was given.
pub const EXIT_DIAGNOSTICS: u8 = 6;

pub fn engine_exit_code(err: &EngineError) -> u8 {
    match err {
        EngineError::HeaderNotFound { .. } => EXIT_HEADER_NOT_FOUND,
        EngineError::HeaderRowOutOfBounds { .. } => EXIT_ERROR,
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::BatchUnreadable { .. } | IoError::TemplateUnreadable { .. } => EXIT_UNREADABLE,
        IoError::WriteFailure { .. } => EXIT_WRITE_FAILURE,
    }
}

pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::Read { .. } | ConfigError::Parse(_) => EXIT_UNREADABLE,
        ConfigError::Validation(_) => EXIT_USAGE,
        ConfigError::Write { .. } => EXIT_WRITE_FAILURE,
    }
}
