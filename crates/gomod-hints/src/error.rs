//! Errors specific to go.mod handling.

use gomod_core::CoreError;
use thiserror::Error;

/// Errors that can occur while parsing go.mod or loading module metadata.
#[derive(Error, Debug)]
pub enum GoModError {
    /// Syntax or directive error in go.mod
    #[error("go.mod:{line}: {message}")]
    ParseError { line: usize, message: String },

    /// `go` command exited unsuccessfully
    #[error("'{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// `go` command did not finish in time
    #[error("'{command}' timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    /// Failed to decode `go list -json` output
    #[error("Failed to parse go list output: {0}")]
    MetadataDecode(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the shared core
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for go.mod operations.
pub type Result<T> = std::result::Result<T, GoModError>;

impl GoModError {
    /// Helper for creating parse errors
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Helper for creating command failures
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl From<GoModError> for CoreError {
    fn from(err: GoModError) -> Self {
        match err {
            GoModError::Core(e) => e,
            GoModError::Io(e) => Self::Io(e),
            GoModError::MetadataDecode(e) => Self::Json(e),
            other => Self::MetadataError {
                module_dir: String::new(),
                message: other.to_string(),
            },
        }
    }
}
