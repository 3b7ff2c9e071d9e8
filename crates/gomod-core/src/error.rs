use thiserror::Error;

/// Core error types for gomod-lsp.
///
/// Covers the failure modes shared by every crate in the workspace: offset and
/// position translation, loading package metadata, and the I/O and JSON errors
/// underneath them.
///
/// # Examples
///
/// ```
/// use gomod_core::error::{CoreError, Result};
///
/// fn check_offset(offset: usize, len: usize) -> Result<()> {
///     if offset > len {
///         return Err(CoreError::OffsetOutOfRange { offset, len });
///     }
///     Ok(())
/// }
///
/// assert!(check_offset(3, 10).is_ok());
/// assert!(check_offset(11, 10).is_err());
/// ```
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("offset {offset} is past the end of the document (length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("invalid range: start offset {start} is after end offset {end}")]
    InvertedRange { start: usize, end: usize },

    #[error("position {line}:{character} is outside the document")]
    PositionOutOfRange { line: u32, character: u32 },

    #[error("failed to load metadata for {module_dir}: {message}")]
    MetadataError { module_dir: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for `Result<T, CoreError>`.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Helper for creating metadata errors
    pub fn metadata(module_dir: &std::path::Path, message: impl Into<String>) -> Self {
        Self::MetadataError {
            module_dir: module_dir.display().to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_out_of_range_display() {
        let error = CoreError::OffsetOutOfRange { offset: 12, len: 10 };
        assert_eq!(
            error.to_string(),
            "offset 12 is past the end of the document (length 10)"
        );
    }

    #[test]
    fn test_position_out_of_range_display() {
        let error = CoreError::PositionOutOfRange {
            line: 4,
            character: 2,
        };
        assert_eq!(error.to_string(), "position 4:2 is outside the document");
    }

    #[test]
    fn test_metadata_helper() {
        let error = CoreError::metadata(std::path::Path::new("/work/app"), "go not found");
        assert_eq!(
            error.to_string(),
            "failed to load metadata for /work/app: go not found"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CoreError = io_err.into();
        assert!(error.to_string().contains("I/O error"));
    }
}
