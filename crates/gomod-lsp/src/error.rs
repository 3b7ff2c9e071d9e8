use gomod_hints::GoModError;
use thiserror::Error;
use tower_lsp_server::jsonrpc;

/// Error types for the gomod-lsp server.
///
/// Request handlers return these and convert them into JSON-RPC errors at
/// the protocol boundary.
///
/// # Examples
///
/// ```
/// use gomod_hints::parse_go_mod;
/// use gomod_lsp::error::{Result, ServerError};
///
/// fn check(content: &str) -> Result<usize> {
///     let parsed = parse_go_mod(content)?;
///     Ok(parsed.file.require.len())
/// }
///
/// assert!(matches!(check("require ("), Err(ServerError::GoMod(_))));
/// ```
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    GoMod(#[from] GoModError),

    #[error("not a file URI: {0}")]
    InvalidUri(String),
}

/// Convenience type alias for `Result<T, ServerError>`.
pub type Result<T> = std::result::Result<T, ServerError>;

impl From<ServerError> for jsonrpc::Error {
    fn from(err: ServerError) -> Self {
        Self::invalid_params(err.to_string())
    }
}
