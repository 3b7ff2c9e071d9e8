//! Language server that flags go.mod versions the build did not use.
//!
//! When `go list` reports that a module resolved to a different version than
//! the one written in a `require` or `replace` directive, the server shows
//! the resolved version as an inlay hint at the end of that line. Accepting
//! the hint rewrites the directive's version.

pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod server;

// Re-export commonly used types
pub use error::{Result, ServerError};
pub use server::Backend;
