//! Core abstractions for gomod-lsp.
//!
//! This crate provides the pieces shared by the go.mod tooling and the
//! language server:
//!
//! - **Error Types**: [`CoreError`] and the crate-wide [`Result`] alias
//! - **Position Mapping**: [`PositionMapper`] converts byte offsets to LSP
//!   positions (UTF-16 columns) and back
//! - **Package Metadata**: [`PackageMetadata`] / [`Module`] describe the
//!   resolved build graph, [`MetadataSource`] produces them
//!
//! # Examples
//!
//! ```
//! use gomod_core::{Module, PositionMapper};
//! use tower_lsp_server::ls_types::Position;
//!
//! let mapper = PositionMapper::new("require example.com/foo v1.0.0\n");
//! assert_eq!(mapper.offset_position(24).unwrap(), Position::new(0, 24));
//!
//! let module = Module {
//!     path: "example.com/foo".into(),
//!     version: "v1.2.0".into(),
//!     ..Default::default()
//! };
//! assert_eq!(module.effective_version(), "v1.2.0");
//! ```

pub mod error;
pub mod metadata;
pub mod position;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use metadata::{GO_MOD, MetadataSource, Module, PackageMetadata, find_module_root};
pub use position::PositionMapper;
