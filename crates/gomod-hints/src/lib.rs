//! go.mod support for gomod-lsp.
//!
//! This crate parses go.mod files, loads package metadata with `go list`,
//! and flags require/replace directives whose declared version differs from
//! the version the build actually used.
//!
//! # Features
//!
//! - Parse go.mod files with byte-accurate directive spans
//! - Decode `go list -json` package metadata
//! - Generate inlay hints with a text edit replacing each stale version
//!
//! # Example
//!
//! ```
//! use gomod_core::{Module, PackageMetadata};
//! use gomod_hints::{parse_go_mod, unexpected_versions};
//!
//! let content = r#"
//! module example.com/myapp
//!
//! go 1.21
//!
//! require github.com/gin-gonic/gin v1.9.0
//! "#;
//!
//! let parsed = parse_go_mod(content).unwrap();
//! let metadata = vec![PackageMetadata {
//!     import_path: "github.com/gin-gonic/gin".into(),
//!     module: Some(Module {
//!         path: "github.com/gin-gonic/gin".into(),
//!         version: "v1.9.1".into(),
//!         ..Default::default()
//!     }),
//! }];
//!
//! let hints = unexpected_versions(&parsed, &metadata);
//! assert_eq!(hints.len(), 1);
//! ```

pub mod error;
pub mod golist;
pub mod inlay_hint;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use error::{GoModError, Result};
pub use golist::{GoListSource, parse_go_list_output};
pub use inlay_hint::{
    DirectiveIndex, Discrepancy, ResolvedModule, build_hint, resolved_modules,
    unexpected_versions,
};
pub use parser::{ParsedModule, parse_go_mod};
pub use types::{Exclude, Line, ModFile, ModuleDirective, ModuleVersion, Replace, Require};
