//! Package metadata abstractions.
//!
//! The build graph of a Go project is described by per-package metadata.
//! Every package that belongs to a module carries that module's identity:
//! its path, the version selected by minimal version selection, and the
//! replacement the build applied, if any. Standard library packages carry
//! no module at all.
//!
//! The field names follow the JSON emitted by `go list -json`, so a
//! [`PackageMetadata`] can be decoded straight from that output.

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the module manifest file.
pub const GO_MOD: &str = "go.mod";

/// A module as seen by the build.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Module {
    /// Module path (e.g., "golang.org/x/sync")
    pub path: String,
    /// Selected version; empty for the main module and filesystem replacements
    #[serde(default)]
    pub version: String,
    /// Module substituted for this one by a replace directive
    #[serde(default)]
    pub replace: Option<Box<Module>>,
    /// Whether this is the main module of the build
    #[serde(default)]
    pub main: bool,
}

impl Module {
    /// Version the build actually consumed for this module path.
    ///
    /// When the module was replaced, that is the replacement's version
    /// (possibly empty for a filesystem replacement).
    pub fn effective_version(&self) -> &str {
        match &self.replace {
            Some(replacement) => &replacement.version,
            None => &self.version,
        }
    }
}

/// Metadata for one package of the build graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageMetadata {
    /// Package import path
    #[serde(default)]
    pub import_path: String,
    /// Owning module; `None` for standard library packages
    #[serde(default)]
    pub module: Option<Module>,
}

/// Source of package metadata for a module directory.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use gomod_core::metadata::{MetadataSource, PackageMetadata};
/// use std::path::Path;
///
/// struct EmptySource;
///
/// #[async_trait]
/// impl MetadataSource for EmptySource {
///     async fn load(&self, _module_dir: &Path) -> gomod_core::Result<Vec<PackageMetadata>> {
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Loads metadata for every package the module in `module_dir` builds.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be produced or decoded.
    async fn load(&self, module_dir: &Path) -> Result<Vec<PackageMetadata>>;
}

/// Finds the directory of the nearest `go.mod` at or above `path`.
///
/// `path` may be the manifest itself or any file or directory inside the
/// module.
pub fn find_module_root(path: &Path) -> Option<PathBuf> {
    let start = if path.is_dir() { path } else { path.parent()? };

    let root = start
        .ancestors()
        .find(|dir| dir.join(GO_MOD).is_file())
        .map(Path::to_path_buf);

    tracing::trace!(path = %path.display(), root = ?root, "module root lookup");
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_version_without_replace() {
        let module = Module {
            path: "example.com/foo".into(),
            version: "v1.2.0".into(),
            ..Default::default()
        };
        assert_eq!(module.effective_version(), "v1.2.0");
    }

    #[test]
    fn test_effective_version_with_replace() {
        let module = Module {
            path: "example.com/foo".into(),
            version: "v1.0.0".into(),
            replace: Some(Box::new(Module {
                path: "example.com/fork".into(),
                version: "v1.3.0".into(),
                ..Default::default()
            })),
            main: false,
        };
        assert_eq!(module.effective_version(), "v1.3.0");
    }

    #[test]
    fn test_effective_version_with_local_replace() {
        let module = Module {
            path: "example.com/foo".into(),
            version: "v1.0.0".into(),
            replace: Some(Box::new(Module {
                path: "../foo".into(),
                ..Default::default()
            })),
            main: false,
        };
        assert_eq!(module.effective_version(), "");
    }

    #[test]
    fn test_deserialize_package_metadata() {
        let json = r#"{
            "ImportPath": "example.com/foo/bar",
            "Module": {
                "Path": "example.com/foo",
                "Version": "v1.0.0",
                "Replace": {"Path": "example.com/fork", "Version": "v1.3.0"}
            }
        }"#;
        let pkg: PackageMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(pkg.import_path, "example.com/foo/bar");
        let module = pkg.module.unwrap();
        assert_eq!(module.path, "example.com/foo");
        assert_eq!(module.effective_version(), "v1.3.0");
        assert!(!module.main);
    }

    #[test]
    fn test_deserialize_standard_package() {
        let json = r#"{"ImportPath": "fmt", "Standard": true}"#;
        let pkg: PackageMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(pkg.import_path, "fmt");
        assert!(pkg.module.is_none());
    }

    #[test]
    fn test_find_module_root_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join(GO_MOD);
        std::fs::write(&manifest, "module example.com/app\n").unwrap();

        assert_eq!(find_module_root(&manifest), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_module_root_from_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(GO_MOD), "module example.com/app\n").unwrap();
        let nested = dir.path().join("internal").join("server");
        std::fs::create_dir_all(&nested).unwrap();
        let file = nested.join("main.go");
        std::fs::write(&file, "package server\n").unwrap();

        assert_eq!(find_module_root(&file), Some(dir.path().to_path_buf()));
        assert_eq!(find_module_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_module_root_nearest_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(GO_MOD), "module example.com/app\n").unwrap();
        let tools = dir.path().join("tools");
        std::fs::create_dir_all(&tools).unwrap();
        std::fs::write(tools.join(GO_MOD), "module example.com/app/tools\n").unwrap();

        assert_eq!(find_module_root(&tools.join(GO_MOD)), Some(tools));
    }

    #[tokio::test]
    async fn test_metadata_source_trait_object() {
        struct FixedSource(Vec<PackageMetadata>);

        #[async_trait]
        impl MetadataSource for FixedSource {
            async fn load(&self, _module_dir: &Path) -> Result<Vec<PackageMetadata>> {
                Ok(self.0.clone())
            }
        }

        let source: Box<dyn MetadataSource> = Box::new(FixedSource(vec![PackageMetadata {
            import_path: "fmt".into(),
            module: None,
        }]));
        let loaded = source.load(Path::new("/work")).await.unwrap();
        assert_eq!(loaded.len(), 1);
    }
}
