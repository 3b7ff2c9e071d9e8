//! Package metadata from `go list`.
//!
//! `go list -e -deps -json ./...` prints one JSON object per package in the
//! build graph of a module, concatenated without separators. Each package
//! that belongs to a module carries a `Module` object with the selected
//! version and, when a replace directive applied, the `Replace` module.

use crate::error::{GoModError, Result};
use async_trait::async_trait;
use gomod_core::{CoreError, MetadataSource, PackageMetadata};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Arguments passed to the go command.
const GO_LIST_ARGS: &[&str] = &["list", "-e", "-deps", "-json", "./..."];

/// Loads package metadata by running `go list` in the module directory.
///
/// # Examples
///
/// ```no_run
/// use gomod_core::MetadataSource;
/// use gomod_hints::GoListSource;
/// use std::path::Path;
/// use std::time::Duration;
///
/// # async fn example() -> gomod_core::Result<()> {
/// let source = GoListSource::new("go", Duration::from_secs(30));
/// let packages = source.load(Path::new("/path/to/module")).await?;
/// println!("{} packages", packages.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GoListSource {
    go_command: String,
    timeout: Duration,
}

impl GoListSource {
    pub fn new(go_command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            go_command: go_command.into(),
            timeout,
        }
    }

    fn command_line(&self) -> String {
        format!("{} {}", self.go_command, GO_LIST_ARGS.join(" "))
    }

    /// Runs `go list` and decodes its output.
    pub async fn list_packages(&self, module_dir: &Path) -> Result<Vec<PackageMetadata>> {
        tracing::debug!(dir = %module_dir.display(), command = %self.command_line(), "Loading package metadata");

        let child = Command::new(&self.go_command)
            .args(GO_LIST_ARGS)
            .current_dir(module_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GoModError::Timeout {
                command: self.command_line(),
                seconds: self.timeout.as_secs(),
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GoModError::command_failed(
                self.command_line(),
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let packages = parse_go_list_output(&stdout)?;

        tracing::debug!(
            dir = %module_dir.display(),
            packages = packages.len(),
            "Loaded package metadata"
        );

        Ok(packages)
    }
}

#[async_trait]
impl MetadataSource for GoListSource {
    async fn load(&self, module_dir: &Path) -> gomod_core::Result<Vec<PackageMetadata>> {
        self.list_packages(module_dir).await.map_err(|e| match e {
            GoModError::MetadataDecode(e) => CoreError::Json(e),
            other => CoreError::metadata(module_dir, other.to_string()),
        })
    }
}

/// Decodes the concatenated JSON objects printed by `go list -json`.
///
/// # Examples
///
/// ```
/// use gomod_hints::parse_go_list_output;
///
/// let output = r#"{"ImportPath": "fmt", "Standard": true}
/// {"ImportPath": "example.com/foo", "Module": {"Path": "example.com/foo", "Version": "v1.2.0"}}"#;
///
/// let packages = parse_go_list_output(output).unwrap();
/// assert_eq!(packages.len(), 2);
/// assert!(packages[0].module.is_none());
/// ```
pub fn parse_go_list_output(output: &str) -> Result<Vec<PackageMetadata>> {
    serde_json::Deserializer::from_str(output)
        .into_iter::<PackageMetadata>()
        .map(|pkg| pkg.map_err(GoModError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPUT: &str = r#"{
	"Dir": "/usr/local/go/src/errors",
	"ImportPath": "errors",
	"Name": "errors",
	"Standard": true
}
{
	"Dir": "/home/dev/go/pkg/mod/example.com/foo@v1.3.0/bar",
	"ImportPath": "example.com/foo/bar",
	"Name": "bar",
	"Module": {
		"Path": "example.com/foo",
		"Version": "v1.0.0",
		"Replace": {
			"Path": "example.com/fork",
			"Version": "v1.3.0"
		},
		"GoVersion": "1.21"
	}
}
{
	"Dir": "/work/app",
	"ImportPath": "example.com/app",
	"Name": "main",
	"Module": {
		"Path": "example.com/app",
		"Main": true,
		"Dir": "/work/app",
		"GoMod": "/work/app/go.mod"
	}
}
"#;

    #[test]
    fn test_parse_go_list_output() {
        let packages = parse_go_list_output(SAMPLE_OUTPUT).unwrap();
        assert_eq!(packages.len(), 3);

        assert_eq!(packages[0].import_path, "errors");
        assert!(packages[0].module.is_none());

        let foo = packages[1].module.as_ref().unwrap();
        assert_eq!(foo.path, "example.com/foo");
        assert_eq!(foo.version, "v1.0.0");
        assert_eq!(foo.effective_version(), "v1.3.0");

        let app = packages[2].module.as_ref().unwrap();
        assert!(app.main);
        assert!(app.version.is_empty());
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_go_list_output("").unwrap().is_empty());
        assert!(parse_go_list_output("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_truncated_output() {
        let result = parse_go_list_output(r#"{"ImportPath": "fmt"} {"ImportPath": "#);
        assert!(matches!(result, Err(GoModError::MetadataDecode(_))));
    }

    #[test]
    fn test_command_line() {
        let source = GoListSource::new("go", Duration::from_secs(5));
        assert_eq!(source.command_line(), "go list -e -deps -json ./...");
    }

    #[tokio::test]
    async fn test_missing_go_command() {
        let dir = tempfile::tempdir().unwrap();
        let source = GoListSource::new("gomod-hints-no-such-go-binary", Duration::from_secs(5));

        let result = source.list_packages(dir.path()).await;
        assert!(matches!(result, Err(GoModError::Io(_))));

        let core = source.load(dir.path()).await;
        assert!(matches!(core, Err(CoreError::MetadataError { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fake_go_command() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-go");
        std::fs::write(
            &script,
            "#!/bin/sh\ncat <<'EOF'\n{\"ImportPath\": \"example.com/foo\", \"Module\": {\"Path\": \"example.com/foo\", \"Version\": \"v1.2.0\"}}\nEOF\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let source = GoListSource::new(script.to_string_lossy(), Duration::from_secs(10));
        let packages = source.load(dir.path()).await.unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].module.as_ref().unwrap().version, "v1.2.0");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_go_command() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-go");
        std::fs::write(&script, "#!/bin/sh\necho 'go: no go.mod found' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let source = GoListSource::new(script.to_string_lossy(), Duration::from_secs(10));
        match source.list_packages(dir.path()).await {
            Err(GoModError::CommandFailed { message, .. }) => {
                assert!(message.contains("no go.mod found"));
            }
            other => panic!("expected command failure, got {:?}", other),
        }
    }
}
