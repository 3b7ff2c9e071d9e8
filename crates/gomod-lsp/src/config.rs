use serde::Deserialize;
use std::time::Duration;

/// Root configuration for the gomod-lsp server.
///
/// Provided by the LSP client via initialization options. All fields use
/// defaults when not specified.
///
/// # Examples
///
/// ```
/// use gomod_lsp::config::GoModConfig;
///
/// let json = r#"{
///     "inlay_hints": { "enabled": true },
///     "metadata": { "go_command": "/usr/local/go/bin/go", "timeout_secs": 60 }
/// }"#;
///
/// let config: GoModConfig = serde_json::from_str(json).unwrap();
/// assert!(config.inlay_hints.enabled);
/// assert_eq!(config.metadata.go_command, "/usr/local/go/bin/go");
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GoModConfig {
    #[serde(default)]
    pub inlay_hints: InlayHintsConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
}

/// Configuration for stale version inlay hints.
///
/// # Defaults
///
/// - `enabled`: `true`
#[derive(Debug, Clone, Deserialize)]
pub struct InlayHintsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for InlayHintsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration for loading package metadata with `go list`.
///
/// # Defaults
///
/// - `go_command`: `"go"` (resolved through `PATH`)
/// - `timeout_secs`: `30`, clamped to `1..=600`
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_go_command")]
    pub go_command: String,
    #[serde(
        default = "default_timeout_secs",
        deserialize_with = "deserialize_timeout_secs"
    )]
    pub timeout_secs: u64,
}

impl MetadataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            go_command: default_go_command(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Default value functions
const fn default_true() -> bool {
    true
}

fn default_go_command() -> String {
    "go".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 600;

fn deserialize_timeout_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    let clamped = secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
    if clamped != secs {
        tracing::warn!(
            "metadata.timeout_secs {} out of range, using {}",
            secs,
            clamped
        );
    }
    Ok(clamped)
}
