//! Inlay hints for go.mod versions the build did not use.

use crate::config::InlayHintsConfig;
use crate::document::{ServerState, module_dir};
use crate::error::Result;
use gomod_core::{MetadataSource, PackageMetadata};
use gomod_hints::{parse_go_mod, unexpected_versions};
use std::sync::Arc;
use tower_lsp_server::ls_types::{InlayHint, InlayHintParams};

/// Handles `textDocument/inlayHint` for an open go.mod.
///
/// Returns an empty list when hints are disabled or the document is not
/// open. A go.mod that fails to parse is an error. Metadata that cannot be
/// loaded is logged and treated as empty. The requested range is not used
/// to filter hints.
pub async fn handle_inlay_hints(
    state: &ServerState,
    source: &dyn MetadataSource,
    params: InlayHintParams,
    config: &InlayHintsConfig,
) -> Result<Vec<InlayHint>> {
    if !config.enabled {
        return Ok(vec![]);
    }

    let uri = &params.text_document.uri;

    let Some(content) = state.get_content(uri) else {
        tracing::debug!("inlay hints requested for unknown document: {:?}", uri);
        return Ok(vec![]);
    };

    let parsed = parse_go_mod(&content)?;

    let metadata = match module_dir(uri) {
        Ok(dir) => match state.get_or_load_metadata(&dir, source).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("failed to load metadata for {}: {}", dir.display(), e);
                Arc::new(Vec::<PackageMetadata>::new())
            }
        },
        Err(e) => {
            tracing::warn!("cannot resolve module directory: {}", e);
            Arc::new(Vec::new())
        }
    };

    let hints = unexpected_versions(&parsed, &metadata);
    tracing::debug!("{} inlay hints for {:?}", hints.len(), uri);
    Ok(hints)
}
