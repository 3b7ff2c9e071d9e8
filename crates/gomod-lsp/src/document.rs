//! Open documents and per-module metadata cache.

use crate::error::{Result, ServerError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use gomod_core::{GO_MOD, MetadataSource, PackageMetadata, find_module_root};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tower_lsp_server::ls_types::Uri;

/// Returns true if the URI names a `go.mod` file.
pub fn is_go_mod(uri: &Uri) -> bool {
    uri.path()
        .as_str()
        .rsplit('/')
        .next()
        .is_some_and(|name| name == GO_MOD)
}

/// Directory whose `go list` output describes the module of `uri`.
///
/// Prefers the nearest ancestor holding a `go.mod` on disk and falls back to
/// the document's own directory for files that were never saved.
pub fn module_dir(uri: &Uri) -> Result<PathBuf> {
    let path = uri
        .to_file_path()
        .ok_or_else(|| ServerError::InvalidUri(uri.as_str().to_string()))?;

    if let Some(root) = find_module_root(&path) {
        return Ok(root);
    }

    path.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| ServerError::InvalidUri(uri.as_str().to_string()))
}

/// State for a single open go.mod.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Latest full text
    pub content: String,
    /// Version reported by the client
    pub version: i32,
}

impl DocumentState {
    pub fn new(content: String, version: i32) -> Self {
        Self { content, version }
    }
}

/// Global server state.
///
/// # Examples
///
/// ```
/// use gomod_lsp::document::ServerState;
///
/// let state = ServerState::new();
/// assert_eq!(state.document_count(), 0);
/// ```
pub struct ServerState {
    /// Open documents by URI
    pub documents: DashMap<Uri, DocumentState>,
    /// Package metadata by module directory. Each cell is filled at most
    /// once; invalidation swaps in a fresh cell.
    metadata: DashMap<PathBuf, MetadataCell>,
}

type MetadataCell = Arc<OnceCell<Arc<Vec<PackageMetadata>>>>;

impl ServerState {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            metadata: DashMap::new(),
        }
    }

    /// Returns a copy of the document text, releasing the map lock at once.
    pub fn get_content(&self, uri: &Uri) -> Option<String> {
        self.documents.get(uri).map(|doc| doc.content.clone())
    }

    /// Stores the document, replacing older versions.
    ///
    /// Out-of-order updates carrying a lower version than the stored one are
    /// dropped.
    pub fn update_document(&self, uri: Uri, state: DocumentState) {
        match self.documents.entry(uri) {
            Entry::Occupied(mut entry) => {
                if entry.get().version > state.version {
                    tracing::debug!(
                        "ignoring stale update for {:?}: version {} < {}",
                        entry.key(),
                        state.version,
                        entry.get().version
                    );
                    return;
                }
                entry.insert(state);
            }
            Entry::Vacant(entry) => {
                entry.insert(state);
            }
        }
    }

    pub fn remove_document(&self, uri: &Uri) -> Option<(Uri, DocumentState)> {
        self.documents.remove(uri)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Returns cached metadata for `module_dir`, loading it on first use.
    ///
    /// Concurrent callers share one load. Failed loads are not cached, so
    /// the next request retries. A load that was in flight when the
    /// directory got invalidated fills a detached cell and is never visible
    /// to later requests.
    pub async fn get_or_load_metadata(
        &self,
        module_dir: &Path,
        source: &dyn MetadataSource,
    ) -> gomod_core::Result<Arc<Vec<PackageMetadata>>> {
        let cell = Arc::clone(&self.metadata.entry(module_dir.to_path_buf()).or_default());

        if let Some(cached) = cell.get() {
            tracing::trace!("metadata cache hit: {}", module_dir.display());
            return Ok(Arc::clone(cached));
        }

        let packages = cell
            .get_or_try_init(|| async { source.load(module_dir).await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(packages))
    }

    /// Drops cached metadata for `module_dir`, including any load still in
    /// flight. Returns true if an entry existed.
    pub fn invalidate_metadata(&self, module_dir: &Path) -> bool {
        let removed = self.metadata.remove(module_dir).is_some();
        if removed {
            tracing::debug!("invalidated metadata for {}", module_dir.display());
        }
        removed
    }

    /// Number of module directories with loaded metadata.
    pub fn cached_module_count(&self) -> usize {
        self.metadata
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
