use crate::config::GoModConfig;
use crate::document::{DocumentState, ServerState, is_go_mod, module_dir};
use crate::handlers::inlay_hints;
use gomod_hints::GoListSource;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp_server::ls_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams, InitializeParams, InitializeResult, InitializedParams, InlayHint,
    InlayHintParams, MessageType, OneOf, SaveOptions, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions,
};
use tower_lsp_server::{Client, LanguageServer, jsonrpc::Result};

pub struct Backend {
    client: Client,
    state: Arc<ServerState>,
    config: Arc<RwLock<GoModConfig>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(ServerState::new()),
            config: Arc::new(RwLock::new(GoModConfig::default())),
        }
    }

    /// Shared server state (primarily for testing).
    #[doc(hidden)]
    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// Metadata source built from the current configuration.
    async fn metadata_source(&self) -> GoListSource {
        let config = self.config.read().await;
        GoListSource::new(
            config.metadata.go_command.clone(),
            config.metadata.timeout(),
        )
    }

    fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(false),
                    })),
                    ..Default::default()
                },
            )),
            inlay_hint_provider: Some(OneOf::Left(true)),
            ..Default::default()
        }
    }
}

impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("initializing gomod-lsp server");

        if let Some(init_options) = params.initialization_options {
            match serde_json::from_value::<GoModConfig>(init_options) {
                Ok(config) => {
                    tracing::debug!("loaded configuration: {:?}", config);
                    *self.config.write().await = config;
                }
                Err(e) => {
                    tracing::warn!("ignoring invalid initialization options: {}", e);
                }
            }
        }

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "gomod-lsp".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("gomod-lsp server initialized");
        self.client
            .log_message(MessageType::INFO, "gomod-lsp ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down gomod-lsp server");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        if !is_go_mod(&doc.uri) {
            tracing::debug!("unsupported file type: {:?}", doc.uri);
            return;
        }

        tracing::info!("document opened: {:?}", doc.uri);
        self.state
            .update_document(doc.uri, DocumentState::new(doc.text, doc.version));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if !is_go_mod(&uri) {
            return;
        }

        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.state.update_document(
                uri,
                DocumentState::new(change.text, params.text_document.version),
            );
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        if !is_go_mod(&uri) {
            return;
        }

        match module_dir(&uri) {
            Ok(dir) => {
                self.state.invalidate_metadata(&dir);
            }
            Err(e) => {
                tracing::warn!("cannot invalidate metadata: {}", e);
                return;
            }
        }

        if let Err(e) = self.client.inlay_hint_refresh().await {
            tracing::debug!("inlay_hint_refresh not supported: {:?}", e);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("document closed: {:?}", uri);
        self.state.remove_document(&uri);
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        // Clone config before async call to release lock early
        let inlay_config = { self.config.read().await.inlay_hints.clone() };
        let source = self.metadata_source().await;

        let hints =
            inlay_hints::handle_inlay_hints(&self.state, &source, params, &inlay_config).await?;
        Ok(Some(hints))
    }
}
