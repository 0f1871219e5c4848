//! `Backend`: the `tower-lsp-server` wire-up between the LSP transport and
//! the workspace engine, query providers, and configuration (spec.md §2
//! "Session / Lifecycle", §4.12, §4.13).

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::lsp_types::{
    CodeActionOrCommand, CodeActionParams, CodeActionProviderCapability, CompletionOptions,
    CompletionParams, CompletionResponse, DidChangeConfigurationParams,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams, DocumentSymbolParams, DocumentSymbolResponse, FoldingRange,
    FoldingRangeParams, FoldingRangeProviderCapability, GotoDefinitionParams, GotoDefinitionResponse,
    Hover, HoverParams, HoverProviderCapability, InitializeParams, InitializeResult,
    InitializedParams, Location, MessageType, OneOf, ReferenceParams, RenameOptions, RenameParams,
    SemanticTokensFullOptions, SemanticTokensLegend, SemanticTokensOptions, SemanticTokensParams,
    SemanticTokensResult, SemanticTokensServerCapabilities, ServerCapabilities, ServerInfo,
    SignatureHelp, SignatureHelpOptions, SignatureHelpParams, TextDocumentSyncCapability,
    TextDocumentSyncKind, TypeDefinitionProviderCapability, WorkDoneProgressOptions, WorkspaceEdit,
    WorkspaceSymbolParams, WorkspaceSymbolResponse,
    request::{GotoTypeDefinitionParams, GotoTypeDefinitionResponse},
};
use tower_lsp_server::{Client, LanguageServer};

use crate::config::GroovyConfig;
use crate::document::ServerState;
use crate::handlers;

/// Files whose name marks them as a build-tool script; saving one of
/// these re-runs dependency resolution rather than a plain recompile
/// (mirrors `groovy_workspace::context`'s own build-script recognition).
const BUILD_SCRIPT_NAMES: &[&str] =
    &["build.gradle", "build.gradle.kts", "settings.gradle", "settings.gradle.kts", "pom.xml"];

pub struct Backend {
    client: Client,
    state: RwLock<Arc<ServerState>>,
    config: Arc<RwLock<GroovyConfig>>,
}

impl Backend {
    pub fn new(client: Client, root: PathBuf) -> Self {
        Self { client, state: RwLock::new(Arc::new(ServerState::new(root))), config: Arc::new(RwLock::new(GroovyConfig::default())) }
    }

    async fn state(&self) -> Arc<ServerState> {
        self.state.read().await.clone()
    }
}

/// Runs the initial workspace compile and publishes whatever diagnostics
/// it produces, wrapped in Work Done Progress (spec.md §5 "initial
/// compile reports progress"). Spawned as a background task from
/// `initialized` rather than awaited inline, since `CompilationProgress`
/// round-trips a request through the client and a blocked `initialized`
/// handler would leave nothing polling the client transport to answer it.
async fn compile_workspace(client: Client, state: Arc<ServerState>) {
    let (progress, sender) = match crate::progress::CompilationProgress::start(client.clone(), "Groovy", 1).await {
        Ok(pair) => pair,
        Err(err) => {
            tracing::warn!(error = %err, "failed to start work-done progress");
            let _ = state.engine.initialize_workspace().await;
            return;
        }
    };

    let result = state.engine.initialize_workspace().await;
    sender.send(1);

    let success = match result {
        Ok(by_uri) => {
            for (uri, diagnostics) in by_uri {
                let lsp_diags = diagnostics.iter().map(groovy_core::diagnostic::Diagnostic::to_lsp).collect();
                client.publish_diagnostics(uri, lsp_diags, None).await;
            }
            true
        }
        Err(err) => {
            tracing::error!(error = %err, "initial workspace compile failed");
            false
        }
    };

    progress.end(success).await;
}

/// Resolves the workspace root an `initialize` request names: the first
/// local `workspaceFolders` entry, falling back to the deprecated
/// `rootUri`. Neither present (or neither a `file://` URI) keeps
/// whatever root the server was started with.
fn resolve_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .and_then(|folder| folder.uri.to_file_path())
        .or_else(|| params.root_uri.as_ref().and_then(|uri| uri.to_file_path()))
        .map(|cow| cow.into_owned())
}

impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(root) = resolve_root(&params) {
            *self.state.write().await = Arc::new(ServerState::new(root));
        }

        if let Some(options) = params.initialization_options {
            *self.config.write().await = GroovyConfig::from_json(options);
        }

        Ok(InitializeResult {
            server_info: Some(ServerInfo { name: "groovy-lsp".to_string(), version: Some(env!("CARGO_PKG_VERSION").to_string()) }),
            capabilities: server_capabilities(),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client.log_message(MessageType::INFO, "groovy-lsp: compiling workspace").await;
        let client = self.client.clone();
        let state = self.state().await;
        tokio::spawn(compile_workspace(client, state));
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let content = params.text_document.text;
        crate::document_lifecycle::open_or_change(self.state().await, self.client.clone(), uri, content).await;
    }

    async fn did_change(&self, mut params: DidChangeTextDocumentParams) {
        // Full-document sync (`server_capabilities`'s `TextDocumentSyncKind::FULL`):
        // the client always sends the whole new text as the sole content change.
        let Some(change) = params.content_changes.pop() else { return };
        crate::document_lifecycle::open_or_change(self.state().await, self.client.clone(), params.text_document.uri, change.text).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let is_build_script = uri
            .to_file_path()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .is_some_and(|name| BUILD_SCRIPT_NAMES.contains(&name.as_str()));

        if !is_build_script {
            return;
        }

        self.client.log_message(MessageType::INFO, "groovy-lsp: build script changed, re-resolving dependencies").await;
        match self.state().await.engine.update_dependencies().await {
            Ok(by_uri) => {
                for (file, diagnostics) in by_uri {
                    let lsp_diags = diagnostics.iter().map(groovy_core::diagnostic::Diagnostic::to_lsp).collect();
                    self.client.publish_diagnostics(file, lsp_diags, None).await;
                }
            }
            Err(err) => tracing::warn!(error = %err, "dependency update failed"),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        crate::document_lifecycle::close(self.state().await, params.text_document.uri).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        *self.config.write().await = GroovyConfig::from_json(params.settings);
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        Ok(handlers::hover::handle_hover(&self.state().await.engine, params).await)
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        Ok(handlers::completion::handle_completion(&self.state().await.engine, params).await)
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let text_document_position = params.text_document_position_params;
        let location = handlers::definition::handle_definition(&self.state().await.engine, &text_document_position.text_document.uri, text_document_position.position).await;
        Ok(location.map(GotoDefinitionResponse::Scalar))
    }

    async fn goto_type_definition(&self, params: GotoTypeDefinitionParams) -> Result<Option<GotoTypeDefinitionResponse>> {
        let text_document_position = params.text_document_position_params;
        let location = handlers::type_definition::handle_type_definition(&self.state().await.engine, &text_document_position.text_document.uri, text_document_position.position).await;
        Ok(location.map(GotoTypeDefinitionResponse::Scalar))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        Ok(handlers::references::handle_references(&self.state().await.engine, params).await)
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        Ok(handlers::rename::handle_rename(&self.state().await.engine, params).await)
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        Ok(handlers::document_symbols::handle_document_symbols(&self.state().await.engine, params).await)
    }

    async fn symbol(&self, params: WorkspaceSymbolParams) -> Result<Option<WorkspaceSymbolResponse>> {
        Ok(handlers::workspace_symbols::handle_workspace_symbols(&self.state().await.engine, params).await)
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        Ok(handlers::folding::handle_folding(&self.state().await.engine, params).await)
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        Ok(handlers::signature_help::handle_signature_help(&self.state().await.engine, params).await)
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<Vec<CodeActionOrCommand>>> {
        let actions = handlers::code_actions::handle_code_actions(&self.state().await.engine, params).await;
        Ok(if actions.is_empty() { None } else { Some(actions) })
    }

    async fn semantic_tokens_full(&self, params: SemanticTokensParams) -> Result<Option<SemanticTokensResult>> {
        Ok(handlers::semantic_tokens::handle_semantic_tokens(&self.state().await.engine, params).await)
    }
}

/// Declares exactly the LSP capabilities this engine actually serves
/// (spec.md §6). Formatting and range-formatting delegate to an external
/// formatter this engine doesn't embed, so they're left unadvertised
/// rather than registered with a no-op handler.
fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec![".".to_string(), ":".to_string(), "=".to_string(), "*".to_string()]),
            ..Default::default()
        }),
        signature_help_provider: Some(SignatureHelpOptions {
            trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
            retrigger_characters: Some(vec![",".to_string(), " ".to_string()]),
            work_done_progress_options: WorkDoneProgressOptions::default(),
        }),
        definition_provider: Some(OneOf::Left(true)),
        type_definition_provider: Some(TypeDefinitionProviderCapability::Simple(true)),
        references_provider: Some(OneOf::Left(true)),
        rename_provider: Some(OneOf::Right(RenameOptions { prepare_provider: Some(false), work_done_progress_options: WorkDoneProgressOptions::default() })),
        document_symbol_provider: Some(OneOf::Left(true)),
        workspace_symbol_provider: Some(OneOf::Left(true)),
        folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
        code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
        semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
            legend: SemanticTokensLegend { token_types: crate::handlers::semantic_tokens::TOKEN_TYPES.to_vec(), token_modifiers: Vec::new() },
            full: Some(SemanticTokensFullOptions::Bool(true)),
            range: Some(false),
            work_done_progress_options: WorkDoneProgressOptions::default(),
        })),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_script_names_match_the_files_the_context_manager_recognizes() {
        assert!(BUILD_SCRIPT_NAMES.contains(&"build.gradle"));
        assert!(BUILD_SCRIPT_NAMES.contains(&"pom.xml"));
    }

    #[test]
    fn server_capabilities_advertise_full_text_sync() {
        let caps = server_capabilities();
        assert!(matches!(caps.text_document_sync, Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL))));
        assert!(caps.completion_provider.is_some());
        assert!(caps.semantic_tokens_provider.is_some());
    }
}
