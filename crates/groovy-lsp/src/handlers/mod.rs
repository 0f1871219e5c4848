//! Query providers: read-only LSP request handlers built on top of
//! `groovy-resolve`'s Position Finder and Definition Resolver, and the
//! combined symbol index published by the `groovy-workspace` engine.

pub mod code_actions;
pub mod completion;
pub mod definition;
pub mod document_symbols;
pub mod folding;
pub mod hover;
mod jdk_catalog;
pub mod references;
pub mod rename;
pub mod semantic_tokens;
pub mod signature_help;
pub mod type_definition;
pub mod workspace_symbols;

use groovy_core::node::Module;
use groovy_workspace::WorkspaceEngine;
use std::sync::Arc;
use tower_lsp_server::lsp_types::Uri;

/// Fetches the most recently compiled module for `uri`, falling back to
/// loading and compiling it from disk if the editor never sent a
/// `didOpen` for it (spec.md §4.6's cold-start fallback, mirrored at the
/// query boundary).
pub async fn module_for(engine: &WorkspaceEngine, uri: &Uri) -> Option<Arc<Module>> {
    if let Some(module) = engine.cached_module(uri).await {
        return Some(module);
    }

    let content = crate::document::loader::load_document_from_disk(uri).await.ok()?;
    engine.update_file(uri.clone(), content).await.ok()?;
    engine.cached_module(uri).await
}
