//! `textDocument/didOpen` and `didChange` handling: feed new content into
//! the workspace engine and publish the diagnostics it produces, with
//! per-URI recompile coalescing (spec.md §5 "back-pressure") — a change
//! that arrives while a previous recompile for the same URI is still
//! running cancels that previous recompile outright, since its content is
//! already stale.

use crate::document::ServerState;
use std::sync::Arc;
use tower_lsp_server::Client;
use tower_lsp_server::lsp_types::Uri;

pub async fn open_or_change(state: Arc<ServerState>, client: Client, uri: Uri, content: String) {
    let mut cancelled = state.begin_recompile(uri.clone());

    let diagnostics = tokio::select! {
        _ = &mut cancelled => {
            tracing::debug!(?uri, "recompile superseded before it started");
            return;
        }
        result = state.engine.update_file(uri.clone(), content) => result,
    };

    state.finish_recompile(&uri);

    match diagnostics {
        Ok(by_uri) => {
            for (file, diags) in by_uri {
                let lsp_diags = diags.iter().map(groovy_core::diagnostic::Diagnostic::to_lsp).collect();
                client.publish_diagnostics(file, lsp_diags, None).await;
            }
        }
        Err(err) => {
            tracing::warn!(?uri, error = %err, "compilation failed");
            client.publish_diagnostics(uri, Vec::new(), None).await;
        }
    }
}

pub async fn close(state: Arc<ServerState>, uri: Uri) {
    if let Err(err) = state.engine.remove_file(&uri).await {
        tracing::warn!(?uri, error = %err, "failed to remove closed document");
    }
    state.finish_recompile(&uri);
}

#[cfg(test)]
mod tests {
    #[test]
    fn module_compiles() {}
}
