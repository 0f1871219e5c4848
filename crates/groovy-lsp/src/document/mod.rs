//! Server-wide state: the workspace engine plus the bookkeeping the LSP
//! front-end needs around it (recompile coalescing).

pub mod loader;

use dashmap::DashMap;
use groovy_workspace::WorkspaceEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_lsp_server::lsp_types::Uri;

/// Everything the `Backend` shares across concurrent request handlers.
pub struct ServerState {
    pub engine: Arc<WorkspaceEngine>,
    /// One in-flight "generation" token per URI (spec.md §5 "back-pressure").
    /// Sending on the stored half tells whichever task is still racing it
    /// to abandon its recompile — the content it was compiling is already
    /// stale.
    recompile_guards: DashMap<Uri, oneshot::Sender<()>>,
}

impl ServerState {
    pub fn new(root: PathBuf) -> Self {
        Self { engine: Arc::new(WorkspaceEngine::new(root)), recompile_guards: DashMap::new() }
    }

    /// Registers a fresh recompile generation for `uri`, cancelling
    /// whichever generation was previously in flight. The caller races the
    /// returned receiver against its own compile future.
    pub fn begin_recompile(&self, uri: Uri) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        if let Some((_, previous)) = self.recompile_guards.remove(&uri) {
            let _ = previous.send(());
        }
        self.recompile_guards.insert(uri, tx);
        rx
    }

    /// Clears the recompile generation for `uri` once its task has run to
    /// completion, so a later superseding change doesn't find a stale
    /// sender to cancel against.
    pub fn finish_recompile(&self, uri: &Uri) {
        self.recompile_guards.remove(uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Uri {
        "file:///tmp/a.groovy".parse().unwrap()
    }

    #[tokio::test]
    async fn a_second_recompile_cancels_the_first() {
        let state = ServerState::new(PathBuf::from("/tmp"));
        let first = state.begin_recompile(uri());
        let _second = state.begin_recompile(uri());

        assert!(first.await.is_ok(), "first generation should receive a cancel signal");
    }

    #[tokio::test]
    async fn finishing_clears_the_guard_so_nothing_is_cancelled_spuriously() {
        let state = ServerState::new(PathBuf::from("/tmp"));
        let first = state.begin_recompile(uri());
        state.finish_recompile(&uri());

        drop(state);
        assert!(first.await.is_err(), "no cancel should have been sent");
    }
}
