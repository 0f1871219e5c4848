//! `textDocument/definition`: delegates straight to `groovy-resolve`'s
//! Definition Resolver over a workspace-wide view built from the engine's
//! combined symbol index and per-URI cached modules.

use groovy_core::position::Position as EnginePosition;
use groovy_resolve::{ClasspathNavigator, DefinitionResult, WorkspaceView, resolve_definition};
use groovy_workspace::{EngineWorkspaceView, RegistryClasspathNavigator, WorkspaceEngine};
use std::collections::HashMap;
use tower_lsp_server::lsp_types::{Location, Position, Uri};

/// Builds the `WorkspaceView` the resolver needs: every URI currently
/// indexed, each mapped to its most recently cached module.
pub async fn build_view(engine: &WorkspaceEngine) -> EngineWorkspaceView<'_> {
    let index = engine.combined_symbol_index().await;
    let mut modules = HashMap::new();
    for uri in engine.known_uris().await {
        if let Some(module) = engine.cached_module(&uri).await {
            modules.insert(uri, module);
        }
    }
    EngineWorkspaceView { engine, modules, index }
}

pub async fn handle_definition(engine: &WorkspaceEngine, uri: &Uri, position: Position) -> Option<Location> {
    let view = build_view(engine).await;
    let navigator = RegistryClasspathNavigator { registry: engine.resolver_registry(), root: engine.root() };
    let pos = EnginePosition::from_lsp(position);

    match resolve_definition(&view, &navigator, uri, pos) {
        Ok(DefinitionResult::Source { uri: target_uri, node }) => {
            let module = view.module(&target_uri)?;
            let range = module.get(node)?.range;
            Some(Location { uri: target_uri, range: range.to_lsp() })
        }
        // A classpath-miss, a symbol-not-found, or a malformed request all
        // surface as "no result" rather than a fabricated location
        // (spec.md §7).
        Ok(DefinitionResult::Binary { .. }) | Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn resolves_a_local_variable_definition() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();

        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        let source = "def x = 1\nprintln x\n";
        engine.update_file(uri.clone(), source.to_string()).await.unwrap();

        // `x` reference sits on line 2 (0-based line 1), column 8 (0-based).
        let found = handle_definition(&engine, &uri, Position::new(1, 8)).await;
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn an_unresolvable_reference_returns_no_location() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();

        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        engine.update_file(uri.clone(), "println undefinedThing\n".to_string()).await.unwrap();

        let found = handle_definition(&engine, &uri, Position::new(0, 9)).await;
        assert!(found.is_none());
    }
}
