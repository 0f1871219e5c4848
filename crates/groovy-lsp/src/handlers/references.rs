//! `textDocument/references`: resolve the symbol under the cursor to its
//! declaration, then reverse-scan every cached module's AST for any node
//! naming the same identifier (spec.md §4.12). This is a name-based scan
//! rather than a true use-def graph, since the AST carries no back-links
//! from a declaration to its uses — documented simplification, same
//! approximation the Definition Resolver's global lookup already makes.

use groovy_core::node::{Module, NodeId, NodeKind};
use groovy_core::position::Position as EnginePosition;
use groovy_resolve::{DefinitionResult, WorkspaceView};
use groovy_workspace::{RegistryClasspathNavigator, WorkspaceEngine};
use tower_lsp_server::lsp_types::{Location, ReferenceParams};

pub async fn handle_references(engine: &WorkspaceEngine, params: ReferenceParams) -> Option<Vec<Location>> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;
    let include_declaration = params.context.include_declaration;

    let view = crate::handlers::definition::build_view(engine).await;
    let module = view.module(uri)?;
    let pos = EnginePosition::from_lsp(position);
    let target = groovy_resolve::find_node_at_position(&module, pos)?;

    let (decl_uri, decl_node) = match groovy_resolve::resolve_definition(
        &view,
        &RegistryClasspathNavigator { registry: engine.resolver_registry(), root: engine.root() },
        uri,
        pos,
    ) {
        Ok(DefinitionResult::Source { uri: decl_uri, node }) => (decl_uri, node),
        _ => (uri.clone(), target),
    };

    let decl_module = view.module(&decl_uri)?;
    let name = declaration_name(&decl_module, decl_node)?;

    let mut locations = Vec::new();
    for known_uri in engine.known_uris().await {
        let Some(module) = engine.cached_module(&known_uri).await else { continue };
        for node in module.nodes() {
            let is_declaration = known_uri == decl_uri && node.id == decl_node;
            if is_declaration && !include_declaration {
                continue;
            }
            if reference_name(&node.kind).is_some_and(|n| n == name) {
                locations.push(Location { uri: known_uri.clone(), range: node.range.to_lsp() });
            }
        }
    }

    if locations.is_empty() { None } else { Some(locations) }
}

fn declaration_name(module: &Module, node_id: NodeId) -> Option<String> {
    reference_name(&module.get(node_id)?.kind).map(str::to_string)
}

/// Extracts the identifier a node names, whether it's a declaration or a
/// use, so both sides of a reference scan compare on the same string.
fn reference_name(kind: &NodeKind) -> Option<&str> {
    match kind {
        NodeKind::ClassDecl { name, .. } => Some(name),
        NodeKind::MethodDecl { name, .. } => Some(name),
        NodeKind::FieldDecl { name, .. } => Some(name),
        NodeKind::PropertyDecl { name, .. } => Some(name),
        NodeKind::Parameter { name, .. } => Some(name),
        NodeKind::VariableDecl { name, .. } => Some(name),
        NodeKind::VariableExpr { name } => Some(name),
        NodeKind::ClassReferenceExpr { name } => Some(name),
        NodeKind::MethodCallExpr { method_name, .. } => Some(method_name),
        NodeKind::PropertyAccessExpr { property_name } => Some(property_name),
        NodeKind::AssignmentExpr { target_name: Some(name) } => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tower_lsp_server::lsp_types::{Position, ReferenceContext, TextDocumentIdentifier, TextDocumentPositionParams, Uri};

    #[tokio::test]
    async fn finds_every_use_of_a_local_variable() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();
        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        let source = "def total = 1\nprintln total\nprintln total\n";
        engine.update_file(uri.clone(), source.to_string()).await.unwrap();

        let locations = handle_references(&engine, ReferenceParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position::new(0, 4),
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: ReferenceContext { include_declaration: true },
        })
        .await
        .unwrap();

        assert!(locations.len() >= 3);
    }

    #[tokio::test]
    async fn excluding_the_declaration_drops_it_from_the_results() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();
        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        let source = "def total = 1\nprintln total\n";
        engine.update_file(uri.clone(), source.to_string()).await.unwrap();

        let locations = handle_references(&engine, ReferenceParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position::new(0, 4),
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: ReferenceContext { include_declaration: false },
        })
        .await
        .unwrap();

        assert_eq!(locations.len(), 1);
    }
}
