//! `textDocument/typeDefinition` (SPEC_FULL.md §4.12 [SUPPLEMENT]).
//!
//! Runs the Definition Resolver; if the resolved declaration names a
//! static type that is itself a class, that class's declaration is
//! returned instead of the declaration itself. Falls back to the ordinary
//! go-to-definition result when the declaration has no resolvable static
//! type (e.g. a `def`-typed variable).

use crate::handlers::definition::build_view;
use groovy_core::node::NodeKind;
use groovy_core::position::Position as EnginePosition;
use groovy_resolve::{DefinitionResult, WorkspaceView, resolve_definition};
use groovy_workspace::{RegistryClasspathNavigator, WorkspaceEngine};
use tower_lsp_server::lsp_types::{Location, Position, Uri};

pub async fn handle_type_definition(engine: &WorkspaceEngine, uri: &Uri, position: Position) -> Option<Location> {
    let view = build_view(engine).await;
    let navigator = RegistryClasspathNavigator { registry: engine.resolver_registry(), root: engine.root() };
    let pos = EnginePosition::from_lsp(position);

    let DefinitionResult::Source { uri: decl_uri, node } = resolve_definition(&view, &navigator, uri, pos).ok()? else {
        return None;
    };

    let module = view.module(&decl_uri)?;
    let declared_type = match &module.get(node)?.kind {
        NodeKind::FieldDecl { declared_type, .. }
        | NodeKind::PropertyDecl { declared_type, .. }
        | NodeKind::Parameter { declared_type, .. }
        | NodeKind::VariableDecl { declared_type, .. } => declared_type.clone(),
        NodeKind::MethodDecl { return_type, .. } => return_type.clone(),
        _ => None,
    }?;

    for class_uri in view.uris_with_classes() {
        let Some(class_module) = view.module(&class_uri) else { continue };
        for class_node in class_module.nodes() {
            if let NodeKind::ClassDecl { name, .. } = &class_node.kind {
                if *name == declared_type {
                    return Some(Location { uri: class_uri, range: class_node.range.to_lsp() });
                }
            }
        }
    }

    // No class by that name is tracked — fall back to the ordinary
    // declaration location rather than reporting no result at all.
    Some(Location { uri: decl_uri, range: module.get(node)?.range.to_lsp() })
}
