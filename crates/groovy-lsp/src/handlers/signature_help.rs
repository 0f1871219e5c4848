//! `textDocument/signatureHelp`: locate the enclosing method call, list
//! same-named overloads from the combined symbol index, and highlight the
//! active parameter by counting how many argument expressions start
//! before the cursor (spec.md §4.12).

use groovy_core::node::{Module, NodeId, NodeKind};
use groovy_core::position::Position as EnginePosition;
use groovy_core::symbol::SymbolKind;
use groovy_workspace::WorkspaceEngine;
use tower_lsp_server::lsp_types::{ParameterInformation, ParameterLabel, SignatureHelp, SignatureHelpParams, SignatureInformation};

pub async fn handle_signature_help(engine: &WorkspaceEngine, params: SignatureHelpParams) -> Option<SignatureHelp> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;
    let module = engine.cached_module(uri).await?;

    let node_id = groovy_resolve::find_node_at(&module, position.line, position.character)?;
    let (call_id, method_name, declared_arity) = enclosing_call(&module, node_id)?;

    let cursor = EnginePosition::from_lsp(position);
    let children = module.children_of(call_id);
    let active_parameter = children
        .iter()
        .filter(|child| module.get(**child).is_some_and(|n| n.range.start <= cursor))
        .count()
        .saturating_sub(1)
        .max(0) as u32;

    let index = engine.combined_symbol_index().await;
    let mut arities: Vec<usize> = index
        .all_symbols()
        .filter(|s| s.name == method_name)
        .filter_map(|s| match &s.kind {
            SymbolKind::Method { arity, .. } => Some(*arity),
            _ => None,
        })
        .collect();
    if arities.is_empty() {
        arities.push(declared_arity);
    }
    arities.sort_unstable();
    arities.dedup();

    let signatures = arities
        .into_iter()
        .map(|arity| {
            let params: Vec<ParameterInformation> = (0..arity)
                .map(|i| ParameterInformation { label: ParameterLabel::Simple(format!("arg{i}")), documentation: None })
                .collect();
            SignatureInformation {
                label: format!("{method_name}({})", (0..arity).map(|i| format!("arg{i}")).collect::<Vec<_>>().join(", ")),
                documentation: None,
                parameters: Some(params),
                active_parameter: None,
            }
        })
        .collect();

    Some(SignatureHelp { signatures, active_signature: Some(0), active_parameter: Some(active_parameter) })
}

/// Walks up from `node_id` to the nearest enclosing `MethodCallExpr`,
/// returning its id, method name, and declared argument count.
fn enclosing_call(module: &Module, node_id: NodeId) -> Option<(NodeId, String, usize)> {
    let mut current = Some(node_id);
    while let Some(id) = current {
        if let NodeKind::MethodCallExpr { method_name, arg_count } = &module.get(id)?.kind {
            return Some((id, method_name.clone(), *arg_count));
        }
        current = module.parent_of(id);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tower_lsp_server::lsp_types::{Position, TextDocumentIdentifier, TextDocumentPositionParams, Uri};

    #[tokio::test]
    async fn finds_the_enclosing_call_and_reports_a_signature() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();
        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        engine.update_file(uri.clone(), "greet('a', 'b')\n".to_string()).await.unwrap();

        let help = handle_signature_help(&engine, SignatureHelpParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position::new(0, 8),
            },
            work_done_progress_params: Default::default(),
            context: None,
        })
        .await
        .unwrap();

        assert!(!help.signatures.is_empty());
    }
}
