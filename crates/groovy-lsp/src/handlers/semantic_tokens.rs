//! `textDocument/semanticTokens/full` (SPEC_FULL.md §4.12 [SUPPLEMENT]).
//!
//! Walks the cached module's arena in source order and classifies each
//! node with a valid position into one of a small set of token types,
//! reusing the node-kind classification the Position Finder already
//! draws on. Encodes the LSP delta form directly during the single
//! source-ordered walk rather than building absolute positions first.

use groovy_core::node::{Module, Node, NodeKind};
use groovy_workspace::WorkspaceEngine;
use tower_lsp_server::lsp_types::{
    SemanticToken, SemanticTokenType, SemanticTokens, SemanticTokensParams, SemanticTokensResult,
};

/// Order here is the order token-type indices are reported to the client
/// in `server_capabilities`'s `SemanticTokensLegend`.
pub const TOKEN_TYPES: &[SemanticTokenType] = &[
    SemanticTokenType::CLASS,
    SemanticTokenType::METHOD,
    SemanticTokenType::PARAMETER,
    SemanticTokenType::VARIABLE,
    SemanticTokenType::PROPERTY,
    SemanticTokenType::KEYWORD,
    SemanticTokenType::STRING,
    SemanticTokenType::NUMBER,
];

fn token_type_index(kind: &NodeKind) -> Option<u32> {
    let index = match kind {
        NodeKind::ClassDecl { .. } | NodeKind::ClassReferenceExpr { .. } => 0,
        NodeKind::MethodDecl { .. } | NodeKind::ConstructorDecl { .. } | NodeKind::MethodCallExpr { .. } => 1,
        NodeKind::Parameter { .. } => 2,
        NodeKind::VariableDecl { .. } | NodeKind::VariableExpr { .. } => 3,
        NodeKind::FieldDecl { .. } | NodeKind::PropertyDecl { .. } | NodeKind::PropertyAccessExpr { .. } => 4,
        NodeKind::ConstantExpr { literal: groovy_core::node::Literal::Str(_) } | NodeKind::GStringExpr => 6,
        NodeKind::ConstantExpr { literal: groovy_core::node::Literal::Int(_) | groovy_core::node::Literal::Float(_) } => 7,
        _ => return None,
    };
    Some(index)
}

pub async fn handle_semantic_tokens(engine: &WorkspaceEngine, params: SemanticTokensParams) -> Option<SemanticTokensResult> {
    let uri = params.text_document.uri;
    let module = engine.cached_module(&uri).await?;
    Some(SemanticTokensResult::Tokens(SemanticTokens { result_id: None, data: encode(&module) }))
}

/// Encodes every classifiable, position-valid node as an LSP semantic
/// token, sorted by source position and emitted as successive deltas
/// (each token's `delta_line`/`delta_start` is relative to the previous
/// one, per the LSP semantic-tokens wire encoding).
fn encode(module: &Module) -> Vec<SemanticToken> {
    let mut nodes: Vec<&Node> = module
        .nodes()
        .filter(|n| n.has_valid_position() && token_type_index(&n.kind).is_some())
        .collect();
    nodes.sort_by_key(|n| (n.range.start.line, n.range.start.column));

    let mut tokens = Vec::with_capacity(nodes.len());
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;

    for node in nodes {
        let line = (node.range.start.line - 1).max(0) as u32;
        let start = (node.range.start.column - 1).max(0) as u32;
        let length = if node.range.is_multiline() {
            // A multi-line token isn't representable in one delta entry;
            // report only its first line, matching the common LSP client
            // expectation that tokens don't cross line boundaries.
            1
        } else {
            (node.range.end.column - node.range.start.column).max(1) as u32
        };

        let delta_line = line.saturating_sub(prev_line);
        let delta_start = if delta_line == 0 { start.saturating_sub(prev_start) } else { start };

        tokens.push(SemanticToken {
            delta_line,
            delta_start,
            length,
            token_type: token_type_index(&node.kind).unwrap(),
            token_modifiers_bitset: 0,
        });

        prev_line = line;
        prev_start = start;
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tower_lsp_server::lsp_types::{TextDocumentIdentifier, Uri};

    #[tokio::test]
    async fn a_class_declaration_produces_a_class_token() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();
        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        engine.update_file(uri.clone(), "class Foo {}\n".to_string()).await.unwrap();

        let result = handle_semantic_tokens(
            &engine,
            SemanticTokensParams {
                text_document: TextDocumentIdentifier { uri },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
            },
        )
        .await
        .unwrap();

        let SemanticTokensResult::Tokens(tokens) = result else { panic!("expected Tokens") };
        assert!(!tokens.data.is_empty());
    }

    #[test]
    fn deltas_are_relative_to_the_previous_token() {
        let uri: Uri = "file:///tmp/a.groovy".parse().unwrap();
        let mut module = Module::new(
            uri,
            None,
            groovy_core::position::Range::new(
                groovy_core::position::Position::new(1, 1),
                groovy_core::position::Position::new(1, 1),
            ),
        );
        module.push(
            groovy_core::node::NodeId::ROOT,
            NodeKind::VariableDecl { name: "a".into(), declared_type: None },
            groovy_core::position::Range::new(
                groovy_core::position::Position::new(1, 1),
                groovy_core::position::Position::new(1, 2),
            ),
        );
        module.push(
            groovy_core::node::NodeId::ROOT,
            NodeKind::VariableExpr { name: "b".into() },
            groovy_core::position::Range::new(
                groovy_core::position::Position::new(2, 5),
                groovy_core::position::Position::new(2, 6),
            ),
        );

        let tokens = encode(&module);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].delta_line, 0);
        assert_eq!(tokens[1].delta_line, 1);
        assert_eq!(tokens[1].delta_start, 4);
    }
}
