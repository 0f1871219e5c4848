//! `textDocument/foldingRange`: import runs of three or more, and any
//! class/method/closure/control-flow block that spans at least one extra
//! line (spec.md §4.12).

use groovy_core::node::{Node, NodeKind};
use groovy_workspace::WorkspaceEngine;
use tower_lsp_server::lsp_types::{FoldingRange, FoldingRangeKind, FoldingRangeParams, Uri};

const MIN_IMPORT_RUN: usize = 3;

pub async fn handle_folding(engine: &WorkspaceEngine, params: FoldingRangeParams) -> Option<Vec<FoldingRange>> {
    let uri: Uri = params.text_document.uri;
    let module = engine.cached_module(&uri).await?;

    let mut ranges = Vec::new();
    ranges.extend(import_runs(&module.children_of(groovy_core::node::NodeId::ROOT).iter().filter_map(|id| module.get(*id)).collect::<Vec<_>>()));

    for node in module.nodes() {
        if !node.range.is_multiline() {
            continue;
        }
        if is_foldable_block(&node.kind) {
            ranges.push(FoldingRange {
                start_line: (node.range.start.line - 1).max(0) as u32,
                start_character: None,
                end_line: (node.range.end.line - 1).max(0) as u32,
                end_character: None,
                kind: Some(FoldingRangeKind::Region),
                collapsed_text: None,
            });
        }
    }

    if ranges.is_empty() { None } else { Some(ranges) }
}

fn is_foldable_block(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ClassDecl { .. }
            | NodeKind::MethodDecl { .. }
            | NodeKind::ConstructorDecl { .. }
            | NodeKind::ClosureExpr { .. }
            | NodeKind::IfStmt
            | NodeKind::ForStmt
            | NodeKind::WhileStmt
            | NodeKind::TryStmt
            | NodeKind::CatchClause { .. }
            | NodeKind::Block
    )
}

fn import_runs(top_level: &[&Node]) -> Vec<FoldingRange> {
    let mut runs = Vec::new();
    let mut current: Vec<&Node> = Vec::new();

    let mut flush = |current: &mut Vec<&Node>, runs: &mut Vec<FoldingRange>| {
        if current.len() >= MIN_IMPORT_RUN {
            let first = current.first().unwrap();
            let last = current.last().unwrap();
            runs.push(FoldingRange {
                start_line: (first.range.start.line - 1).max(0) as u32,
                start_character: None,
                end_line: (last.range.end.line - 1).max(0) as u32,
                end_character: None,
                kind: Some(FoldingRangeKind::Imports),
                collapsed_text: None,
            });
        }
        current.clear();
    };

    for node in top_level {
        if matches!(node.kind, NodeKind::ImportDecl { .. }) {
            current.push(node);
        } else {
            flush(&mut current, &mut runs);
        }
    }
    flush(&mut current, &mut runs);

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tower_lsp_server::lsp_types::TextDocumentIdentifier;

    #[tokio::test]
    async fn three_or_more_consecutive_imports_fold_together() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();
        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        let source = "import a.A\nimport b.B\nimport c.C\nclass Foo {}\n";
        engine.update_file(uri.clone(), source.to_string()).await.unwrap();

        let ranges = handle_folding(&engine, FoldingRangeParams {
            text_document: TextDocumentIdentifier { uri },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        })
        .await
        .unwrap();

        assert!(ranges.iter().any(|r| r.kind == Some(FoldingRangeKind::Imports)));
    }

    #[tokio::test]
    async fn a_multiline_method_body_folds() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();
        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        let source = "class Foo {\n  def bar() {\n    return 1\n  }\n}\n";
        engine.update_file(uri.clone(), source.to_string()).await.unwrap();

        let ranges = handle_folding(&engine, FoldingRangeParams {
            text_document: TextDocumentIdentifier { uri },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        })
        .await
        .unwrap();

        assert!(!ranges.is_empty());
    }
}
