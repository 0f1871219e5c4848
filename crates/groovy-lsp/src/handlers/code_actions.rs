//! `textDocument/codeAction`: quick fixes for "unable to resolve class X"
//! (propose an import by scanning the symbol index for a class named X,
//! falling back to a small fixed JDK catalog when no workspace file
//! declares it) and "unused import" (delete the import line). Formatting
//! actions delegate to an external formatter this engine doesn't embed,
//! so no action is offered for them here (spec.md §4.12).

use super::jdk_catalog;
use groovy_workspace::WorkspaceEngine;
use std::collections::HashMap;
use tower_lsp_server::lsp_types::{CodeAction, CodeActionKind, CodeActionOrCommand, CodeActionParams, Position, Range, TextEdit, WorkspaceEdit};

const UNRESOLVED_CLASS_MARKER: &str = "unable to resolve class ";
const UNUSED_IMPORT_MARKER: &str = "unused import";

pub async fn handle_code_actions(engine: &WorkspaceEngine, params: CodeActionParams) -> Vec<CodeActionOrCommand> {
    let uri = &params.text_document.uri;
    let mut actions = Vec::new();
    let index = engine.combined_symbol_index().await;

    for diagnostic in &params.context.diagnostics {
        if let Some(class_name) = diagnostic.message.split(UNRESOLVED_CLASS_MARKER).nth(1) {
            let class_name = class_name.trim();
            let mut proposed = false;

            for class_uri in index.uris() {
                for symbol in index.by_category(class_uri, "class") {
                    if symbol.name == class_name {
                        actions.push(import_action(uri, class_name, diagnostic.range));
                        proposed = true;
                    }
                }
            }

            if !proposed && let Some(fqn) = jdk_catalog::resolve(class_name) {
                actions.push(import_action(uri, fqn, diagnostic.range));
            }
        }

        if diagnostic.message.to_lowercase().contains(UNUSED_IMPORT_MARKER) {
            actions.push(remove_import_action(uri, diagnostic.range));
        }
    }

    actions
}

fn import_action(uri: &tower_lsp_server::lsp_types::Uri, import_name: &str, range: Range) -> CodeActionOrCommand {
    let edit = TextEdit { range: Range::new(Position::new(0, 0), Position::new(0, 0)), new_text: format!("import {import_name}\n") };
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![edit]);

    CodeActionOrCommand::CodeAction(CodeAction {
        title: format!("Import '{import_name}'"),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![tower_lsp_server::lsp_types::Diagnostic { range, ..Default::default() }]),
        edit: Some(WorkspaceEdit { changes: Some(changes), ..Default::default() }),
        ..Default::default()
    })
}

fn remove_import_action(uri: &tower_lsp_server::lsp_types::Uri, range: Range) -> CodeActionOrCommand {
    let line_range = Range::new(Position::new(range.start.line, 0), Position::new(range.start.line + 1, 0));
    let edit = TextEdit { range: line_range, new_text: String::new() };
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![edit]);

    CodeActionOrCommand::CodeAction(CodeAction {
        title: "Remove unused import".to_string(),
        kind: Some(CodeActionKind::QUICKFIX),
        edit: Some(WorkspaceEdit { changes: Some(changes), ..Default::default() }),
        ..Default::default()
    })
}
