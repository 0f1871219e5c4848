//! `textDocument/rename`: resolves the symbol under the cursor to its
//! declaration, reuses the References scan to find every occurrence across
//! the workspace, and emits one `TextEdit` per occurrence replacing the old
//! identifier with the new one (spec.md §4.12).

use std::collections::HashMap;
use tower_lsp_server::lsp_types::{ReferenceContext, ReferenceParams, RenameParams, TextDocumentPositionParams, TextEdit, Uri, WorkspaceEdit};

use groovy_workspace::WorkspaceEngine;

pub async fn handle_rename(engine: &WorkspaceEngine, params: RenameParams) -> Option<WorkspaceEdit> {
    let new_name = params.new_name;
    let reference_params = ReferenceParams {
        text_document_position: params.text_document_position.clone(),
        work_done_progress_params: Default::default(),
        partial_result_params: Default::default(),
        context: ReferenceContext { include_declaration: true },
    };

    let locations = crate::handlers::references::handle_references(engine, reference_params).await?;

    let mut changes: HashMap<Uri, Vec<TextEdit>> = HashMap::new();
    for location in locations {
        changes.entry(location.uri).or_default().push(TextEdit { range: location.range, new_text: new_name.clone() });
    }

    Some(WorkspaceEdit { changes: Some(changes), document_changes: None, change_annotations: None })
}
