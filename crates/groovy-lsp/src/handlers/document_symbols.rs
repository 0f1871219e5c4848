//! `textDocument/documentSymbol`: every symbol declared in one file,
//! unlimited (spec.md §4.12).

use groovy_core::symbol::Symbol;
use groovy_workspace::WorkspaceEngine;
use tower_lsp_server::lsp_types::{DocumentSymbolParams, DocumentSymbolResponse, SymbolInformation, SymbolKind as LspSymbolKind};

#[allow(deprecated)]
pub async fn handle_document_symbols(engine: &WorkspaceEngine, params: DocumentSymbolParams) -> Option<DocumentSymbolResponse> {
    let uri = params.text_document.uri;
    let index = engine.combined_symbol_index().await;
    let module = engine.cached_module(&uri).await?;

    let mut symbols = Vec::new();
    for symbol in index.symbols_in(&uri) {
        let Some(node) = module.get(symbol.defining_node) else { continue };
        symbols.push(SymbolInformation {
            name: symbol.name.clone(),
            kind: to_lsp_kind(symbol),
            tags: None,
            deprecated: None,
            location: tower_lsp_server::lsp_types::Location { uri: uri.clone(), range: node.range.to_lsp() },
            container_name: None,
        });
    }

    if symbols.is_empty() { None } else { Some(DocumentSymbolResponse::Flat(symbols)) }
}

pub fn to_lsp_kind(symbol: &Symbol) -> LspSymbolKind {
    match symbol.category() {
        "class" => LspSymbolKind::CLASS,
        "method" => LspSymbolKind::METHOD,
        "field" => LspSymbolKind::FIELD,
        "property" => LspSymbolKind::PROPERTY,
        "parameter" => LspSymbolKind::VARIABLE,
        "variable" => LspSymbolKind::VARIABLE,
        "import" => LspSymbolKind::MODULE,
        _ => LspSymbolKind::NULL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tower_lsp_server::lsp_types::{TextDocumentIdentifier, Uri};

    #[tokio::test]
    async fn lists_every_declared_symbol_in_the_file() {
        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();
        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        engine.update_file(uri.clone(), "class Foo {\n  def bar() {}\n}\n".to_string()).await.unwrap();

        let response = handle_document_symbols(&engine, DocumentSymbolParams {
            text_document: TextDocumentIdentifier { uri },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        })
        .await
        .unwrap();

        let DocumentSymbolResponse::Flat(symbols) = response else { panic!("expected a flat response") };
        assert!(symbols.iter().any(|s| s.name == "Foo"));
        assert!(symbols.iter().any(|s| s.name == "bar"));
    }
}
