//! `workspace/symbol`: case-folded substring match over every indexed
//! symbol, falling back to a fuzzy subsequence match when the substring
//! search finds nothing. Unfiltered (empty query) results cap at 100;
//! filtered results cap at 50 (spec.md §4.12).

use groovy_core::symbol::Symbol;
use groovy_workspace::WorkspaceEngine;
use tower_lsp_server::lsp_types::{Location, OneOf, WorkspaceSymbol, WorkspaceSymbolParams, WorkspaceSymbolResponse};

const UNFILTERED_CAP: usize = 100;
const FILTERED_CAP: usize = 50;

pub async fn handle_workspace_symbols(engine: &WorkspaceEngine, params: WorkspaceSymbolParams) -> Option<WorkspaceSymbolResponse> {
    let index = engine.combined_symbol_index().await;
    let query = params.query.to_lowercase();

    let all: Vec<&Symbol> = index.all_symbols().collect();

    let matched: Vec<&Symbol> = if query.is_empty() {
        all.into_iter().take(UNFILTERED_CAP).collect()
    } else {
        let substring: Vec<&Symbol> = all.iter().copied().filter(|s| s.name.to_lowercase().contains(&query)).collect();
        let chosen = if substring.is_empty() { all.iter().copied().filter(|s| is_subsequence(&query, &s.name.to_lowercase())).collect() } else { substring };
        chosen.into_iter().take(FILTERED_CAP).collect()
    };

    if matched.is_empty() {
        return None;
    }

    #[allow(deprecated)]
    let symbols = matched
        .into_iter()
        .map(|symbol| WorkspaceSymbol {
            name: symbol.name.clone(),
            kind: crate::handlers::document_symbols::to_lsp_kind(symbol),
            tags: None,
            container_name: None,
            location: OneOf::Left(Location { uri: symbol.uri.clone(), range: Default::default() }),
            data: None,
        })
        .collect();

    Some(WorkspaceSymbolResponse::Nested(symbols))
}

fn is_subsequence(query: &str, candidate: &str) -> bool {
    let mut chars = candidate.chars();
    query.chars().all(|qc| chars.any(|cc| cc == qc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_subsequence_matches_even_without_contiguous_characters() {
        assert!(is_subsequence("gtr", "greeter"));
        assert!(!is_subsequence("xyz", "greeter"));
    }

    #[tokio::test]
    async fn an_empty_query_returns_up_to_the_unfiltered_cap() {
        use tempfile::tempdir;
        use tower_lsp_server::lsp_types::Uri;

        let dir = tempdir().unwrap();
        let engine = WorkspaceEngine::new(dir.path().to_path_buf());
        engine.initialize_workspace().await.unwrap();
        let uri = Uri::from_file_path(dir.path().join("Foo.groovy")).unwrap();
        engine.update_file(uri, "class Foo {}\n".to_string()).await.unwrap();

        let response = handle_workspace_symbols(&engine, WorkspaceSymbolParams {
            query: String::new(),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        })
        .await
        .unwrap();

        let WorkspaceSymbolResponse::Nested(symbols) = response else { panic!("expected a nested response") };
        assert!(!symbols.is_empty());
        assert!(symbols.len() <= UNFILTERED_CAP);
    }
}
