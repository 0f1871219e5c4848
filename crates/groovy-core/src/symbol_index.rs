//! The persistent symbol table.
//!
//! Per the design notes' Open Question resolution, this is implemented as
//! a plain immutable map rebuilt wholesale on every mutation, not a
//! structurally-shared persistent-collection crate: the engine never
//! mutates an index in place, only swaps an `Arc<SymbolIndex>` for a new
//! one under the compilation mutex, so readers never observe a partial
//! update and never need copy-on-write sharing below that granularity.

use crate::symbol::Symbol;
use std::collections::HashMap;
use tower_lsp_server::lsp_types::Uri;

/// Three views over the same set of symbols, all keyed by URI.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    by_uri: HashMap<Uri, Vec<Symbol>>,
    by_uri_name: HashMap<(Uri, String), Vec<Symbol>>,
    by_uri_category: HashMap<(Uri, String), Vec<Symbol>>,
}

impl PartialEq for SymbolIndex {
    fn eq(&self, other: &Self) -> bool {
        self.by_uri == other.by_uri
            && self.by_uri_name == other.by_uri_name
            && self.by_uri_category == other.by_uri_category
    }
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `symbol` under all three views, preserving insertion order
    /// within each bucket (spec'd invariant).
    pub fn insert(&mut self, symbol: Symbol) {
        let uri = symbol.uri.clone();
        let name_key = (uri.clone(), symbol.name.clone());
        let category_key = (uri.clone(), symbol.category().to_string());

        self.by_uri.entry(uri).or_default().push(symbol.clone());
        self.by_uri_name.entry(name_key).or_default().push(symbol.clone());
        self.by_uri_category.entry(category_key).or_default().push(symbol);
    }

    /// Drops every symbol previously indexed for `uri`. Used when a URI is
    /// recompiled or removed, ahead of re-inserting its fresh symbols.
    pub fn clear_uri(&mut self, uri: &Uri) {
        self.by_uri.remove(uri);
        self.by_uri_name.retain(|(u, _), _| u != uri);
        self.by_uri_category.retain(|(u, _), _| u != uri);
    }

    pub fn symbols_in(&self, uri: &Uri) -> &[Symbol] {
        self.by_uri.get(uri).map_or(&[], Vec::as_slice)
    }

    pub fn by_name<'a>(&'a self, uri: &Uri, name: &str) -> &'a [Symbol] {
        self.by_uri_name.get(&(uri.clone(), name.to_string())).map_or(&[], Vec::as_slice)
    }

    pub fn by_category<'a>(&'a self, uri: &Uri, category: &str) -> &'a [Symbol] {
        self.by_uri_category
            .get(&(uri.clone(), category.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    /// All URIs that have at least one indexed symbol, for workspace-wide
    /// scans (global definition lookup, workspace symbol search).
    pub fn uris(&self) -> impl Iterator<Item = &Uri> {
        self.by_uri.keys()
    }

    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.by_uri.values().flatten()
    }

    /// Merges `other` into `self`, used to build the combined workspace
    /// view out of per-context indices without re-deriving from scratch.
    pub fn merge(&mut self, other: &Self) {
        for symbols in other.by_uri.values() {
            for symbol in symbols {
                self.insert(symbol.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use crate::symbol::SymbolKind;

    fn uri() -> Uri {
        "file:///tmp/a.groovy".parse().unwrap()
    }

    fn sample_symbol() -> Symbol {
        Symbol::new("Foo", uri(), NodeId(1), SymbolKind::Class { package: None })
    }

    #[test]
    fn insert_populates_all_three_views() {
        let mut index = SymbolIndex::new();
        index.insert(sample_symbol());

        assert_eq!(index.symbols_in(&uri()).len(), 1);
        assert_eq!(index.by_name(&uri(), "Foo").len(), 1);
        assert_eq!(index.by_category(&uri(), "class").len(), 1);
    }

    #[test]
    fn clear_uri_removes_from_all_views() {
        let mut index = SymbolIndex::new();
        index.insert(sample_symbol());
        index.clear_uri(&uri());

        assert!(index.symbols_in(&uri()).is_empty());
        assert!(index.by_name(&uri(), "Foo").is_empty());
        assert!(index.by_category(&uri(), "class").is_empty());
    }

    #[test]
    fn rebuilding_from_the_same_input_is_idempotent() {
        let mut a = SymbolIndex::new();
        a.insert(sample_symbol());

        let mut b = SymbolIndex::new();
        b.insert(sample_symbol());

        assert_eq!(a, b);
    }
}
