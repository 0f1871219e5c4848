//! The content-addressed AST Cache (spec.md §4.7).
//!
//! Keyed by `(uri, hash(content))`; `put` replaces whatever was
//! previously cached for that URI (a URI only ever has one live content
//! hash at a time), and `invalidate` evicts every artifact — AST,
//! diagnostics — for a URI in one call. Backed by `DashMap` so readers
//! and writers never block each other for unrelated URIs, matching
//! spec.md §5 "AST cache ... safe for lock-free concurrent reads".

use dashmap::DashMap;
use groovy_core::diagnostic::Diagnostic;
use groovy_core::node::Module;
use groovy_frontend::VisitResult;
use std::sync::Arc;
use tower_lsp_server::lsp_types::Uri;

/// One cached compilation artifact: the parsed `Module`, the visitor
/// output derived from it, and the diagnostics produced alongside it.
#[derive(Debug, Clone)]
pub struct CachedUnit {
    pub module: Arc<Module>,
    pub visited: Arc<VisitResult>,
    pub diagnostics: Arc<Vec<Diagnostic>>,
}

#[derive(Debug, Default)]
pub struct AstCache {
    entries: DashMap<Uri, (u64, CachedUnit)>,
}

impl AstCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever was cached for `unit.module.uri` with `unit` at
    /// `content_hash`.
    pub fn put(&self, uri: Uri, content_hash: u64, unit: CachedUnit) {
        self.entries.insert(uri, (content_hash, unit));
    }

    /// Returns the cached unit for `uri` only if it was cached under the
    /// same `content_hash` — a stale hash is a miss (spec.md §8 "Cache
    /// coherence").
    pub fn get(&self, uri: &Uri, content_hash: u64) -> Option<CachedUnit> {
        self.entries.get(uri).filter(|entry| entry.0 == content_hash).map(|entry| entry.1.clone())
    }

    /// Returns whatever is cached for `uri` regardless of content hash,
    /// used by callers that just need "the most recently compiled unit"
    /// (the Definition Resolver's `WorkspaceView`) rather than a
    /// hash-gated lookup.
    pub fn latest(&self, uri: &Uri) -> Option<CachedUnit> {
        self.entries.get(uri).map(|entry| entry.1.clone())
    }

    /// Evicts every artifact cached for `uri`, regardless of content hash.
    pub fn invalidate(&self, uri: &Uri) {
        self.entries.remove(uri);
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
