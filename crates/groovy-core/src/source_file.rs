//! The `(uri, content, revision)` triple the engine tracks per open file.

use tower_lsp_server::lsp_types::Uri;

/// The last observed editor buffer for a URI, plus a monotone revision
/// counter used to detect stale recompiles racing a newer edit.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub uri: Uri,
    pub content: String,
    pub revision: u64,
}

impl SourceFile {
    pub fn new(uri: Uri, content: String, revision: u64) -> Self {
        Self { uri, content, revision }
    }

    /// A cheap, order-sensitive content hash used as the AST cache key.
    /// Not cryptographic — collisions would only cause a spurious cache
    /// miss, never a coherence violation, since the key also includes the
    /// URI.
    pub fn content_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.content.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Uri {
        "file:///tmp/a.groovy".parse().unwrap()
    }

    #[test]
    fn identical_content_hashes_equal() {
        let a = SourceFile::new(uri(), "def x = 1".into(), 1);
        let b = SourceFile::new(uri(), "def x = 1".into(), 2);
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn differing_content_hashes_differ() {
        let a = SourceFile::new(uri(), "def x = 1".into(), 1);
        let b = SourceFile::new(uri(), "def x = 2".into(), 1);
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
