//! Compilation contexts and the result of compiling one.

use crate::diagnostic::Diagnostic;
use crate::node::Module;
use std::collections::HashSet;
use std::path::PathBuf;
use tower_lsp_server::lsp_types::Uri;

/// The kind of compilation context, per spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    SourceSet,
    Standalone,
    BuildScript,
}

/// A set of files compiled together against a shared classpath.
#[derive(Debug, Clone)]
pub struct CompilationContext {
    pub name: String,
    pub files: HashSet<Uri>,
    pub classpath: Vec<PathBuf>,
    pub dependencies: HashSet<String>,
    pub kind: ContextKind,
}

impl CompilationContext {
    pub fn new(name: impl Into<String>, kind: ContextKind) -> Self {
        Self {
            name: name.into(),
            files: HashSet::new(),
            classpath: Vec::new(),
            dependencies: HashSet::new(),
            kind,
        }
    }
}

/// The outcome of compiling a single source unit to the canonicalization
/// phase. `ast` is `Some` whenever any usable AST fragment exists, even if
/// `success` is `false` — partial syntax errors do not discard the tree.
#[derive(Debug, Clone)]
pub struct CompilationResult {
    pub success: bool,
    pub ast: Option<Module>,
    pub diagnostics: Vec<Diagnostic>,
    pub source_text: Option<String>,
}

impl CompilationResult {
    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self { success: false, ast: None, diagnostics, source_text: None }
    }
}
