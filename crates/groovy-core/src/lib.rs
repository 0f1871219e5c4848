//! Core data model for the Groovy language server's semantic engine.
//!
//! This crate owns the types every other crate in the workspace builds on:
//! the arena-based AST (`node`, `module`), the symbol table (`symbol`,
//! `symbol_index`), diagnostics and the shared error type, the
//! compilation-context and compilation-result records, and the worker
//! version/selection machinery. It has no knowledge of parsing, file I/O,
//! or the wire protocol — those live in `groovy-frontend`, `groovy-workspace`,
//! and `groovy-lsp` respectively.

pub mod compilation;
pub mod diagnostic;
pub mod error;
pub mod node;
pub mod position;
pub mod source_file;
pub mod symbol;
pub mod symbol_index;
pub mod worker;

pub use compilation::{CompilationContext, CompilationResult, ContextKind};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{CoreError, Result};
pub use node::{Module, Node, NodeId, NodeKind};
pub use position::{Position, Range};
pub use source_file::SourceFile;
pub use symbol::{Symbol, SymbolId, SymbolKind};
pub use symbol_index::SymbolIndex;
pub use worker::{Feature, GroovyVersion, VersionRange, WorkerDescriptor, select_worker};
