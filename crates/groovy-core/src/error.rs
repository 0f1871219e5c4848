//! Shared error type for the semantic engine.
//!
//! Each error kind corresponds to one of the error kinds spec'd for the
//! engine: a user-data problem is never an `Err` that aborts a query — it
//! is either turned into a `Diagnostic` upstream or returned as an empty
//! result. `CoreError` exists for the handful of cases callers need to
//! distinguish explicitly (invalid arguments, node/symbol lookup misses,
//! i/o).

use thiserror::Error;

/// Errors surfaced by the core data model and shared by downstream crates.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A request coordinate was negative or otherwise out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A URI could not be parsed or resolved to a filesystem path.
    #[error("invalid uri: {0}")]
    InvalidUri(String),

    /// No AST node covers the requested position.
    #[error("no node at the requested position")]
    NodeNotFound,

    /// A reference could not be resolved locally, globally, or via classpath.
    #[error("symbol not found")]
    SymbolNotFound,

    /// Resolution revisited a node already on the resolution stack.
    #[error("circular reference during resolution")]
    CircularReference,

    /// The class was found on the classpath but no openable source exists.
    #[error("no source available on classpath for {0}")]
    ClasspathMiss(String),

    /// No worker supports the requested version and feature set.
    #[error("no worker available for the requested version/features")]
    WorkerUnavailable,

    /// Disk read failure while loading a `SourceFile`.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, CoreError>;
