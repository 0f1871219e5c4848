//! Errors surfaced by context discovery, dependency resolution, and the
//! compilation engine. Like `groovy_core::CoreError`, these never abort a
//! running session — callers localize a failure to one context and keep
//! serving the rest (spec.md §4.6 "Failure semantics").

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("i/o error reading {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("dependency resolution failed: {0}")]
    DependencyResolution(String),

    #[error("cannot map uri to a filesystem path: {0}")]
    InvalidUri(String),

    #[error("dependency resolution cancelled")]
    Cancelled,

    #[error(transparent)]
    Core(#[from] groovy_core::error::CoreError),
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;
