//! Errors at the LSP/CLI boundary — everything that isn't already a
//! `groovy_workspace::WorkspaceError` produced by the engine itself.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LspError {
    #[error(transparent)]
    Workspace(#[from] groovy_workspace::WorkspaceError),

    #[error("invalid uri: {0}")]
    InvalidUri(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LspError>;
