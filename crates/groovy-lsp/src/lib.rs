//! Session/Lifecycle and Query Providers: the `tower-lsp-server` wire-up
//! around `groovy-workspace`'s engine and `groovy-resolve`'s query
//! algorithms (spec.md §2 "Session / Lifecycle", §4.12).

pub mod config;
pub mod document;
pub mod document_lifecycle;
pub mod error;
pub mod handlers;
pub mod progress;
pub mod server;

pub use error::{LspError, Result};
pub use server::Backend;
