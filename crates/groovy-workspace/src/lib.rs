//! Compilation context discovery, dependency resolution, the AST cache,
//! and the incremental Workspace Compilation Engine (spec.md §4.2-§4.7,
//! §4.9).
//!
//! This crate depends on `groovy-resolve` for symbol index construction
//! and implements `groovy-resolve`'s `WorkspaceView`/`ClasspathNavigator`
//! traits over its own published state, rather than the other way
//! around — `groovy-resolve` never depends on this crate.

pub mod cache;
pub mod context;
pub mod engine;
pub mod error;
pub mod resolver;

pub use cache::{AstCache, CachedUnit};
pub use context::ContextManager;
pub use engine::{DiagnosticsByUri, EngineWorkspaceView, RegistryClasspathNavigator, WorkspaceEngine};
pub use error::{Result, WorkspaceError};
pub use resolver::{CancellationToken, DependencyResolution, DependencyResolver, ResolverRegistry};
