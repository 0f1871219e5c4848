//! Symbol index construction, the position finder, and the definition
//! resolver — the read-side query engine over a compiled `Module`
//! (SPEC_FULL.md §4.8-§4.11).
//!
//! This crate depends only on `groovy-core` and `groovy-frontend`. It
//! never depends on `groovy-workspace`, even though the definition
//! resolver's global and classpath lookups conceptually need
//! workspace-wide state: `definition::WorkspaceView` and
//! `definition::ClasspathNavigator` are the seam `groovy-workspace`
//! implements instead, so the dependency edge only ever points one way.

pub mod definition;
pub mod position_finder;
pub mod symbol_builder;

pub use definition::{ClasspathNavigator, ClasspathOutcome, DefinitionResult, WorkspaceView, resolve_definition};
pub use position_finder::{find_node_at, find_node_at_position};
pub use symbol_builder::build_index;
