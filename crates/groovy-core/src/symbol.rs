//! Symbols: named, referenceable declarations.

use crate::node::{NodeId, Visibility};
use tower_lsp_server::lsp_types::Uri;

/// Identifies a symbol within a `SymbolIndex`. Symbols are cheap, owning
/// copies — not arena-indexed — since they're derived data rebuilt
/// wholesale whenever the owning `Module` is recompiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// The discriminated record spec'd in SPEC_FULL.md §3. Each variant
/// carries exactly the fields meaningful for it; fields that don't apply
/// to a given kind (e.g. `owner_class` for a top-level `Class`) are left
/// `None` rather than modeled as a shared "maybe" field on every variant.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Field { visibility: Visibility, is_static: bool, owner_class: Option<String> },
    Property { owner_class: Option<String> },
    Method { visibility: Visibility, is_static: bool, owner_class: Option<String>, arity: usize },
    Class { package: Option<String> },
    Import { is_star: bool, is_static: bool },
}

impl SymbolKind {
    pub fn category(&self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::Parameter => "parameter",
            Self::Field { .. } => "field",
            Self::Property { .. } => "property",
            Self::Method { .. } => "method",
            Self::Class { .. } => "class",
            Self::Import { .. } => "import",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub uri: Uri,
    pub defining_node: NodeId,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(name: impl Into<String>, uri: Uri, defining_node: NodeId, kind: SymbolKind) -> Self {
        Self { name: name.into(), uri, defining_node, kind }
    }

    pub fn category(&self) -> &'static str {
        self.kind.category()
    }
}
