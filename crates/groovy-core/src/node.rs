//! The arena-based AST.
//!
//! Per the design notes, the parsed tree is an arena: every `Node`
//! references its parent and children by `NodeId` index into the owning
//! `Module`'s `Vec<Node>`, never by pointer. This keeps ownership a tree
//! (the `Module` owns the `Vec`) while still letting the visitor and the
//! symbol index hold cheap, copyable cross-references.

use crate::position::Range;
use std::path::PathBuf;

/// An index into a `Module`'s node arena. `0` is always the module root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: Self = Self(0);
}

/// The kind of a parsed AST node, carrying kind-specific payload the
/// resolver and query providers need (the "pragmatic subset" from
/// SPEC_FULL.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Module,
    PackageDecl { name: String },
    ImportDecl { target: String, alias: Option<String>, is_star: bool, is_static: bool },
    ClassDecl { name: String, kind: ClassKind, extends: Vec<String>, implements: Vec<String> },
    MethodDecl { name: String, return_type: Option<String>, param_count: usize, is_static: bool, visibility: Visibility },
    ConstructorDecl { param_count: usize },
    FieldDecl { name: String, declared_type: Option<String>, is_static: bool, visibility: Visibility },
    PropertyDecl { name: String, declared_type: Option<String> },
    Parameter { name: String, declared_type: Option<String>, index: usize },
    VariableDecl { name: String, declared_type: Option<String> },
    Block,
    IfStmt,
    ForStmt,
    WhileStmt,
    TryStmt,
    CatchClause { exception_type: Option<String>, variable: String },
    ClosureExpr { implicit_it: bool },
    MethodCallExpr { method_name: String, arg_count: usize },
    PropertyAccessExpr { property_name: String },
    BinaryExpr { op: String },
    AssignmentExpr { target_name: Option<String> },
    VariableExpr { name: String },
    ConstantExpr { literal: Literal },
    GStringExpr,
    ListExpr,
    MapExpr,
    ClassReferenceExpr { name: String },
    Unknown,
}

/// The four Groovy type-declaration flavors the front-end distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
    PackagePrivate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// One node of the parsed tree plus its tree-structural links.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub range: Range,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    /// Nodes with an invalid coordinate are excluded from position
    /// queries, but are still reachable through references (spec'd).
    pub fn has_valid_position(&self) -> bool {
        self.range.is_valid()
    }
}

/// The parsed root of one compilation unit. Immutable once produced —
/// a recompile of the same URI produces a brand-new `Module`, never a
/// mutation of this one.
#[derive(Debug, Clone)]
pub struct Module {
    pub uri: tower_lsp_server::lsp_types::Uri,
    pub path: Option<PathBuf>,
    arena: Vec<Node>,
}

impl Module {
    /// Builds a module whose arena contains only the root `Module` node.
    /// Parsers append to the arena via `push`.
    pub fn new(uri: tower_lsp_server::lsp_types::Uri, path: Option<PathBuf>, root_range: Range) -> Self {
        let root = Node {
            id: NodeId::ROOT,
            kind: NodeKind::Module,
            range: root_range,
            parent: None,
            children: Vec::new(),
        };
        Self { uri, path, arena: vec![root] }
    }

    /// Appends a new node as a child of `parent`, returning its id.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, range: Range) -> NodeId {
        let id = NodeId(self.arena.len() as u32);
        self.arena.push(Node { id, kind, range, parent: Some(parent), children: Vec::new() });
        if let Some(p) = self.arena.get_mut(parent.0 as usize) {
            p.children.push(id);
        }
        id
    }

    pub fn root(&self) -> &Node {
        &self.arena[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0 as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id.0 as usize)
    }

    /// Moves `child` from its current parent's child list to `new_parent`'s.
    ///
    /// The parser pushes a prefix expression before it knows whether a
    /// following token (a binary operator, a `.`, a call) will wrap it in
    /// an outer node; `reparent` fixes up the tree once that outer node
    /// exists, without needing a lookahead-and-rebuild pass.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        if let Some(old_parent) = self.arena.get(child.0 as usize).and_then(|n| n.parent) {
            if let Some(old) = self.arena.get_mut(old_parent.0 as usize) {
                old.children.retain(|&c| c != child);
            }
        }
        if let Some(node) = self.arena.get_mut(child.0 as usize) {
            node.parent = Some(new_parent);
        }
        if let Some(parent_node) = self.arena.get_mut(new_parent.0 as usize) {
            parent_node.children.push(child);
        }
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// All nodes in the arena, in insertion (pre-order) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.arena.iter()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn uri() -> tower_lsp_server::lsp_types::Uri {
        "file:///tmp/a.groovy".parse().unwrap()
    }

    #[test]
    fn pushed_nodes_are_linked_to_their_parent() {
        let mut module = Module::new(uri(), None, Range::new(Position::new(1, 1), Position::new(1, 1)));
        let class_id = module.push(
            NodeId::ROOT,
            NodeKind::ClassDecl {
                name: "Foo".into(),
                kind: ClassKind::Class,
                extends: vec![],
                implements: vec![],
            },
            Range::new(Position::new(1, 1), Position::new(3, 1)),
        );
        assert_eq!(module.parent_of(class_id), Some(NodeId::ROOT));
        assert_eq!(module.children_of(NodeId::ROOT), &[class_id]);
    }

    #[test]
    fn invalid_position_nodes_are_flagged() {
        let mut module = Module::new(uri(), None, Range::new(Position::new(1, 1), Position::new(1, 1)));
        let id = module.push(
            NodeId::ROOT,
            NodeKind::Unknown,
            Range::new(Position::new(0, 0), Position::new(0, 0)),
        );
        assert!(!module.get(id).unwrap().has_valid_position());
    }
}
