//! The Position Finder (spec.md §4.8).
//!
//! Given a 0-based `(line, column)`, returns the smallest AST node whose
//! range covers it, breaking ties with the priority lattice. Always a
//! fresh walk over the `Module`'s arena — there is no separately
//! maintained "position index" to disagree with it, so the documented
//! "prefer the more specific node" rule (spec.md §4.8) holds trivially.

use groovy_core::node::{Module, NodeId, NodeKind};
use groovy_core::position::Position;

/// The priority lattice from spec.md §4.8, highest variant wins ties.
/// `Definition` intentionally includes constant and GString expressions
/// — not just true declarations — so hover prefers the literal under the
/// cursor (documented Open Question, kept as observed behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Priority {
    Literal,
    Reference,
    Call,
    Declaration,
    Definition,
}

fn priority(kind: &NodeKind) -> Priority {
    match kind {
        NodeKind::ClassDecl { .. }
        | NodeKind::MethodDecl { .. }
        | NodeKind::ConstructorDecl { .. }
        | NodeKind::FieldDecl { .. }
        | NodeKind::PropertyDecl { .. }
        | NodeKind::Parameter { .. }
        | NodeKind::ConstantExpr { .. }
        | NodeKind::GStringExpr => Priority::Definition,
        NodeKind::VariableDecl { .. } | NodeKind::AssignmentExpr { .. } => Priority::Declaration,
        NodeKind::MethodCallExpr { .. } => Priority::Call,
        NodeKind::VariableExpr { .. } => Priority::Reference,
        _ => Priority::Literal,
    }
}

/// Accepts a 0-based LSP position and converts to the engine's 1-based
/// coordinates at this boundary (spec.md §4.8).
pub fn find_node_at(module: &Module, line: u32, column: u32) -> Option<NodeId> {
    let pos = Position::from_lsp(tower_lsp_server::lsp_types::Position { line, character: column });
    find_node_at_position(module, pos)
}

pub fn find_node_at_position(module: &Module, pos: Position) -> Option<NodeId> {
    let mut best: Option<(NodeId, i64, Priority)> = None;

    for node in module.nodes() {
        if !node.has_valid_position() || !node.range.contains(pos) {
            continue;
        }
        let metric = node.range.size_metric();
        let prio = priority(&node.kind);

        let replace = match best {
            None => true,
            Some((_, best_metric, best_prio)) => {
                metric < best_metric || (metric == best_metric && prio > best_prio)
            }
        };
        if replace {
            best = Some((node.id, metric, prio));
        }
    }

    best.map(|(id, _, _)| id)
}
