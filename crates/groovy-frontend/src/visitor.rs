//! The AST Visitor / Relationship Tracker (SPEC_FULL.md §4.5).
//!
//! The arena already carries parent/child links; this pass derives the
//! higher-level relationships the symbol builder and position finder need
//! without re-walking the tree themselves: the pre-order node sequence,
//! the file's top-level class declarations, its method/constructor
//! declarations, and a node's nearest enclosing class. The walk is
//! deterministic because `Module`'s arena is itself append-only in
//! parse (pre-order) order.

use groovy_core::node::{Module, NodeId, NodeKind};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct VisitResult {
    pub preorder: Vec<NodeId>,
    pub classes: Vec<NodeId>,
    pub methods: Vec<NodeId>,
    pub enclosing_class: HashMap<NodeId, NodeId>,
}

pub fn visit(module: &Module) -> VisitResult {
    let mut result = VisitResult::default();
    let mut class_stack: Vec<NodeId> = Vec::new();

    for node in module.nodes() {
        result.preorder.push(node.id);

        // Pop any classes we've walked out of: `node`'s parent chain no
        // longer contains the top of the stack.
        while let Some(&top) = class_stack.last() {
            if is_descendant_of(module, node.id, top) || node.id == top {
                break;
            }
            class_stack.pop();
        }

        if let Some(&enclosing) = class_stack.last() {
            result.enclosing_class.insert(node.id, enclosing);
        }

        match &node.kind {
            NodeKind::ClassDecl { .. } => {
                result.classes.push(node.id);
                class_stack.push(node.id);
            }
            NodeKind::MethodDecl { .. } | NodeKind::ConstructorDecl { .. } => {
                result.methods.push(node.id);
            }
            _ => {}
        }
    }

    result
}

fn is_descendant_of(module: &Module, node: NodeId, ancestor: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = module.parent_of(id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn uri() -> tower_lsp_server::lsp_types::Uri {
        "file:///tmp/a.groovy".parse().unwrap()
    }

    #[test]
    fn tracks_enclosing_class_for_methods_and_fields() {
        let source = "class Foo {\n  int bar() {\n    return 1\n  }\n}\n";
        let (module, diags) = parse(uri(), None, source);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        let result = visit(&module);
        assert_eq!(result.classes.len(), 1);
        assert_eq!(result.methods.len(), 1);
        let method_id = result.methods[0];
        assert_eq!(result.enclosing_class.get(&method_id), Some(&result.classes[0]));
    }

    #[test]
    fn preorder_matches_arena_insertion_order() {
        let source = "class Foo {\n  def x\n}\n";
        let (module, _) = parse(uri(), None, source);
        let result = visit(&module);
        let arena_order: Vec<NodeId> = module.nodes().map(|n| n.id).collect();
        assert_eq!(result.preorder, arena_order);
    }

    #[test]
    fn top_level_statements_have_no_enclosing_class() {
        let source = "def x = 1\nprintln x\n";
        let (module, _) = parse(uri(), None, source);
        let result = visit(&module);
        assert!(result.classes.is_empty());
        assert!(result.enclosing_class.is_empty());
    }
}
