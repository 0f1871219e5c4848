//! Symbol Index construction (spec.md §4.11).
//!
//! Building an index from a visitor is a pure function: for each node the
//! visitor emitted, derive zero or one `Symbol` by a type match and add it
//! under the URI's three views. Re-running this over the same
//! `(Module, VisitResult)` always yields a structurally equal index
//! (spec.md §8 "Idempotent re-index").

use groovy_core::node::{Module, NodeKind};
use groovy_core::symbol::{Symbol, SymbolKind};
use groovy_core::symbol_index::SymbolIndex;
use groovy_frontend::VisitResult;

/// Builds a fresh `SymbolIndex` for one `Module`, using `visited` to
/// resolve each node's enclosing class (needed for `owner_class` on
/// members) without re-walking the tree.
pub fn build_index(module: &Module, visited: &VisitResult) -> SymbolIndex {
    let mut index = SymbolIndex::new();
    let package = package_name(module);

    for node in module.nodes() {
        let owner_class = visited
            .enclosing_class
            .get(&node.id)
            .and_then(|id| module.get(*id))
            .and_then(|n| match &n.kind {
                NodeKind::ClassDecl { name, .. } => Some(name.clone()),
                _ => None,
            });

        let symbol = match &node.kind {
            NodeKind::ClassDecl { name, .. } => {
                Some(Symbol::new(name, module.uri.clone(), node.id, SymbolKind::Class { package: package.clone() }))
            }
            NodeKind::MethodDecl { name, param_count, is_static, visibility, .. } => Some(Symbol::new(
                name,
                module.uri.clone(),
                node.id,
                SymbolKind::Method {
                    visibility: *visibility,
                    is_static: *is_static,
                    owner_class,
                    arity: *param_count,
                },
            )),
            NodeKind::FieldDecl { name, is_static, visibility, .. } => Some(Symbol::new(
                name,
                module.uri.clone(),
                node.id,
                SymbolKind::Field { visibility: *visibility, is_static: *is_static, owner_class },
            )),
            NodeKind::PropertyDecl { name, .. } => {
                Some(Symbol::new(name, module.uri.clone(), node.id, SymbolKind::Property { owner_class }))
            }
            NodeKind::Parameter { name, .. } => {
                Some(Symbol::new(name, module.uri.clone(), node.id, SymbolKind::Parameter))
            }
            NodeKind::VariableDecl { name, .. } => {
                Some(Symbol::new(name, module.uri.clone(), node.id, SymbolKind::Variable))
            }
            NodeKind::ImportDecl { target, alias, is_star, is_static } => {
                let name = alias.clone().unwrap_or_else(|| last_segment(target));
                Some(Symbol::new(
                    name,
                    module.uri.clone(),
                    node.id,
                    SymbolKind::Import { is_star: *is_star, is_static: *is_static },
                ))
            }
            _ => None,
        };

        if let Some(symbol) = symbol {
            index.insert(symbol);
        }
    }

    index
}

fn package_name(module: &Module) -> Option<String> {
    module.nodes().find_map(|n| match &n.kind {
        NodeKind::PackageDecl { name } => Some(name.clone()),
        _ => None,
    })
}

fn last_segment(path: &str) -> String {
    path.rsplit('.').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use groovy_frontend::{parse, visit};

    fn uri() -> tower_lsp_server::lsp_types::Uri {
        "file:///tmp/a.groovy".parse().unwrap()
    }

    #[test]
    fn indexes_classes_methods_and_fields() {
        let source = "class Greeter {\n  String name\n  String greet() { \"Hello, ${name}\" }\n}\n";
        let (module, _) = parse(uri(), None, source);
        let visited = visit(&module);
        let index = build_index(&module, &visited);

        assert_eq!(index.by_category(&uri(), "class").len(), 1);
        assert_eq!(index.by_category(&uri(), "property").len(), 1);
        assert_eq!(index.by_category(&uri(), "method").len(), 1);

        let method = &index.by_name(&uri(), "greet")[0];
        match &method.kind {
            SymbolKind::Method { owner_class, .. } => assert_eq!(owner_class.as_deref(), Some("Greeter")),
            _ => panic!("expected Method symbol"),
        }
    }

    #[test]
    fn rebuilding_from_the_same_inputs_is_idempotent() {
        let source = "def x = 1\n";
        let (module, _) = parse(uri(), None, source);
        let visited = visit(&module);
        let a = build_index(&module, &visited);
        let b = build_index(&module, &visited);
        assert_eq!(a, b);
    }

    #[test]
    fn import_alias_is_indexed_under_the_alias_name() {
        let source = "import java.util.ArrayList as AList\n";
        let (module, _) = parse(uri(), None, source);
        let visited = visit(&module);
        let index = build_index(&module, &visited);
        assert_eq!(index.by_name(&uri(), "AList").len(), 1);
    }
}
