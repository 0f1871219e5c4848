//! The Definition Resolver (spec.md §4.10).
//!
//! Resolves an arbitrary reference node to its defining node through a
//! local → global → classpath fallback chain. The global and classpath
//! steps are expressed against small traits (`WorkspaceView`,
//! `ClasspathNavigator`) rather than concrete `groovy-workspace` types, so
//! this crate never depends on the crate that depends on it — the
//! workspace engine implements both traits over its published snapshots
//! and its `DependencyResolver` registry.

use groovy_core::error::{CoreError, Result};
use groovy_core::node::{Module, NodeId, NodeKind};
use groovy_core::position::Position;
use groovy_core::symbol::SymbolKind;
use groovy_core::symbol_index::SymbolIndex;
use std::sync::Arc;
use tower_lsp_server::lsp_types::Uri;

use crate::position_finder::find_node_at_position;

/// The outcome of a successful definition resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionResult {
    Source { uri: Uri, node: NodeId },
    Binary { uri: Uri, symbol_name: String },
}

/// What the classpath lookup found for a class name, per spec.md §4.10
/// step 4: only a plain `file:` URI is navigable; `jar:`/`jrt:` without
/// extracted sources yields "no result" rather than a fabricated location
/// (documented Open Question — do not invent a disassembly view).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClasspathOutcome {
    Source { uri: Uri },
    NoResult,
}

/// Read access to compiled modules and indexed symbols across the whole
/// workspace, as published by the Workspace Compilation Engine.
pub trait WorkspaceView {
    fn module(&self, uri: &Uri) -> Option<Arc<Module>>;
    fn symbol_index(&self, uri: &Uri) -> Option<Arc<SymbolIndex>>;
    /// All URIs with at least one indexed class symbol, for the global
    /// lookup scan (spec.md §4.10 step 3).
    fn uris_with_classes(&self) -> Vec<Uri>;
}

/// Classpath-backed class lookup (spec.md §4.10 step 4), implemented over
/// the Dependency Resolver Registry's `local_repository()`.
pub trait ClasspathNavigator {
    fn resolve_class(&self, class_name: &str) -> ClasspathOutcome;
}

/// Resolves the reference at `position` in `uri`. `stack` tracks nodes
/// already visited in this resolution chain so a cycle (spec.md §7
/// *circular-reference*) is detected rather than looping forever.
pub fn resolve_definition(
    workspace: &dyn WorkspaceView,
    classpath: &dyn ClasspathNavigator,
    uri: &Uri,
    position: Position,
) -> Result<DefinitionResult> {
    let module = workspace.module(uri).ok_or(CoreError::NodeNotFound)?;
    let target = find_node_at_position(&module, position).ok_or(CoreError::NodeNotFound)?;

    let mut stack = Vec::new();
    resolve_node(workspace, classpath, &module, uri, target, &mut stack)
}

fn resolve_node(
    workspace: &dyn WorkspaceView,
    classpath: &dyn ClasspathNavigator,
    module: &Module,
    uri: &Uri,
    target: NodeId,
    stack: &mut Vec<NodeId>,
) -> Result<DefinitionResult> {
    if stack.contains(&target) {
        return Err(CoreError::CircularReference);
    }
    stack.push(target);

    let outcome = local_resolve(workspace, module, uri, target, stack)?;

    let needs_global = match &outcome {
        LocalOutcome::NotFound => true,
        LocalOutcome::Resolved(node) => {
            matches!(module.get(*node).map(|n| &n.kind), Some(NodeKind::ImportDecl { .. }))
        }
        LocalOutcome::ClassRefFallback { .. } => true,
    };

    if !needs_global {
        let LocalOutcome::Resolved(node) = outcome else { unreachable!() };
        return Ok(DefinitionResult::Source { uri: uri.clone(), node });
    }

    let class_name = match &outcome {
        LocalOutcome::ClassRefFallback { name } => Some(name.clone()),
        LocalOutcome::Resolved(node) => import_target_name(module, *node),
        LocalOutcome::NotFound => node_name_hint(module, target),
    };

    if let Some(name) = class_name.as_deref()
        && let Some(result) = global_lookup(workspace, name)
    {
        return Ok(result);
    }

    if let Some(name) = class_name.as_deref() {
        match classpath.resolve_class(name) {
            ClasspathOutcome::Source { uri: source_uri } => {
                return Ok(DefinitionResult::Binary { uri: source_uri, symbol_name: name.to_string() });
            }
            ClasspathOutcome::NoResult => {}
        }
    }

    Err(CoreError::SymbolNotFound)
}

enum LocalOutcome {
    Resolved(NodeId),
    /// A `ClassReferenceExpr` whose class name doesn't resolve to a
    /// declaration in this file — "a ClassNode not declared in the
    /// current file" (spec.md §4.10 step 3).
    ClassRefFallback { name: String },
    NotFound,
}

fn local_resolve(
    workspace: &dyn WorkspaceView,
    module: &Module,
    uri: &Uri,
    target: NodeId,
    stack: &mut Vec<NodeId>,
) -> Result<LocalOutcome> {
    let Some(node) = module.get(target) else { return Ok(LocalOutcome::NotFound) };
    let index = workspace.symbol_index(uri);

    let find_named = |name: &str, want: &dyn Fn(&SymbolKind) -> bool| -> Option<NodeId> {
        index.as_ref()?.by_name(uri, name).iter().find(|s| want(&s.kind)).map(|s| s.defining_node)
    };

    match &node.kind {
        NodeKind::VariableExpr { name } => {
            let found = find_named(name, &|k| matches!(k, SymbolKind::Variable | SymbolKind::Parameter));
            Ok(found.map_or(LocalOutcome::NotFound, LocalOutcome::Resolved))
        }
        NodeKind::MethodCallExpr { method_name, arg_count } => {
            let candidates: Vec<_> = index
                .as_ref()
                .map(|idx| idx.by_name(uri, method_name).to_vec())
                .unwrap_or_default()
                .into_iter()
                .filter(|s| matches!(s.kind, SymbolKind::Method { .. }))
                .collect();
            let best = candidates
                .iter()
                .find(|s| matches!(&s.kind, SymbolKind::Method { arity, .. } if arity == arg_count))
                .or_else(|| candidates.first());
            Ok(best.map_or(LocalOutcome::NotFound, |s| LocalOutcome::Resolved(s.defining_node)))
        }
        NodeKind::ClassReferenceExpr { name } => {
            let found = find_named(name, &|k| matches!(k, SymbolKind::Class { .. }));
            Ok(match found {
                Some(node) => LocalOutcome::Resolved(node),
                None => LocalOutcome::ClassRefFallback { name: name.clone() },
            })
        }
        NodeKind::PropertyAccessExpr { property_name } => {
            if let Some(field) = find_named(property_name, &|k| matches!(k, SymbolKind::Field { .. })) {
                return Ok(LocalOutcome::Resolved(field));
            }
            let getter = getter_name(property_name);
            let found = find_named(&getter, &|k| matches!(k, SymbolKind::Method { .. }));
            Ok(found.map_or(LocalOutcome::NotFound, LocalOutcome::Resolved))
        }
        NodeKind::AssignmentExpr { target_name: Some(name) } => {
            let found = find_named(name, &|k| matches!(k, SymbolKind::Variable));
            Ok(found.map_or(LocalOutcome::NotFound, LocalOutcome::Resolved))
        }
        NodeKind::Parameter { .. }
        | NodeKind::MethodDecl { .. }
        | NodeKind::ConstructorDecl { .. }
        | NodeKind::FieldDecl { .. }
        | NodeKind::PropertyDecl { .. }
        | NodeKind::ImportDecl { .. }
        | NodeKind::VariableDecl { .. } => Ok(LocalOutcome::Resolved(target)),
        NodeKind::ConstantExpr { .. } => {
            let Some(parent) = module.parent_of(target) else { return Ok(LocalOutcome::NotFound) };
            match resolve_node(workspace, &NoClasspath, module, uri, parent, stack) {
                Ok(DefinitionResult::Source { node, .. }) => Ok(LocalOutcome::Resolved(node)),
                _ => Ok(LocalOutcome::NotFound),
            }
        }
        _ => Ok(LocalOutcome::NotFound),
    }
}

/// A no-op classpath navigator used only for the `ConstantExpr` delegate
/// step above, which never needs to escape the current file.
struct NoClasspath;
impl ClasspathNavigator for NoClasspath {
    fn resolve_class(&self, _class_name: &str) -> ClasspathOutcome {
        ClasspathOutcome::NoResult
    }
}

/// Groovy's implicit property-to-getter naming convention.
fn getter_name(property_name: &str) -> String {
    let mut chars = property_name.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
        None => "get".to_string(),
    }
}

fn import_target_name(module: &Module, node: NodeId) -> Option<String> {
    match &module.get(node)?.kind {
        NodeKind::ImportDecl { target, .. } => Some(target.rsplit('.').next().unwrap_or(target).to_string()),
        _ => None,
    }
}

fn node_name_hint(module: &Module, node: NodeId) -> Option<String> {
    match &module.get(node)?.kind {
        NodeKind::ClassReferenceExpr { name } | NodeKind::VariableExpr { name } => Some(name.clone()),
        NodeKind::ImportDecl { target, .. } => Some(target.rsplit('.').next().unwrap_or(target).to_string()),
        _ => None,
    }
}

/// Scans every indexed context for a `Class` symbol named `name`,
/// returning the first hit's `(uri, node)` as a `Source` result
/// (spec.md §4.10 step 3 — "on hit, loads the ClassNode from the AST
/// cache", which `WorkspaceView::module` does transparently).
fn global_lookup(workspace: &dyn WorkspaceView, name: &str) -> Option<DefinitionResult> {
    for candidate_uri in workspace.uris_with_classes() {
        let Some(index) = workspace.symbol_index(&candidate_uri) else { continue };
        if let Some(symbol) = index.by_category(&candidate_uri, "class").iter().find(|s| s.name == name) {
            return Some(DefinitionResult::Source { uri: candidate_uri, node: symbol.defining_node });
        }
    }
    None
}
