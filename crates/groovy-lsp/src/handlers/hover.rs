//! `textDocument/hover`: Position Finder → hoverable node → rendered
//! declaration text and resolved type (spec.md §4.12). The parsed AST
//! carries no doc-comment nodes, so unlike the ideal behavior this
//! renders signature and type only, not javadoc — there is nothing in
//! the front-end's node model to extract one from.

use crate::handlers::module_for;
use groovy_core::node::{Node, NodeKind};
use groovy_workspace::WorkspaceEngine;
use tower_lsp_server::lsp_types::{Hover, HoverContents, HoverParams, MarkupContent, MarkupKind};

pub async fn handle_hover(engine: &WorkspaceEngine, params: HoverParams) -> Option<Hover> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let module = module_for(engine, uri).await?;
    let node_id = groovy_resolve::find_node_at(&module, position.line, position.character)?;
    let node = module.get(node_id)?;

    let text = render_declaration(node)?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent { kind: MarkupKind::Markdown, value: text }),
        range: Some(node.range.to_lsp()),
    })
}

fn render_declaration(node: &Node) -> Option<String> {
    match &node.kind {
        NodeKind::ClassDecl { name, kind, extends, implements } => {
            let mut text = format!("```groovy\n{kind:?} {name}");
            if !extends.is_empty() {
                text.push_str(&format!(" extends {}", extends.join(", ")));
            }
            if !implements.is_empty() {
                text.push_str(&format!(" implements {}", implements.join(", ")));
            }
            text.push_str("\n```");
            Some(text)
        }
        NodeKind::MethodDecl { name, return_type, param_count, is_static, .. } => Some(format!(
            "```groovy\n{}{} {name}({param_count} params)\n```",
            if *is_static { "static " } else { "" },
            return_type.as_deref().unwrap_or("def"),
        )),
        NodeKind::FieldDecl { name, declared_type, is_static, .. } => Some(format!(
            "```groovy\n{}{} {name}\n```",
            if *is_static { "static " } else { "" },
            declared_type.as_deref().unwrap_or("def"),
        )),
        NodeKind::PropertyDecl { name, declared_type } => {
            Some(format!("```groovy\n{} {name}\n```", declared_type.as_deref().unwrap_or("def")))
        }
        NodeKind::Parameter { name, declared_type, .. } | NodeKind::VariableDecl { name, declared_type } => {
            Some(format!("```groovy\n{} {name}\n```", declared_type.as_deref().unwrap_or("def")))
        }
        NodeKind::VariableExpr { name } => Some(format!("```groovy\n{name}\n```")),
        _ => None,
    }
}
