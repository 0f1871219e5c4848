//! Recursive-descent parser over the token stream, building a
//! `groovy_core::Module` arena directly (SPEC_FULL.md §4.4).
//!
//! Syntax errors never abort the parse: on an unexpected token the parser
//! records a diagnostic, synchronizes to the next recovery point (a
//! statement terminator or a closing brace), and keeps going. The AST for
//! everything parsed before and after the error is kept.

use crate::token::{Token, TokenKind};
use groovy_core::diagnostic::{Diagnostic, Severity};
use groovy_core::node::{ClassKind, Literal, Module, NodeId, NodeKind, Visibility};
use groovy_core::position::{Position, Range};
use std::path::PathBuf;
use tower_lsp_server::lsp_types::Uri;

pub fn parse(uri: Uri, path: Option<PathBuf>, source: &str) -> (Module, Vec<Diagnostic>) {
    let tokens = crate::lexer::tokenize(source);
    Parser::new(uri, path, tokens).run()
}

struct Modifiers {
    visibility: Visibility,
    is_static: bool,
    is_abstract: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self { visibility: Visibility::PackagePrivate, is_static: false, is_abstract: false }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    module: Module,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    fn new(uri: Uri, path: Option<PathBuf>, tokens: Vec<Token>) -> Self {
        let end = tokens.last().map(|t| Position::new(t.line, t.column)).unwrap_or(Position::new(1, 1));
        let module = Module::new(uri, path, Range::new(Position::new(1, 1), end));
        Self { tokens, pos: 0, module, diagnostics: Vec::new() }
    }

    fn run(mut self) -> (Module, Vec<Diagnostic>) {
        self.skip_separators();
        while !self.at_eof() {
            self.parse_top_level_item(NodeId::ROOT);
            self.skip_separators();
        }
        (self.module, self.diagnostics)
    }

    // --- token stream plumbing -------------------------------------------------

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn pos_start(&self) -> Position {
        let t = self.peek_token();
        Position::new(t.line, t.column)
    }

    fn pos_end_of_prev(&self) -> Position {
        let idx = self.pos.saturating_sub(1).min(self.tokens.len() - 1);
        let t = &self.tokens[idx];
        Position::new(t.end_line, t.end_column)
    }

    fn range_from(&self, start: Position) -> Range {
        Range::new(start, self.pos_end_of_prev())
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Semicolon | TokenKind::Newline) {
            self.advance();
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let start = self.pos_start();
        let range = Range::new(start, Position::new(start.line, start.column + 1));
        self.diagnostics.push(Diagnostic::new(range, Severity::Error, message.into()).with_code("syntax"));
    }

    /// Consumes `kind` if present; otherwise emits a diagnostic and leaves
    /// the cursor where it is so the caller can attempt to recover.
    fn expect(&mut self, kind: &TokenKind, what: &str) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        if let TokenKind::Ident(name) = self.peek().clone() {
            self.advance();
            Some(name)
        } else {
            self.error("expected identifier");
            None
        }
    }

    /// Skips forward to the next statement terminator or closing brace,
    /// without consuming the closing brace itself.
    fn synchronize(&mut self) {
        loop {
            match self.peek() {
                TokenKind::Semicolon | TokenKind::Newline => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // --- top level ---------------------------------------------------------

    fn parse_top_level_item(&mut self, parent: NodeId) {
        match self.peek() {
            TokenKind::Package => self.parse_package_decl(parent),
            TokenKind::Import => self.parse_import_decl(parent),
            TokenKind::Class | TokenKind::Interface | TokenKind::Trait | TokenKind::Enum => {
                self.parse_type_decl(parent, Modifiers::default());
            }
            TokenKind::Public | TokenKind::Private | TokenKind::Protected | TokenKind::Static | TokenKind::Abstract | TokenKind::Final => {
                let modifiers = self.parse_modifiers();
                if matches!(self.peek(), TokenKind::Class | TokenKind::Interface | TokenKind::Trait | TokenKind::Enum) {
                    self.parse_type_decl(parent, modifiers);
                } else {
                    self.parse_statement(parent);
                }
            }
            _ => self.parse_statement(parent),
        }
    }

    fn parse_package_decl(&mut self, parent: NodeId) {
        let start = self.pos_start();
        self.advance(); // package
        let name = self.parse_dotted_name();
        let range = self.range_from(start);
        self.module.push(parent, NodeKind::PackageDecl { name }, range);
    }

    fn parse_import_decl(&mut self, parent: NodeId) {
        let start = self.pos_start();
        self.advance(); // import
        let is_static = if self.at(&TokenKind::Static) {
            self.advance();
            true
        } else {
            false
        };
        let mut target = self.parse_dotted_name();
        let mut is_star = false;
        if self.at(&TokenKind::Dot) && matches!(self.peek_at(1), TokenKind::Star) {
            self.advance();
            self.advance();
            is_star = true;
            target.push_str(".*");
        }
        let alias = if matches!(self.peek(), TokenKind::As) {
            self.advance();
            self.ident()
        } else {
            None
        };
        let range = self.range_from(start);
        self.module.push(parent, NodeKind::ImportDecl { target, alias, is_star, is_static }, range);
    }

    fn parse_dotted_name(&mut self) -> String {
        let mut parts = Vec::new();
        if let Some(first) = self.ident() {
            parts.push(first);
        }
        while self.at(&TokenKind::Dot) && matches!(self.peek_at(1), TokenKind::Ident(_)) {
            self.advance();
            if let Some(part) = self.ident() {
                parts.push(part);
            }
        }
        parts.join(".")
    }

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        loop {
            match self.peek() {
                TokenKind::Public => {
                    modifiers.visibility = Visibility::Public;
                    self.advance();
                }
                TokenKind::Private => {
                    modifiers.visibility = Visibility::Private;
                    self.advance();
                }
                TokenKind::Protected => {
                    modifiers.visibility = Visibility::Protected;
                    self.advance();
                }
                TokenKind::Static => {
                    modifiers.is_static = true;
                    self.advance();
                }
                TokenKind::Abstract => {
                    modifiers.is_abstract = true;
                    self.advance();
                }
                TokenKind::Final => {
                    self.advance();
                }
                _ => break,
            }
        }
        modifiers
    }

    // --- type declarations ---------------------------------------------------

    fn parse_type_decl(&mut self, parent: NodeId, _modifiers: Modifiers) {
        let start = self.pos_start();
        let kind = match self.advance().kind {
            TokenKind::Class => ClassKind::Class,
            TokenKind::Interface => ClassKind::Interface,
            TokenKind::Trait => ClassKind::Trait,
            TokenKind::Enum => ClassKind::Enum,
            _ => ClassKind::Class,
        };
        let name = self.ident().unwrap_or_default();

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        if self.at(&TokenKind::Extends) {
            self.advance();
            extends.push(self.parse_dotted_name());
            while self.at(&TokenKind::Comma) {
                self.advance();
                extends.push(self.parse_dotted_name());
            }
        }
        if self.at(&TokenKind::Implements) {
            self.advance();
            implements.push(self.parse_dotted_name());
            while self.at(&TokenKind::Comma) {
                self.advance();
                implements.push(self.parse_dotted_name());
            }
        }

        let header_end = self.pos_end_of_prev();
        let class_id = self.module.push(
            parent,
            NodeKind::ClassDecl { name: name.clone(), kind, extends, implements },
            Range::new(start, header_end),
        );

        if !self.expect(&TokenKind::LBrace, "'{' to open type body") {
            self.synchronize();
            return;
        }
        self.skip_separators();
        while !self.at(&TokenKind::RBrace) && !self.at_eof() {
            self.parse_member(class_id, &name);
            self.skip_separators();
        }
        if self.at(&TokenKind::RBrace) {
            self.advance();
        } else {
            self.error("expected '}' to close type body");
        }
        let full_range = Range::new(start, self.pos_end_of_prev());
        if let Some(node) = self.module_node_mut(class_id) {
            node.range = full_range;
        }
    }

    fn module_node_mut(&mut self, id: NodeId) -> Option<&mut groovy_core::node::Node> {
        // The arena grows append-only, so `id` always refers to an already
        // pushed node by the time a caller widens its range.
        self.module.node_mut(id)
    }

    fn parse_member(&mut self, class_id: NodeId, class_name: &str) {
        let start = self.pos_start();
        let modifiers = self.parse_modifiers();

        // Constructor: `ClassName(...)`.
        if let TokenKind::Ident(name) = self.peek().clone() {
            if name == class_name && matches!(self.peek_at(1), TokenKind::LParen) {
                self.advance();
                let param_count = self.parse_param_list(class_id, start);
                let ctor_id = self.module.push(class_id, NodeKind::ConstructorDecl { param_count }, self.range_from(start));
                self.parse_optional_body(ctor_id);
                if let Some(node) = self.module_node_mut(ctor_id) {
                    node.range = self.range_from(start);
                }
                return;
            }
        }

        let declared_type = self.parse_optional_type();

        let Some(name) = self.ident() else {
            self.synchronize();
            return;
        };

        if self.at(&TokenKind::LParen) {
            let method_id = self.module.push(
                class_id,
                NodeKind::MethodDecl {
                    name,
                    return_type: declared_type,
                    param_count: 0,
                    is_static: modifiers.is_static,
                    // Groovy methods default to public when no explicit
                    // modifier is given, unlike bare fields (which default
                    // to property semantics instead of package-private).
                    visibility: if modifiers.visibility == Visibility::PackagePrivate {
                        Visibility::Public
                    } else {
                        modifiers.visibility
                    },
                },
                self.range_from(start),
            );
            let param_count = self.parse_param_list(method_id, start);
            if let NodeKind::MethodDecl { param_count: pc, .. } = &mut self.module_node_mut(method_id).unwrap().kind {
                *pc = param_count;
            }
            self.parse_optional_body(method_id);
            let range = self.range_from(start);
            if let Some(node) = self.module_node_mut(method_id) {
                node.range = range;
            }
            return;
        }

        // Field or property.
        if self.at(&TokenKind::Assign) {
            self.advance();
            let _ = self.parse_expression(class_id);
        }
        let range = self.range_from(start);
        let is_field = modifiers.visibility != Visibility::PackagePrivate || modifiers.is_static;
        if is_field {
            self.module.push(
                class_id,
                NodeKind::FieldDecl {
                    name,
                    declared_type,
                    is_static: modifiers.is_static,
                    visibility: modifiers.visibility,
                },
                range,
            );
        } else {
            self.module.push(class_id, NodeKind::PropertyDecl { name, declared_type }, range);
        }
    }

    fn parse_optional_type(&mut self) -> Option<String> {
        match self.peek().clone() {
            TokenKind::Def => {
                self.advance();
                None
            }
            TokenKind::Ident(name) => {
                // Only consume as a type if followed by another identifier
                // (the declaration's name) — otherwise this identifier *is*
                // the name of a dynamically-typed declaration.
                if matches!(self.peek_at(1), TokenKind::Ident(_)) {
                    self.advance();
                    Some(name)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn parse_param_list(&mut self, parent: NodeId, _owner_start: Position) -> usize {
        if !self.expect(&TokenKind::LParen, "'(' to start parameter list") {
            return 0;
        }
        let mut count = 0usize;
        while !self.at(&TokenKind::RParen) && !self.at_eof() {
            let pstart = self.pos_start();
            let declared_type = self.parse_optional_type();
            let Some(name) = self.ident() else {
                self.synchronize();
                break;
            };
            if self.at(&TokenKind::Assign) {
                self.advance();
                let _ = self.parse_expression(parent);
            }
            self.module.push(parent, NodeKind::Parameter { name, declared_type, index: count }, self.range_from(pstart));
            count += 1;
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' to close parameter list");
        count
    }

    /// A body is either a `{ ... }` block or, for abstract/interface
    /// members, absent (terminated by `;`/newline).
    fn parse_optional_body(&mut self, parent: NodeId) {
        self.skip_separators_keep_brace();
        if self.at(&TokenKind::LBrace) {
            self.parse_block(parent);
        }
    }

    fn skip_separators_keep_brace(&mut self) {
        while matches!(self.peek(), TokenKind::Semicolon) {
            self.advance();
        }
    }

    // --- statements ---------------------------------------------------------

    fn parse_block(&mut self, parent: NodeId) -> NodeId {
        let start = self.pos_start();
        self.advance(); // {
        let block_id = self.module.push(parent, NodeKind::Block, self.range_from(start));
        self.skip_separators();
        while !self.at(&TokenKind::RBrace) && !self.at_eof() {
            self.parse_statement(block_id);
            self.skip_separators();
        }
        if self.at(&TokenKind::RBrace) {
            self.advance();
        } else {
            self.error("expected '}' to close block");
        }
        let range = self.range_from(start);
        if let Some(node) = self.module_node_mut(block_id) {
            node.range = range;
        }
        block_id
    }

    fn parse_statement(&mut self, parent: NodeId) {
        match self.peek() {
            TokenKind::LBrace => {
                self.parse_block(parent);
            }
            TokenKind::If => self.parse_if(parent),
            TokenKind::For => self.parse_for(parent),
            TokenKind::While => self.parse_while(parent),
            TokenKind::Try => self.parse_try(parent),
            TokenKind::Return => {
                let start = self.pos_start();
                self.advance();
                if !matches!(self.peek(), TokenKind::Semicolon | TokenKind::Newline | TokenKind::RBrace | TokenKind::Eof) {
                    self.parse_expression(parent);
                }
                let _ = start;
            }
            TokenKind::Def => self.parse_variable_decl(parent),
            TokenKind::Ident(_) if self.looks_like_typed_decl() => self.parse_variable_decl(parent),
            TokenKind::Class | TokenKind::Interface | TokenKind::Trait | TokenKind::Enum => {
                self.parse_type_decl(parent, Modifiers::default());
            }
            TokenKind::Semicolon | TokenKind::Newline => {
                self.advance();
            }
            TokenKind::RBrace | TokenKind::Eof => {}
            _ => {
                self.parse_expression(parent);
            }
        }
    }

    /// Heuristic: `Ident Ident` at statement start is a typed local
    /// declaration (`String name = ...`); a bare `Ident` starting an
    /// expression statement is not.
    fn looks_like_typed_decl(&self) -> bool {
        matches!(self.peek_at(1), TokenKind::Ident(_))
    }

    fn parse_variable_decl(&mut self, parent: NodeId) {
        let start = self.pos_start();
        let declared_type = self.parse_optional_type();
        let Some(name) = self.ident() else {
            self.synchronize();
            return;
        };
        let var_id = self.module.push(parent, NodeKind::VariableDecl { name, declared_type }, self.range_from(start));
        if self.at(&TokenKind::Assign) {
            self.advance();
            self.parse_expression(var_id);
        }
        let range = self.range_from(start);
        if let Some(node) = self.module_node_mut(var_id) {
            node.range = range;
        }
    }

    fn parse_if(&mut self, parent: NodeId) {
        let start = self.pos_start();
        self.advance(); // if
        let if_id = self.module.push(parent, NodeKind::IfStmt, self.range_from(start));
        if self.expect(&TokenKind::LParen, "'(' after 'if'") {
            self.parse_expression(if_id);
            self.expect(&TokenKind::RParen, "')' to close condition");
        }
        self.parse_statement(if_id);
        self.skip_separators();
        if self.at(&TokenKind::Else) {
            self.advance();
            self.parse_statement(if_id);
        }
        let range = self.range_from(start);
        if let Some(node) = self.module_node_mut(if_id) {
            node.range = range;
        }
    }

    fn parse_for(&mut self, parent: NodeId) {
        let start = self.pos_start();
        self.advance(); // for
        let for_id = self.module.push(parent, NodeKind::ForStmt, self.range_from(start));
        if self.expect(&TokenKind::LParen, "'(' after 'for'") {
            // `for (Type item : expr)` / `for (item in expr)` / C-style.
            let decl_start = self.pos_start();
            let declared_type = self.parse_optional_type();
            if let Some(name) = self.ident() {
                self.module.push(for_id, NodeKind::VariableDecl { name, declared_type }, self.range_from(decl_start));
            }
            if self.at(&TokenKind::In) || self.at(&TokenKind::Colon) {
                self.advance();
                self.parse_expression(for_id);
            } else {
                // C-style: skip remaining init/cond/update segments.
                while !self.at(&TokenKind::RParen) && !self.at_eof() {
                    self.advance();
                }
            }
            self.expect(&TokenKind::RParen, "')' to close 'for' header");
        }
        self.parse_statement(for_id);
        let range = self.range_from(start);
        if let Some(node) = self.module_node_mut(for_id) {
            node.range = range;
        }
    }

    fn parse_while(&mut self, parent: NodeId) {
        let start = self.pos_start();
        self.advance(); // while
        let while_id = self.module.push(parent, NodeKind::WhileStmt, self.range_from(start));
        if self.expect(&TokenKind::LParen, "'(' after 'while'") {
            self.parse_expression(while_id);
            self.expect(&TokenKind::RParen, "')' to close condition");
        }
        self.parse_statement(while_id);
        let range = self.range_from(start);
        if let Some(node) = self.module_node_mut(while_id) {
            node.range = range;
        }
    }

    fn parse_try(&mut self, parent: NodeId) {
        let start = self.pos_start();
        self.advance(); // try
        let try_id = self.module.push(parent, NodeKind::TryStmt, self.range_from(start));
        self.parse_statement(try_id);
        self.skip_separators();
        while self.at(&TokenKind::Catch) {
            let cstart = self.pos_start();
            self.advance();
            let mut exception_type = None;
            let mut variable = String::new();
            if self.expect(&TokenKind::LParen, "'(' after 'catch'") {
                let first = self.parse_optional_type_or_ident();
                if matches!(self.peek(), TokenKind::Ident(_)) {
                    exception_type = first;
                    variable = self.ident().unwrap_or_default();
                } else {
                    variable = first.unwrap_or_default();
                }
                self.expect(&TokenKind::RParen, "')' to close 'catch' parameter");
            }
            let catch_id = self.module.push(try_id, NodeKind::CatchClause { exception_type, variable }, self.range_from(cstart));
            self.parse_statement(catch_id);
            let range = self.range_from(cstart);
            if let Some(node) = self.module_node_mut(catch_id) {
                node.range = range;
            }
            self.skip_separators();
        }
        if self.at(&TokenKind::Finally) {
            self.advance();
            self.parse_statement(try_id);
        }
        let range = self.range_from(start);
        if let Some(node) = self.module_node_mut(try_id) {
            node.range = range;
        }
    }

    fn parse_optional_type_or_ident(&mut self) -> Option<String> {
        if let TokenKind::Ident(name) = self.peek().clone() {
            self.advance();
            Some(name)
        } else {
            None
        }
    }

    // --- expressions ---------------------------------------------------------

    fn parse_expression(&mut self, parent: NodeId) -> NodeId {
        self.parse_assignment(parent)
    }

    fn parse_assignment(&mut self, parent: NodeId) -> NodeId {
        let start = self.pos_start();
        let lhs_name = if let TokenKind::Ident(name) = self.peek().clone() {
            if matches!(
                self.peek_at(1),
                TokenKind::Assign | TokenKind::PlusAssign | TokenKind::MinusAssign | TokenKind::StarAssign | TokenKind::SlashAssign
            ) {
                Some(name)
            } else {
                None
            }
        } else {
            None
        };

        if let Some(name) = lhs_name {
            self.advance(); // ident
            self.advance(); // assign-like operator
            let assign_id = self.module.push(parent, NodeKind::AssignmentExpr { target_name: Some(name) }, self.range_from(start));
            self.parse_assignment(assign_id);
            let range = self.range_from(start);
            if let Some(node) = self.module_node_mut(assign_id) {
                node.range = range;
            }
            return assign_id;
        }

        self.parse_elvis(parent)
    }

    fn parse_elvis(&mut self, parent: NodeId) -> NodeId {
        let start = self.pos_start();
        let lhs = self.parse_logical_or(parent);
        if self.at(&TokenKind::Elvis) {
            self.advance();
            let bin_id = self.module.push(parent, NodeKind::BinaryExpr { op: "?:".into() }, self.range_from(start));
            self.reparent(lhs, bin_id);
            self.parse_elvis(bin_id);
            let range = self.range_from(start);
            if let Some(node) = self.module_node_mut(bin_id) {
                node.range = range;
            }
            return bin_id;
        }
        lhs
    }

    fn parse_logical_or(&mut self, parent: NodeId) -> NodeId {
        self.parse_binary_left(parent, &[TokenKind::OrOr], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self, parent: NodeId) -> NodeId {
        self.parse_binary_left(parent, &[TokenKind::AndAnd], Self::parse_equality)
    }

    fn parse_equality(&mut self, parent: NodeId) -> NodeId {
        self.parse_binary_left(parent, &[TokenKind::Eq, TokenKind::Ne, TokenKind::Spaceship], Self::parse_relational)
    }

    fn parse_relational(&mut self, parent: NodeId) -> NodeId {
        self.parse_binary_left(parent, &[TokenKind::Lt, TokenKind::Le, TokenKind::Gt, TokenKind::Ge], Self::parse_additive)
    }

    fn parse_additive(&mut self, parent: NodeId) -> NodeId {
        self.parse_binary_left(parent, &[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self, parent: NodeId) -> NodeId {
        self.parse_binary_left(parent, &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent], Self::parse_unary)
    }

    fn parse_binary_left(
        &mut self,
        parent: NodeId,
        ops: &[TokenKind],
        mut next: impl FnMut(&mut Self, NodeId) -> NodeId,
    ) -> NodeId {
        let start = self.pos_start();
        let mut lhs = next(self, parent);
        while ops.iter().any(|op| self.at(op)) {
            let op_text = token_text(self.peek());
            self.advance();
            let bin_id = self.module.push(parent, NodeKind::BinaryExpr { op: op_text }, self.range_from(start));
            self.reparent(lhs, bin_id);
            let rhs = next(self, bin_id);
            let _ = rhs;
            let range = self.range_from(start);
            if let Some(node) = self.module_node_mut(bin_id) {
                node.range = range;
            }
            lhs = bin_id;
        }
        lhs
    }

    fn parse_unary(&mut self, parent: NodeId) -> NodeId {
        if matches!(self.peek(), TokenKind::Not | TokenKind::Minus | TokenKind::Increment | TokenKind::Decrement) {
            let start = self.pos_start();
            let op = token_text(self.peek());
            self.advance();
            let unary_id = self.module.push(parent, NodeKind::BinaryExpr { op: format!("unary{op}") }, self.range_from(start));
            self.parse_unary(unary_id);
            let range = self.range_from(start);
            if let Some(node) = self.module_node_mut(unary_id) {
                node.range = range;
            }
            return unary_id;
        }
        self.parse_postfix(parent)
    }

    fn parse_postfix(&mut self, parent: NodeId) -> NodeId {
        let start = self.pos_start();
        let mut node = self.parse_primary(parent);
        loop {
            match self.peek() {
                TokenKind::Dot | TokenKind::SafeDot => {
                    self.advance();
                    let Some(name) = self.ident() else { break };
                    if self.at(&TokenKind::LParen) {
                        let call_id = self.module.push(parent, NodeKind::MethodCallExpr { method_name: name, arg_count: 0 }, self.range_from(start));
                        self.reparent(node, call_id);
                        let arg_count = self.parse_arg_list(call_id);
                        if let NodeKind::MethodCallExpr { arg_count: ac, .. } = &mut self.module_node_mut(call_id).unwrap().kind {
                            *ac = arg_count;
                        }
                        self.attach_trailing_closure(call_id);
                        let range = self.range_from(start);
                        if let Some(n) = self.module_node_mut(call_id) {
                            n.range = range;
                        }
                        node = call_id;
                    } else if self.at(&TokenKind::LBrace) {
                        // `receiver.method { ... }`: a paren-less call whose only
                        // argument is a trailing closure, the shape Gradle/Groovy
                        // DSL blocks (`dependencies { ... }`) are built from.
                        let call_id = self.module.push(parent, NodeKind::MethodCallExpr { method_name: name, arg_count: 0 }, self.range_from(start));
                        self.reparent(node, call_id);
                        self.attach_trailing_closure(call_id);
                        let range = self.range_from(start);
                        if let Some(n) = self.module_node_mut(call_id) {
                            n.range = range;
                        }
                        node = call_id;
                    } else {
                        let access_id = self.module.push(parent, NodeKind::PropertyAccessExpr { property_name: name }, self.range_from(start));
                        self.reparent(node, access_id);
                        node = access_id;
                    }
                }
                TokenKind::LParen if matches!(self.module.get(node).map(|n| &n.kind), Some(NodeKind::VariableExpr { .. })) => {
                    let method_name = match &self.module.get(node).unwrap().kind {
                        NodeKind::VariableExpr { name } => name.clone(),
                        _ => unreachable!(),
                    };
                    let call_id = self.module.push(parent, NodeKind::MethodCallExpr { method_name, arg_count: 0 }, self.range_from(start));
                    let arg_count = self.parse_arg_list(call_id);
                    if let NodeKind::MethodCallExpr { arg_count: ac, .. } = &mut self.module_node_mut(call_id).unwrap().kind {
                        *ac = arg_count;
                    }
                    self.attach_trailing_closure(call_id);
                    let range = self.range_from(start);
                    if let Some(n) = self.module_node_mut(call_id) {
                        n.range = range;
                    }
                    node = call_id;
                }
                TokenKind::LBrace if matches!(self.module.get(node).map(|n| &n.kind), Some(NodeKind::VariableExpr { .. })) => {
                    let method_name = match &self.module.get(node).unwrap().kind {
                        NodeKind::VariableExpr { name } => name.clone(),
                        _ => unreachable!(),
                    };
                    let call_id = self.module.push(parent, NodeKind::MethodCallExpr { method_name, arg_count: 0 }, self.range_from(start));
                    self.attach_trailing_closure(call_id);
                    let range = self.range_from(start);
                    if let Some(n) = self.module_node_mut(call_id) {
                        n.range = range;
                    }
                    node = call_id;
                }
                TokenKind::Increment | TokenKind::Decrement => {
                    self.advance();
                }
                _ => break,
            }
        }
        node
    }

    fn attach_trailing_closure(&mut self, call_id: NodeId) {
        if self.at(&TokenKind::LBrace) {
            self.parse_closure(call_id);
        }
    }

    fn parse_arg_list(&mut self, parent: NodeId) -> usize {
        if !self.expect(&TokenKind::LParen, "'(' to start argument list") {
            return 0;
        }
        let mut count = 0usize;
        while !self.at(&TokenKind::RParen) && !self.at_eof() {
            // Named argument `name: expr` — skip the label, keep the value.
            if let TokenKind::Ident(_) = self.peek() {
                if matches!(self.peek_at(1), TokenKind::Colon) {
                    self.advance();
                    self.advance();
                }
            }
            self.parse_expression(parent);
            count += 1;
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' to close argument list");
        count
    }

    fn parse_closure(&mut self, parent: NodeId) -> NodeId {
        let start = self.pos_start();
        self.advance(); // {
        let has_params = self.scan_for_closure_arrow();
        let closure_id = self.module.push(parent, NodeKind::ClosureExpr { implicit_it: !has_params }, self.range_from(start));
        if has_params {
            loop {
                let pstart = self.pos_start();
                let declared_type = self.parse_optional_type();
                let Some(name) = self.ident() else { break };
                self.module.push(closure_id, NodeKind::Parameter { name, declared_type, index: 0 }, self.range_from(pstart));
                if self.at(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect(&TokenKind::Arrow, "'->' after closure parameters");
        }
        self.skip_separators();
        while !self.at(&TokenKind::RBrace) && !self.at_eof() {
            self.parse_statement(closure_id);
            self.skip_separators();
        }
        if self.at(&TokenKind::RBrace) {
            self.advance();
        } else {
            self.error("expected '}' to close closure");
        }
        let range = self.range_from(start);
        if let Some(node) = self.module_node_mut(closure_id) {
            node.range = range;
        }
        closure_id
    }

    /// Looks ahead (without consuming) for a top-level `->` before the
    /// closing brace, to decide whether this closure declares parameters.
    fn scan_for_closure_arrow(&self) -> bool {
        let mut depth = 0i32;
        let mut idx = self.pos;
        while idx < self.tokens.len() {
            match &self.tokens[idx].kind {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace if depth == 0 => return false,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => depth -= 1,
                TokenKind::Arrow if depth == 0 => return true,
                TokenKind::Semicolon | TokenKind::Newline if depth == 0 => return false,
                TokenKind::Eof => return false,
                _ => {}
            }
            idx += 1;
        }
        false
    }

    fn parse_primary(&mut self, parent: NodeId) -> NodeId {
        let start = self.pos_start();
        match self.peek().clone() {
            TokenKind::IntLiteral(v) => {
                self.advance();
                self.module.push(parent, NodeKind::ConstantExpr { literal: Literal::Int(v) }, self.range_from(start))
            }
            TokenKind::FloatLiteral(v) => {
                self.advance();
                self.module.push(parent, NodeKind::ConstantExpr { literal: Literal::Float(v) }, self.range_from(start))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                self.module.push(parent, NodeKind::ConstantExpr { literal: Literal::Str(s) }, self.range_from(start))
            }
            TokenKind::GStringLiteral { .. } => {
                self.advance();
                self.module.push(parent, NodeKind::GStringExpr, self.range_from(start))
            }
            TokenKind::True => {
                self.advance();
                self.module.push(parent, NodeKind::ConstantExpr { literal: Literal::Bool(true) }, self.range_from(start))
            }
            TokenKind::False => {
                self.advance();
                self.module.push(parent, NodeKind::ConstantExpr { literal: Literal::Bool(false) }, self.range_from(start))
            }
            TokenKind::Null => {
                self.advance();
                self.module.push(parent, NodeKind::ConstantExpr { literal: Literal::Null }, self.range_from(start))
            }
            TokenKind::This | TokenKind::Super => {
                let name = if matches!(self.peek(), TokenKind::This) { "this" } else { "super" };
                self.advance();
                self.module.push(parent, NodeKind::VariableExpr { name: name.to_string() }, self.range_from(start))
            }
            TokenKind::New => {
                self.advance();
                let name = self.parse_dotted_name();
                let class_id = self.module.push(parent, NodeKind::ClassReferenceExpr { name }, self.range_from(start));
                if self.at(&TokenKind::LParen) {
                    self.parse_arg_list(class_id);
                }
                let range = self.range_from(start);
                if let Some(node) = self.module_node_mut(class_id) {
                    node.range = range;
                }
                class_id
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(parent);
                self.expect(&TokenKind::RParen, "')' to close parenthesized expression");
                inner
            }
            TokenKind::LBrace => self.parse_closure(parent),
            TokenKind::LBracket => self.parse_list_or_map(parent),
            TokenKind::Ident(name) => {
                self.advance();
                self.module.push(parent, NodeKind::VariableExpr { name }, self.range_from(start))
            }
            _ => {
                self.error("expected an expression");
                self.advance();
                self.module.push(parent, NodeKind::Unknown, self.range_from(start))
            }
        }
    }

    fn parse_list_or_map(&mut self, parent: NodeId) -> NodeId {
        let start = self.pos_start();
        self.advance(); // [
        let is_map = matches!(self.peek(), TokenKind::Colon) || {
            // Look ahead one expression for a following colon (`key: value`).
            matches!(self.peek(), TokenKind::Ident(_) | TokenKind::StringLiteral(_)) && matches!(self.peek_at(1), TokenKind::Colon)
        };
        let kind = if is_map { NodeKind::MapExpr } else { NodeKind::ListExpr };
        let coll_id = self.module.push(parent, kind, self.range_from(start));
        if self.at(&TokenKind::Colon) {
            self.advance(); // empty map literal `[:]`
        } else {
            while !self.at(&TokenKind::RBracket) && !self.at_eof() {
                self.parse_expression(coll_id);
                if is_map && self.at(&TokenKind::Colon) {
                    self.advance();
                    self.parse_expression(coll_id);
                }
                if self.at(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBracket, "']' to close collection literal");
        let range = self.range_from(start);
        if let Some(node) = self.module_node_mut(coll_id) {
            node.range = range;
        }
        coll_id
    }

    /// Re-parents an already-pushed node (used when a prefix expression
    /// turns out to be the left operand of a binary/postfix expression
    /// discovered just after it was parsed).
    fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.module.reparent(child, new_parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Uri {
        "file:///tmp/a.groovy".parse().unwrap()
    }

    fn parse_ok(source: &str) -> Module {
        let (module, diagnostics) = parse(uri(), None, source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        module
    }

    #[test]
    fn parses_package_and_import_decls() {
        let module = parse_ok("package com.example\nimport java.util.List\nimport static java.lang.Math.*\n");
        let kinds: Vec<_> = module.nodes().map(|n| &n.kind).collect();
        assert!(kinds.iter().any(|k| matches!(k, NodeKind::PackageDecl { name } if name == "com.example")));
        assert!(kinds.iter().any(|k| matches!(k, NodeKind::ImportDecl { target, .. } if target == "java.util.List")));
        assert!(kinds.iter().any(|k| matches!(k, NodeKind::ImportDecl { is_star: true, is_static: true, .. })));
    }

    #[test]
    fn parses_a_class_with_a_field_and_a_method() {
        let module = parse_ok("class Greeter {\n  String name\n  def greet() {\n    println name\n  }\n}\n");
        let class = module.nodes().find(|n| matches!(&n.kind, NodeKind::ClassDecl { .. })).unwrap();
        assert!(matches!(&class.kind, NodeKind::ClassDecl { name, kind: ClassKind::Class, .. } if name == "Greeter"));
        assert!(module.nodes().any(|n| matches!(&n.kind, NodeKind::PropertyDecl { name, .. } if name == "name")));
        assert!(module.nodes().any(|n| matches!(&n.kind, NodeKind::MethodDecl { name, .. } if name == "greet")));
    }

    #[test]
    fn parses_extends_and_implements_lists() {
        let module = parse_ok("class Impl extends Base implements A, B {\n}\n");
        let class = module.nodes().find(|n| matches!(&n.kind, NodeKind::ClassDecl { .. })).unwrap();
        match &class.kind {
            NodeKind::ClassDecl { extends, implements, .. } => {
                assert_eq!(extends, &vec!["Base".to_string()]);
                assert_eq!(implements, &vec!["A".to_string(), "B".to_string()]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_if_else_and_while_and_for() {
        let module = parse_ok(
            "def run() {\n  if (x > 0) {\n    println 'pos'\n  } else {\n    println 'neg'\n  }\n  while (x < 10) { x++ }\n  for (i in items) { println i }\n}\n",
        );
        assert!(module.nodes().any(|n| matches!(n.kind, NodeKind::IfStmt)));
        assert!(module.nodes().any(|n| matches!(n.kind, NodeKind::WhileStmt)));
        assert!(module.nodes().any(|n| matches!(n.kind, NodeKind::ForStmt)));
    }

    #[test]
    fn parses_try_catch_finally() {
        let module = parse_ok("def run() {\n  try {\n    risky()\n  } catch (IOException e) {\n    handle(e)\n  } finally {\n    cleanup()\n  }\n}\n");
        let catch = module.nodes().find(|n| matches!(&n.kind, NodeKind::CatchClause { .. })).unwrap();
        assert!(matches!(&catch.kind, NodeKind::CatchClause { exception_type: Some(t), variable } if t == "IOException" && variable == "e"));
    }

    #[test]
    fn parses_a_closure_with_explicit_params() {
        let module = parse_ok("def run() {\n  items.each { it2 -> println it2 }\n}\n");
        let closure = module.nodes().find(|n| matches!(&n.kind, NodeKind::ClosureExpr { .. })).unwrap();
        assert!(matches!(&closure.kind, NodeKind::ClosureExpr { implicit_it: false }));
        assert!(module.nodes().any(|n| matches!(&n.kind, NodeKind::Parameter { name, .. } if name == "it2")));
    }

    #[test]
    fn parses_a_closure_with_implicit_it() {
        let module = parse_ok("def run() {\n  items.each { println it }\n}\n");
        let closure = module.nodes().find(|n| matches!(&n.kind, NodeKind::ClosureExpr { .. })).unwrap();
        assert!(matches!(&closure.kind, NodeKind::ClosureExpr { implicit_it: true }));
    }

    #[test]
    fn parses_list_and_map_literals() {
        let module = parse_ok("def run() {\n  def xs = [1, 2, 3]\n  def m = [a: 1, b: 2]\n  def empty = [:]\n}\n");
        assert!(module.nodes().any(|n| matches!(n.kind, NodeKind::ListExpr)));
        assert_eq!(module.nodes().filter(|n| matches!(n.kind, NodeKind::MapExpr)).count(), 2);
    }

    #[test]
    fn parses_method_calls_with_trailing_closures() {
        let module = parse_ok("def run() {\n  items.each { x -> println x }\n}\n");
        let call = module.nodes().find(|n| matches!(&n.kind, NodeKind::MethodCallExpr { .. })).unwrap();
        assert!(matches!(&call.kind, NodeKind::MethodCallExpr { method_name, .. } if method_name == "each"));
    }

    #[test]
    fn recovers_from_a_missing_closing_brace_without_panicking() {
        let (module, diagnostics) = parse(uri(), None, "class Broken {\n  def oops(\n");
        assert!(!diagnostics.is_empty());
        assert!(module.nodes().any(|n| matches!(&n.kind, NodeKind::ClassDecl { name, .. } if name == "Broken")));
    }

    #[test]
    fn recovers_from_an_unexpected_token_and_keeps_parsing_later_statements() {
        let (module, diagnostics) = parse(uri(), None, "def a = @\ndef b = 2\n");
        assert!(!diagnostics.is_empty());
        assert!(module.nodes().any(|n| matches!(&n.kind, NodeKind::VariableDecl { name, .. } if name == "b")));
    }

    #[test]
    fn assignment_expression_tracks_target_name() {
        let module = parse_ok("def run() {\n  x = 5\n}\n");
        let assign = module.nodes().find(|n| matches!(&n.kind, NodeKind::AssignmentExpr { .. })).unwrap();
        assert!(matches!(&assign.kind, NodeKind::AssignmentExpr { target_name: Some(name) } if name == "x"));
    }

    #[test]
    fn elvis_and_binary_operators_nest_by_precedence() {
        let module = parse_ok("def run() {\n  def r = a + b * c ?: d\n}\n");
        assert!(module.nodes().any(|n| matches!(&n.kind, NodeKind::BinaryExpr { op } if op == "?:")));
        assert!(module.nodes().any(|n| matches!(&n.kind, NodeKind::BinaryExpr { op } if op == "*")));
        assert!(module.nodes().any(|n| matches!(&n.kind, NodeKind::BinaryExpr { op } if op == "+")));
    }
}

fn token_text(kind: &TokenKind) -> String {
    use TokenKind::*;
    match kind {
        Plus => "+",
        Minus => "-",
        Star => "*",
        Slash => "/",
        Percent => "%",
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Le => "<=",
        Gt => ">",
        Ge => ">=",
        Spaceship => "<=>",
        AndAnd => "&&",
        OrOr => "||",
        Not => "!",
        Increment => "++",
        Decrement => "--",
        _ => "?",
    }
    .to_string()
}
