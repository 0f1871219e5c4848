//! The compiler front-end adapter: tokenizer, parser, and AST visitor for
//! the pragmatic Groovy subset (SPEC_FULL.md §4.4/§4.5).
//!
//! Parsing never fails outright — a syntactically broken file still
//! yields whatever partial `Module` the parser managed to build, plus the
//! diagnostics describing where it gave up and resynchronized. Callers
//! that need a clean `Module` should check `diagnostics.is_empty()`
//! themselves; the front-end makes no such judgment call.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod visitor;

pub use error::{FrontendError, Result};
pub use parser::parse;
pub use token::{Token, TokenKind};
pub use visitor::{VisitResult, visit};

use groovy_core::diagnostic::Diagnostic;
use groovy_core::node::Module;
use std::path::PathBuf;
use tower_lsp_server::lsp_types::Uri;

/// Parses `source` and runs the relationship tracker over the result in
/// one call, the shape `groovy-workspace` drives its per-context compile
/// loop with.
pub fn compile_unit(uri: Uri, path: Option<PathBuf>, source: &str) -> (Module, VisitResult, Vec<Diagnostic>) {
    let (module, diagnostics) = parse(uri, path, source);
    let visited = visit(&module);
    (module, visited, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Uri {
        "file:///tmp/a.groovy".parse().unwrap()
    }

    #[test]
    fn compile_unit_parses_and_visits_in_one_pass() {
        let (module, visited, diagnostics) = compile_unit(uri(), None, "class Greeter {\n  def greet() {\n    println 'hi'\n  }\n}\n");
        assert!(diagnostics.is_empty());
        assert_eq!(visited.classes.len(), 1);
        assert!(module.len() > 1);
    }
}
