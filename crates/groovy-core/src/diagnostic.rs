//! Diagnostics produced by compilation.

use crate::position::Range;

/// Severity levels mirroring `tower_lsp_server::lsp_types::DiagnosticSeverity`,
/// kept as a small local enum so the front-end and workspace crates don't
/// need to depend on the wire-protocol crate just to construct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub const fn to_lsp(self) -> tower_lsp_server::lsp_types::DiagnosticSeverity {
        use tower_lsp_server::lsp_types::DiagnosticSeverity as S;
        match self {
            Self::Error => S::ERROR,
            Self::Warning => S::WARNING,
            Self::Info => S::INFORMATION,
            Self::Hint => S::HINT,
        }
    }
}

/// A single diagnostic, attributed to one source unit by `Range` + the
/// caller's URI (see `groovy-frontend`'s diagnostic attribution).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub message: String,
    pub source: &'static str,
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn new(range: Range, severity: Severity, message: impl Into<String>) -> Self {
        Self { range, severity, message: message.into(), source: "groovy-lsp", code: None }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn to_lsp(&self) -> tower_lsp_server::lsp_types::Diagnostic {
        tower_lsp_server::lsp_types::Diagnostic {
            range: self.range.to_lsp(),
            severity: Some(self.severity.to_lsp()),
            code: self.code.clone().map(tower_lsp_server::lsp_types::NumberOrString::String),
            source: Some(self.source.to_string()),
            message: self.message.clone(),
            ..Default::default()
        }
    }
}
