//! Source coordinates.
//!
//! The front-end and AST report 1-based `(line, column)` positions (the
//! Groovy-facing convention); the wire protocol and `Diagnostic` ranges use
//! 0-based `(line, character)` (the LSP convention). Conversion happens
//! only at the boundary between the two — see `Position::to_lsp` /
//! `Position::from_lsp`.

use serde::{Deserialize, Serialize};

/// A 1-based source coordinate as produced by the compiler front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: i32,
    pub column: i32,
}

impl Position {
    pub const fn new(line: i32, column: i32) -> Self {
        Self { line, column }
    }

    /// A position is invalid if either component is non-positive. Nodes
    /// with an invalid position are still recorded by the visitor, but are
    /// excluded from position queries (spec'd behavior).
    pub const fn is_valid(self) -> bool {
        self.line > 0 && self.column > 0
    }

    /// Converts to 0-based LSP coordinates.
    pub const fn to_lsp(self) -> tower_lsp_server::lsp_types::Position {
        tower_lsp_server::lsp_types::Position {
            line: (self.line - 1).max(0) as u32,
            character: (self.column - 1).max(0) as u32,
        }
    }

    /// Converts from 0-based LSP coordinates to the engine's 1-based form.
    pub fn from_lsp(pos: tower_lsp_server::lsp_types::Position) -> Self {
        Self {
            line: pos.line as i32 + 1,
            column: pos.character as i32 + 1,
        }
    }
}

/// An inclusive-start, exclusive-end span between two `Position`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub const fn is_valid(self) -> bool {
        self.start.is_valid() && self.end.is_valid()
    }

    /// Whether this range spans more than one source line.
    pub const fn is_multiline(self) -> bool {
        self.end.line > self.start.line
    }

    /// Whether `pos` falls within `[start, end]` inclusive.
    pub fn contains(self, pos: Position) -> bool {
        if !self.is_valid() {
            return false;
        }
        let after_start = pos.line > self.start.line
            || (pos.line == self.start.line && pos.column >= self.start.column);
        let before_end =
            pos.line < self.end.line || (pos.line == self.end.line && pos.column <= self.end.column);
        after_start && before_end
    }

    /// The range-size metric used by the Position Finder: smaller is more
    /// specific. Single-line nodes compare by column span; multi-line
    /// nodes are weighted so that line-span dominates column-span.
    pub fn size_metric(self) -> i64 {
        const LINE_WEIGHT: i64 = 1000;
        const MULTILINE_WEIGHT: i64 = 100;

        if self.is_multiline() {
            let line_span = i64::from(self.end.line - self.start.line);
            line_span * LINE_WEIGHT + line_span * MULTILINE_WEIGHT + i64::from(self.end.column)
        } else {
            i64::from(self.end.column - self.start.column)
        }
    }

    pub const fn to_lsp(self) -> tower_lsp_server::lsp_types::Range {
        tower_lsp_server::lsp_types::Range {
            start: self.start.to_lsp(),
            end: self.end.to_lsp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_positions_are_excluded() {
        assert!(!Position::new(0, 5).is_valid());
        assert!(!Position::new(5, 0).is_valid());
        assert!(!Position::new(-1, 5).is_valid());
        assert!(Position::new(1, 1).is_valid());
    }

    #[test]
    fn single_line_size_metric_is_column_span() {
        let r = Range::new(Position::new(3, 5), Position::new(3, 12));
        assert_eq!(r.size_metric(), 7);
    }

    #[test]
    fn multiline_size_metric_dominates_single_line() {
        let single = Range::new(Position::new(1, 1), Position::new(1, 50));
        let multi = Range::new(Position::new(1, 1), Position::new(2, 1));
        assert!(multi.size_metric() > single.size_metric());
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let r = Range::new(Position::new(2, 5), Position::new(4, 10));
        assert!(r.contains(Position::new(2, 5)));
        assert!(r.contains(Position::new(3, 1)));
        assert!(r.contains(Position::new(4, 10)));
        assert!(!r.contains(Position::new(2, 4)));
        assert!(!r.contains(Position::new(4, 11)));
    }

    #[test]
    fn lsp_roundtrip_shifts_by_one() {
        let pos = Position::new(1, 1);
        let lsp = pos.to_lsp();
        assert_eq!((lsp.line, lsp.character), (0, 0));
        assert_eq!(Position::from_lsp(lsp), pos);
    }
}
