//! Hand-rolled lexer for the pragmatic Groovy subset (SPEC_FULL.md §4.4).
//!
//! Lexical errors never abort tokenization: an unrecognized byte becomes
//! a `TokenKind::Unknown` token and scanning continues, matching the
//! front-end's "syntax errors do not abort" contract one layer down.

use crate::token::{Token, TokenKind, keyword_from_ident};

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: i32,
    column: i32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    while let Some(c) = self.peek() {
                        if c == b'*' && self.peek_at(1) == Some(b'/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let (line, column) = (self.line, self.column);

        let Some(c) = self.peek() else {
            return self.make(TokenKind::Eof, line, column);
        };

        if c == b'\n' {
            self.advance();
            return self.make(TokenKind::Newline, line, column);
        }

        if c.is_ascii_digit() {
            return self.lex_number(line, column);
        }

        if c == b'_' || c.is_ascii_alphabetic() {
            return self.lex_ident(line, column);
        }

        if c == b'"' {
            return self.lex_gstring(line, column);
        }

        if c == b'\'' {
            return self.lex_single_quoted(line, column);
        }

        self.lex_operator(line, column)
    }

    fn make(&self, kind: TokenKind, line: i32, column: i32) -> Token {
        Token { kind, line, column, end_line: self.line, end_column: self.column }
    }

    fn lex_number(&mut self, line: i32, column: i32) -> Token {
        let start = self.pos;
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == b'_' {
                self.advance();
            } else if c == b'.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) {
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }
        let text: String = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap_or_default()
            .chars()
            .filter(|c| *c != '_')
            .collect();

        let kind = if is_float {
            TokenKind::FloatLiteral(text.parse().unwrap_or(0.0))
        } else {
            TokenKind::IntLiteral(text.parse().unwrap_or(0))
        };
        self.make(kind, line, column)
    }

    fn lex_ident(&mut self, line: i32, column: i32) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == b'_' || c.is_ascii_alphanumeric() {
                self.advance();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or_default();
        let kind = keyword_from_ident(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        self.make(kind, line, column)
    }

    fn lex_single_quoted(&mut self, line: i32, column: i32) -> Token {
        self.advance(); // opening quote
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == b'\'' && !self.preceded_by_backslash(start) {
                break;
            }
            if c == b'\\' {
                self.advance();
            }
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        if self.peek() == Some(b'\'') {
            self.advance();
        }
        self.make(TokenKind::StringLiteral(text), line, column)
    }

    fn preceded_by_backslash(&self, _start: usize) -> bool {
        self.pos > 0 && self.source[self.pos - 1] == b'\\'
    }

    fn lex_gstring(&mut self, line: i32, column: i32) -> Token {
        self.advance(); // opening quote
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == b'"' {
                break;
            }
            if c == b'\\' {
                self.advance();
            }
            self.advance();
        }
        let raw = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        if self.peek() == Some(b'"') {
            self.advance();
        }
        self.make(TokenKind::GStringLiteral { raw }, line, column)
    }

    fn lex_operator(&mut self, line: i32, column: i32) -> Token {
        let c = self.advance().unwrap();
        let kind = match c {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'@' => TokenKind::At,
            b'.' => {
                if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            b':' => {
                if self.peek() == Some(b':') {
                    self.advance();
                    TokenKind::DoubleColon
                } else {
                    TokenKind::Colon
                }
            }
            b'?' => {
                if self.peek() == Some(b'.') {
                    self.advance();
                    TokenKind::SafeDot
                } else if self.peek() == Some(b':') {
                    self.advance();
                    TokenKind::Elvis
                } else {
                    TokenKind::Question
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Eq
                } else if self.peek() == Some(b'~') {
                    self.advance();
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Ne
                } else {
                    TokenKind::Not
                }
            }
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    if self.peek() == Some(b'>') {
                        self.advance();
                        TokenKind::Spaceship
                    } else {
                        TokenKind::Le
                    }
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            b'+' => {
                if self.peek() == Some(b'+') {
                    self.advance();
                    TokenKind::Increment
                } else if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.peek() == Some(b'-') {
                    self.advance();
                    TokenKind::Decrement
                } else if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::MinusAssign
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::StarAssign
                } else {
                    TokenKind::Star
                }
            }
            b'/' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::SlashAssign
                } else {
                    TokenKind::Slash
                }
            }
            b'%' => TokenKind::Percent,
            b'&' => {
                if self.peek() == Some(b'&') {
                    self.advance();
                    TokenKind::AndAnd
                } else {
                    TokenKind::Unknown('&')
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.advance();
                    TokenKind::OrOr
                } else {
                    TokenKind::Unknown('|')
                }
            }
            other => TokenKind::Unknown(other as char),
        };
        self.make(kind, line, column)
    }
}

pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_variable_declaration() {
        let tokens = tokenize("def x = 42");
        assert_eq!(tokens[0].kind, TokenKind::Def);
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "x"));
        assert_eq!(tokens[2].kind, TokenKind::Assign);
        assert_eq!(tokens[3].kind, TokenKind::IntLiteral(42));
        assert_eq!(tokens[4].kind, TokenKind::Eof);
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("def x = 42\nprintln x");
        let println_tok = tokens.iter().find(|t| matches!(&t.kind, TokenKind::Ident(s) if s == "println")).unwrap();
        assert_eq!(println_tok.line, 2);
        assert_eq!(println_tok.column, 1);
    }

    #[test]
    fn gstring_preserves_raw_interpolation_text() {
        let tokens = tokenize(r#""Hello, ${name}""#);
        assert!(matches!(&tokens[0].kind, TokenKind::GStringLiteral { raw } if raw == "Hello, ${name}"));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let tokens = tokenize("// hi\ndef x = 1 /* c */ + 2");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Def));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Plus));
    }

    #[test]
    fn unknown_bytes_become_unknown_tokens_not_panics() {
        let tokens = tokenize("def x = `");
        assert!(matches!(tokens.last().unwrap().kind, TokenKind::Eof));
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::Unknown('`'))));
    }
}
