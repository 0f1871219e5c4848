//! The token stream produced by the lexer.

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    /// A GString (double-quoted or slashy) with interpolation left
    /// un-expanded; the parser scans `raw` for `${...}` and `$ident` spans.
    GStringLiteral { raw: String },
    True,
    False,
    Null,

    // Keywords
    Package,
    Import,
    Class,
    Interface,
    Trait,
    Enum,
    Extends,
    Implements,
    Def,
    Static,
    Public,
    Private,
    Protected,
    Final,
    Abstract,
    Return,
    If,
    Else,
    For,
    While,
    Try,
    Catch,
    Finally,
    In,
    As,
    New,
    This,
    Super,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Newline,
    Comma,
    Dot,
    SafeDot,
    Colon,
    DoubleColon,
    Question,
    Elvis,
    Arrow,
    At,
    Ellipsis,

    // Operators
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Spaceship,
    AndAnd,
    OrOr,
    Not,
    Increment,
    Decrement,

    Eof,
    /// A span the lexer could not classify; preserved so the parser can
    /// still make forward progress and attach a diagnostic.
    Unknown(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: i32,
    pub column: i32,
    pub end_line: i32,
    pub end_column: i32,
}

pub fn keyword_from_ident(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "package" => Package,
        "import" => Import,
        "class" => Class,
        "interface" => Interface,
        "trait" => Trait,
        "enum" => Enum,
        "extends" => Extends,
        "implements" => Implements,
        "def" => Def,
        "static" => Static,
        "public" => Public,
        "private" => Private,
        "protected" => Protected,
        "final" => Final,
        "abstract" => Abstract,
        "return" => Return,
        "if" => If,
        "else" => Else,
        "for" => For,
        "while" => While,
        "try" => Try,
        "catch" => Catch,
        "finally" => Finally,
        "in" => In,
        "as" => As,
        "new" => New,
        "this" => This,
        "super" => Super,
        "true" => True,
        "false" => False,
        "null" => Null,
        _ => return None,
    })
}
