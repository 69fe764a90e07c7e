use std::fmt;

use crate::keywords::Keyword;

/// A token with its source position (1-based line and column) for error
/// reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Decoded text: identifier value, unescaped string content, number
    /// digits, or the partial text of a lex error.
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.kind, TokenKind::Word(Some(k)) if k == keyword)
    }

    /// Identifier value when this token can name an object: a quoted
    /// identifier, a plain word, or a non-reserved keyword.
    #[must_use]
    pub fn as_ident_value(&self) -> Option<&str> {
        match self.kind {
            TokenKind::QuotedIdent => Some(&self.text),
            TokenKind::Word(None) => Some(&self.text),
            TokenKind::Word(Some(keyword)) if !keyword.is_reserved() => Some(&self.text),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "{}", self.text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word; carries its keyword id when the word is one.
    Word(Option<Keyword>),
    /// `WITH` immediately preceding `DATA` or `NO`, so the grammar can
    /// tell materialized-view `WITH [NO] DATA` from other WITH clauses.
    WithBeforeData,
    QuotedIdent,
    StringLit,
    /// mssql `N'…'`.
    NationalStringLit,
    /// `$tag$…$tag$`; the body is in `text`.
    DollarString,
    HexLit,
    BitLit,
    Number,
    /// `$1`, `$2`, … positional parameter.
    Parameter,

    LParen,
    RParen,
    /// Array type suffix / subscript brackets (not mssql, where `[` quotes
    /// an identifier).
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,

    Plus,
    Minus,
    /// `->` json access.
    Arrow,
    /// `->>` json access as text.
    LongArrow,
    Star,
    Slash,
    Percent,
    Caret,
    Ampersand,
    /// `&&` (range overlap, the usual exclusion operator).
    AmpAmp,
    Pipe,
    PipePipe,
    ShiftLeft,
    ShiftRight,

    Eq,
    Neq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    Colon,
    DoubleColon,

    /// POSIX regex match operators (postgres mode only).
    Tilde,
    TildeStar,
    NotTilde,
    NotTildeStar,
    /// Internal LIKE operators (postgres mode only).
    TildeTilde,
    TildeTildeStar,
    NotTildeTilde,
    NotTildeTildeStar,

    /// Unterminated string/comment/dollar-quote or invalid input; the
    /// grammar converts this into a syntax error with position data.
    LexError,
    Eof,
}
