//! Hand-written recursive-descent grammar over the token stream. One
//! statement per parse; the multi-statement loop lives in the crate root.

mod create_table;
mod expr;
mod statements;

pub(crate) use create_table::attach_table_constraint;

use declsql_core::{
    CheckConstraint, Column, ExclusionConstraint, ForeignKey, Ident, PrimaryKey, QualifiedName,
    SchemaObject, SyntaxError, UniqueConstraint,
};

use crate::keywords::Keyword;
use crate::lexer::{Lexer, ParserMode};
use crate::token::{Token, TokenKind};

/// One parsed statement. `ALTER TABLE` actions stay detached until schema
/// assembly folds them into their tables.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStatement {
    Object(SchemaObject),
    AlterTable {
        table: QualifiedName,
        action: AlterTableAction,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    AddColumn(Column),
    AddConstraint(TableConstraint),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey(PrimaryKey),
    ForeignKey(ForeignKey),
    Unique(UniqueConstraint),
    Check(CheckConstraint),
    Exclusion(ExclusionConstraint),
}

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source_lines: Vec<&'a str>,
    mode: ParserMode,
}

type ParseResult<T> = Result<T, SyntaxError>;

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, mode: ParserMode) -> Self {
        let tokens = Lexer::new(source, mode).tokenize();
        Self {
            tokens,
            pos: 0,
            source_lines: source.lines().collect(),
            mode,
        }
    }

    pub fn mode(&self) -> ParserMode {
        self.mode
    }

    /// Parse one statement; `None` when the input held only trivia.
    pub fn parse_statement(&mut self) -> ParseResult<Option<ParsedStatement>> {
        while self.peek_kind() == TokenKind::Semicolon {
            self.advance();
        }
        if self.peek_kind() == TokenKind::Eof {
            return Ok(None);
        }

        let statement = self.dispatch_statement()?;

        while self.peek_kind() == TokenKind::Semicolon {
            self.advance();
        }
        self.expect_kind(TokenKind::Eof)?;
        Ok(Some(statement))
    }

    /// Trailing semicolons are tolerated; anything else is an error.
    pub(crate) fn expect_end(&mut self) -> ParseResult<()> {
        while self.peek_kind() == TokenKind::Semicolon {
            self.advance();
        }
        self.expect_kind(TokenKind::Eof)?;
        Ok(())
    }

    fn dispatch_statement(&mut self) -> ParseResult<ParsedStatement> {
        if self.eat_keyword(Keyword::CREATE) {
            return self.parse_create();
        }
        if self.eat_keyword(Keyword::ALTER) {
            return self.parse_alter_table();
        }
        if self.eat_keyword(Keyword::GRANT) {
            return self.parse_grant();
        }
        if self.eat_keyword(Keyword::REVOKE) {
            return self.parse_revoke();
        }
        if self.eat_keyword(Keyword::COMMENT) {
            return self.parse_comment();
        }

        Err(self.error_here("expected CREATE, ALTER, GRANT, REVOKE, or COMMENT"))
    }

    fn parse_create(&mut self) -> ParseResult<ParsedStatement> {
        if self.eat_keyword(Keyword::TABLE) {
            return self.parse_create_table();
        }
        if self.check_keyword(Keyword::UNIQUE) || self.check_keyword(Keyword::INDEX) {
            return self.parse_create_index();
        }
        if self.eat_keyword(Keyword::MATERIALIZED) {
            self.expect_keyword(Keyword::VIEW)?;
            return self.parse_create_materialized_view();
        }
        if self.eat_keyword(Keyword::OR) {
            self.expect_keyword(Keyword::REPLACE)?;
            self.expect_keyword(Keyword::VIEW)?;
            return self.parse_create_view();
        }
        if self.eat_keyword(Keyword::VIEW) {
            return self.parse_create_view();
        }
        if self.eat_keyword(Keyword::POLICY) {
            return self.parse_create_policy();
        }
        if self.eat_keyword(Keyword::TYPE) {
            return self.parse_create_type();
        }
        if self.eat_keyword(Keyword::SCHEMA) {
            return self.parse_create_schema();
        }
        if self.eat_keyword(Keyword::EXTENSION) {
            return self.parse_create_extension();
        }

        Err(self.error_here("unsupported CREATE statement"))
    }

    // --- token helpers ---

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub(crate) fn peek_ahead(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    pub(crate) fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error_here(&format!("expected {keyword:?}")))
        }
    }

    /// Case-insensitive match on a bare word that is not in the keyword
    /// table (mysql `AUTO_INCREMENT` and friends).
    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek_kind(), TokenKind::Word(_))
            && self.peek().text.eq_ignore_ascii_case(word)
        {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_kind(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_kind(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.error_here(&format!("expected {kind:?}")))
        }
    }

    /// Identifier: quoted, plain word, or non-reserved keyword. Quoting
    /// on an already-folded name carries no information (rendering always
    /// re-quotes), so `"users"` canonicalizes to the same identifier as
    /// `users` while `"Users"` keeps its case-preserving quotes.
    pub(crate) fn parse_ident(&mut self) -> ParseResult<Ident> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::QuotedIdent => {
                self.advance();
                if is_folded_ident(&token.text) {
                    Ok(Ident::unquoted(token.text))
                } else {
                    Ok(Ident::quoted(token.text))
                }
            }
            _ => match token.as_ident_value() {
                Some(value) => {
                    let value = value.to_string();
                    self.advance();
                    Ok(Ident::unquoted(value))
                }
                None => Err(self.error_here("expected identifier")),
            },
        }
    }

    pub(crate) fn parse_qualified_name(&mut self) -> ParseResult<QualifiedName> {
        let first = self.parse_ident()?;
        if self.eat_kind(TokenKind::Dot) {
            let name = self.parse_ident()?;
            Ok(QualifiedName {
                schema: Some(first),
                name,
            })
        } else {
            Ok(QualifiedName {
                schema: None,
                name: first,
            })
        }
    }

    pub(crate) fn parse_ident_list(&mut self) -> ParseResult<Vec<Ident>> {
        let mut idents = vec![self.parse_ident()?];
        while self.eat_kind(TokenKind::Comma) {
            idents.push(self.parse_ident()?);
        }
        Ok(idents)
    }

    /// `( ident, ident, … )`
    pub(crate) fn parse_paren_ident_list(&mut self) -> ParseResult<Vec<Ident>> {
        self.expect_kind(TokenKind::LParen)?;
        let idents = self.parse_ident_list()?;
        self.expect_kind(TokenKind::RParen)?;
        Ok(idents)
    }

    pub(crate) fn parse_string(&mut self) -> ParseResult<String> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::StringLit | TokenKind::NationalStringLit | TokenKind::DollarString => {
                self.advance();
                Ok(token.text)
            }
            _ => Err(self.error_here("expected string literal")),
        }
    }

    // --- error construction ---

    pub(crate) fn error_here(&self, expected: &str) -> SyntaxError {
        let token = self.peek();
        self.error_at(token, expected)
    }

    pub(crate) fn error_at(&self, token: &Token, expected: &str) -> SyntaxError {
        let near_token = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::LexError => format!("{} (unterminated)", token.text),
            _ => token.text.clone(),
        };
        let snippet = self
            .source_lines
            .get(token.line.saturating_sub(1))
            .copied()
            .unwrap_or("")
            .to_string();

        SyntaxError {
            line: token.line,
            column: token.column,
            snippet,
            caret_col: token.column,
            near_token,
            message: expected.to_string(),
        }
    }
}

/// True when quoting this spelling changes nothing: all-lowercase,
/// identifier-shaped, so the server would fold the bare form to it.
fn is_folded_ident(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_lowercase() || first == '_') {
        return false;
    }
    chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}
