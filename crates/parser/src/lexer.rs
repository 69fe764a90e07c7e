//! Hand-tuned streaming lexer. One scanner, four dialect modes; the
//! dialect-sensitive branches are identifier quoting, the postgres
//! operator set and dollar quoting, mssql national strings, and mysql
//! version-gated comments.

use crate::keywords::Keyword;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserMode {
    Mysql,
    Postgres,
    Sqlite3,
    Mssql,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    mode: ParserMode,
    line: usize,
    column: usize,
    /// One-token lookahead buffer for the `WITH [NO] DATA` peek.
    lookahead: Option<Token>,
    /// Re-entrancy guard: the peek path must not trigger another peek.
    peeking: bool,
    /// Inside a mysql `/*! … */` comment whose body is re-tokenized.
    in_version_comment: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, mode: ParserMode) -> Self {
        Self {
            chars: source.chars().peekable(),
            mode,
            line: 1,
            column: 1,
            lookahead: None,
            peeking: false,
            in_version_comment: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> ParserMode {
        self.mode
    }

    /// Tokenize the whole input. The trailing token is always `Eof` (or a
    /// `LexError` when the scanner died inside a string or comment).
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            let is_error = token.kind == TokenKind::LexError;
            tokens.push(token);
            if is_eof || is_error {
                break;
            }
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.lookahead.take() {
            return self.with_data_disambiguation(token);
        }

        let token = self.scan_token();
        self.with_data_disambiguation(token)
    }

    /// `WITH` directly before `DATA` or `NO` becomes its own token kind.
    /// The peek buffers exactly one token and never recurses into itself.
    fn with_data_disambiguation(&mut self, token: Token) -> Token {
        if self.peeking || !token.is_keyword(Keyword::WITH) {
            return token;
        }

        self.peeking = true;
        let next = self.scan_token();
        self.peeking = false;

        let follows_data =
            next.is_keyword(Keyword::DATA) || next.is_keyword(Keyword::NO);
        self.lookahead = Some(next);

        if follows_data {
            Token::new(TokenKind::WithBeforeData, token.text, token.line, token.column)
        } else {
            token
        }
    }

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let line = self.line;
            let column = self.column;
            let Some(ch) = self.peek() else {
                if self.in_version_comment {
                    return self.lex_error("/*!", line, column);
                }
                return Token::new(TokenKind::Eof, "", line, column);
            };

            match ch {
                '-' => {
                    self.bump();
                    if self.peek() == Some('-') {
                        self.skip_line_comment();
                        continue;
                    }
                    if self.peek() == Some('>') {
                        self.bump();
                        if self.peek() == Some('>') {
                            self.bump();
                            return Token::new(TokenKind::LongArrow, "->>", line, column);
                        }
                        return Token::new(TokenKind::Arrow, "->", line, column);
                    }
                    return Token::new(TokenKind::Minus, "-", line, column);
                }
                '#' if self.mode == ParserMode::Mysql => {
                    self.skip_line_comment();
                    continue;
                }
                '/' => {
                    self.bump();
                    if self.peek() == Some('*') {
                        self.bump();
                        if self.mode == ParserMode::Mysql && self.peek() == Some('!') {
                            // `/*! … */`: the gated body is real SQL for
                            // us, so surface its tokens instead of
                            // skipping.
                            self.bump();
                            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                                self.bump();
                            }
                            self.in_version_comment = true;
                            continue;
                        }
                        if !self.skip_block_comment() {
                            return self.lex_error("/*", line, column);
                        }
                        continue;
                    }
                    return Token::new(TokenKind::Slash, "/", line, column);
                }
                '*' => {
                    self.bump();
                    if self.in_version_comment && self.peek() == Some('/') {
                        self.bump();
                        self.in_version_comment = false;
                        continue;
                    }
                    return Token::new(TokenKind::Star, "*", line, column);
                }
                '\'' => return self.scan_string(line, column),
                '"' => {
                    if self.mode == ParserMode::Mysql {
                        return self.scan_mysql_double_quoted_string(line, column);
                    }
                    return self.scan_quoted_ident('"', '"', line, column);
                }
                '`' if self.mode == ParserMode::Mysql => {
                    return self.scan_quoted_ident('`', '`', line, column);
                }
                '[' if self.mode == ParserMode::Mssql => {
                    return self.scan_quoted_ident('[', ']', line, column);
                }
                '$' if self.mode == ParserMode::Postgres => {
                    return self.scan_dollar(line, column);
                }
                'N' | 'n'
                    if self.mode == ParserMode::Mssql && self.peek_second() == Some('\'') =>
                {
                    self.bump();
                    let token = self.scan_string(line, column);
                    if token.kind == TokenKind::LexError {
                        return token;
                    }
                    return Token::new(TokenKind::NationalStringLit, token.text, line, column);
                }
                'x' | 'X' if self.peek_second() == Some('\'') => {
                    self.bump();
                    let token = self.scan_string(line, column);
                    if token.kind == TokenKind::LexError {
                        return token;
                    }
                    return Token::new(TokenKind::HexLit, token.text, line, column);
                }
                'b' | 'B' if self.peek_second() == Some('\'') => {
                    self.bump();
                    let token = self.scan_string(line, column);
                    if token.kind == TokenKind::LexError {
                        return token;
                    }
                    return Token::new(TokenKind::BitLit, token.text, line, column);
                }
                c if c.is_ascii_digit() => return self.scan_number(line, column),
                '.' => {
                    if matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) {
                        return self.scan_number(line, column);
                    }
                    self.bump();
                    return Token::new(TokenKind::Dot, ".", line, column);
                }
                c if is_ident_start(c) => return self.scan_word(line, column),
                _ => return self.scan_operator(line, column),
            }
        }
    }

    fn scan_operator(&mut self, line: usize, column: usize) -> Token {
        let ch = self.bump().unwrap_or('\0');
        let single = |kind| Token::new(kind, ch.to_string(), line, column);

        match ch {
            '(' => single(TokenKind::LParen),
            ')' => single(TokenKind::RParen),
            '[' => single(TokenKind::LBracket),
            ']' => single(TokenKind::RBracket),
            ',' => single(TokenKind::Comma),
            ';' => single(TokenKind::Semicolon),
            '+' => single(TokenKind::Plus),
            '%' => single(TokenKind::Percent),
            '^' => single(TokenKind::Caret),
            '&' => {
                if self.peek() == Some('&') {
                    self.bump();
                    Token::new(TokenKind::AmpAmp, "&&", line, column)
                } else {
                    single(TokenKind::Ampersand)
                }
            }
            '=' => single(TokenKind::Eq),
            '|' => {
                if self.peek() == Some('|') {
                    self.bump();
                    Token::new(TokenKind::PipePipe, "||", line, column)
                } else {
                    single(TokenKind::Pipe)
                }
            }
            '<' => match self.peek() {
                Some('=') => {
                    self.bump();
                    Token::new(TokenKind::LtEq, "<=", line, column)
                }
                Some('>') => {
                    self.bump();
                    Token::new(TokenKind::Neq, "<>", line, column)
                }
                Some('<') => {
                    self.bump();
                    Token::new(TokenKind::ShiftLeft, "<<", line, column)
                }
                _ => single(TokenKind::Lt),
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.bump();
                    Token::new(TokenKind::GtEq, ">=", line, column)
                }
                Some('>') => {
                    self.bump();
                    Token::new(TokenKind::ShiftRight, ">>", line, column)
                }
                _ => single(TokenKind::Gt),
            },
            ':' => {
                if self.mode == ParserMode::Postgres && self.peek() == Some(':') {
                    self.bump();
                    Token::new(TokenKind::DoubleColon, "::", line, column)
                } else {
                    single(TokenKind::Colon)
                }
            }
            '!' => match self.peek() {
                Some('=') => {
                    self.bump();
                    Token::new(TokenKind::Neq, "!=", line, column)
                }
                Some('~') if self.mode == ParserMode::Postgres => {
                    self.bump();
                    self.scan_negated_tilde(line, column)
                }
                _ => self.lex_error("!", line, column),
            },
            '~' if self.mode == ParserMode::Postgres => self.scan_tilde(line, column),
            other => self.lex_error(&other.to_string(), line, column),
        }
    }

    /// `~`, `~*`, `~~`, `~~*` after the leading `~` was consumed.
    fn scan_tilde(&mut self, line: usize, column: usize) -> Token {
        match self.peek() {
            Some('~') => {
                self.bump();
                if self.peek() == Some('*') {
                    self.bump();
                    Token::new(TokenKind::TildeTildeStar, "~~*", line, column)
                } else {
                    Token::new(TokenKind::TildeTilde, "~~", line, column)
                }
            }
            Some('*') => {
                self.bump();
                Token::new(TokenKind::TildeStar, "~*", line, column)
            }
            _ => Token::new(TokenKind::Tilde, "~", line, column),
        }
    }

    /// `!~`, `!~*`, `!~~`, `!~~*` after `!~` was consumed.
    fn scan_negated_tilde(&mut self, line: usize, column: usize) -> Token {
        match self.peek() {
            Some('~') => {
                self.bump();
                if self.peek() == Some('*') {
                    self.bump();
                    Token::new(TokenKind::NotTildeTildeStar, "!~~*", line, column)
                } else {
                    Token::new(TokenKind::NotTildeTilde, "!~~", line, column)
                }
            }
            Some('*') => {
                self.bump();
                Token::new(TokenKind::NotTildeStar, "!~*", line, column)
            }
            _ => Token::new(TokenKind::NotTilde, "!~", line, column),
        }
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Token {
        self.bump(); // opening quote
        let mut text = String::new();

        loop {
            match self.bump() {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.bump();
                        text.push('\'');
                        continue;
                    }
                    return Token::new(TokenKind::StringLit, text, line, column);
                }
                Some('\\') if self.mode == ParserMode::Mysql => match self.bump() {
                    Some(escaped) => text.push(unescape_mysql(escaped)),
                    None => return self.lex_error(&format!("'{text}"), line, column),
                },
                Some(ch) => text.push(ch),
                None => return self.lex_error(&format!("'{text}"), line, column),
            }
        }
    }

    /// In mysql, `"foo"` is a string literal, not an identifier.
    fn scan_mysql_double_quoted_string(&mut self, line: usize, column: usize) -> Token {
        self.bump();
        let mut text = String::new();

        loop {
            match self.bump() {
                Some('"') => {
                    if self.peek() == Some('"') {
                        self.bump();
                        text.push('"');
                        continue;
                    }
                    return Token::new(TokenKind::StringLit, text, line, column);
                }
                Some('\\') => match self.bump() {
                    Some(escaped) => text.push(unescape_mysql(escaped)),
                    None => return self.lex_error(&format!("\"{text}"), line, column),
                },
                Some(ch) => text.push(ch),
                None => return self.lex_error(&format!("\"{text}"), line, column),
            }
        }
    }

    fn scan_quoted_ident(&mut self, open: char, close: char, line: usize, column: usize) -> Token {
        self.bump(); // opening quote
        let mut text = String::new();

        loop {
            match self.bump() {
                Some(ch) if ch == close => {
                    // Doubled closing quote escapes itself (`""`, ``` `` ```,
                    // `]]`).
                    if self.peek() == Some(close) {
                        self.bump();
                        text.push(close);
                        continue;
                    }
                    return Token::new(TokenKind::QuotedIdent, text, line, column);
                }
                Some(ch) => text.push(ch),
                None => {
                    return self.lex_error(&format!("{open}{text}"), line, column);
                }
            }
        }
    }

    /// `$tag$…$tag$` dollar strings (empty tag allowed) and `$n`
    /// positional parameters.
    fn scan_dollar(&mut self, line: usize, column: usize) -> Token {
        self.bump(); // '$'

        if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            let mut digits = String::new();
            while let Some(c) = self.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits.push(c);
                self.bump();
            }
            return Token::new(TokenKind::Parameter, digits, line, column);
        }

        let mut tag = String::new();
        while let Some(c) = self.peek() {
            if c == '$' {
                break;
            }
            if !is_ident_part(c) {
                return self.lex_error(&format!("${tag}"), line, column);
            }
            tag.push(c);
            self.bump();
        }
        if self.peek() != Some('$') {
            return self.lex_error(&format!("${tag}"), line, column);
        }
        self.bump(); // closing '$' of the opening delimiter

        let delimiter = format!("${tag}$");
        let mut body = String::new();
        loop {
            if self.remaining_starts_with(&delimiter) {
                for _ in 0..delimiter.chars().count() {
                    self.bump();
                }
                return Token::new(TokenKind::DollarString, body, line, column);
            }
            match self.bump() {
                Some(ch) => body.push(ch),
                None => {
                    return self.lex_error(&format!("{delimiter}{body}"), line, column);
                }
            }
        }
    }

    fn scan_number(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        let mut seen_dot = false;
        let mut seen_exponent = false;

        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {
                    text.push(c);
                    self.bump();
                }
                '.' if !seen_dot && !seen_exponent => {
                    seen_dot = true;
                    text.push(c);
                    self.bump();
                }
                'e' | 'E' if !seen_exponent && !text.is_empty() => {
                    seen_exponent = true;
                    text.push(c);
                    self.bump();
                    if matches!(self.peek(), Some('+' | '-')) {
                        text.push(self.bump().unwrap_or('+'));
                    }
                }
                _ => break,
            }
        }

        Token::new(TokenKind::Number, text, line, column)
    }

    fn scan_word(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_part(c) {
                break;
            }
            text.push(c);
            self.bump();
        }

        let keyword = Keyword::lookup(&text);
        Token::new(TokenKind::Word(keyword), text, line, column)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Block comments nest (postgres rule); returns false on EOF inside.
    fn skip_block_comment(&mut self) -> bool {
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    depth -= 1;
                }
                Some('/') if self.peek() == Some('*') => {
                    self.bump();
                    depth += 1;
                }
                Some(_) => {}
                None => return false,
            }
        }
        true
    }

    fn lex_error(&self, partial: &str, line: usize, column: usize) -> Token {
        Token::new(TokenKind::LexError, partial, line, column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_second(&self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    fn remaining_starts_with(&self, needle: &str) -> bool {
        let mut clone = self.chars.clone();
        needle.chars().all(|expected| clone.next() == Some(expected))
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next();
        match ch {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        ch
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn unescape_mysql(escaped: char) -> char {
    match escaped {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}
