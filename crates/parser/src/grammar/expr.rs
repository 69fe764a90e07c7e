//! Expression grammar: precedence climbing from OR down to postfix casts,
//! plus data-type parsing and raw-text capture for embedded SELECTs.

use declsql_core::{
    BinaryOperator, ComparisonOp, DataType, Expr, IsTest, Literal, SetQuantifier, SubQuery,
    SyntaxError,
};

use super::Parser;
use crate::keywords::Keyword;
use crate::token::{Token, TokenKind};

type ParseResult<T> = Result<T, SyntaxError>;

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and_expr()?;
        while self.eat_keyword(Keyword::OR) {
            let right = self.parse_and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_not_expr()?;
        while self.eat_keyword(Keyword::AND) {
            let right = self.parse_not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> ParseResult<Expr> {
        if self.check_keyword(Keyword::NOT) && !self.peek_ahead(1).is_keyword(Keyword::NULL) {
            self.advance();
            let inner = self.parse_not_expr()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> ParseResult<Expr> {
        let left = self.parse_additive()?;

        if self.eat_keyword(Keyword::IS) {
            return self.parse_is_test(left);
        }

        if let Some(op) = self.eat_comparison_op() {
            return self.parse_comparison_rhs(left, op);
        }

        let negated = if self.check_keyword(Keyword::NOT)
            && (self.peek_ahead(1).is_keyword(Keyword::IN)
                || self.peek_ahead(1).is_keyword(Keyword::LIKE)
                || self.peek_ahead(1).is_keyword(Keyword::ILIKE)
                || self.peek_ahead(1).is_keyword(Keyword::BETWEEN))
        {
            self.advance();
            true
        } else {
            false
        };

        if self.eat_keyword(Keyword::IN) {
            return self.parse_in_rhs(left, negated);
        }
        if self.eat_keyword(Keyword::BETWEEN) {
            let low = self.parse_additive()?;
            self.expect_keyword(Keyword::AND)?;
            let high = self.parse_additive()?;
            return Ok(Expr::Between {
                expr: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
                negated,
            });
        }
        if self.eat_keyword(Keyword::LIKE) {
            let op = if negated {
                ComparisonOp::NotLike
            } else {
                ComparisonOp::Like
            };
            return self.parse_comparison_rhs(left, op);
        }
        if self.eat_keyword(Keyword::ILIKE) {
            let op = if negated {
                ComparisonOp::NotILike
            } else {
                ComparisonOp::ILike
            };
            return self.parse_comparison_rhs(left, op);
        }
        if negated {
            return Err(self.error_here("expected IN, LIKE, ILIKE, or BETWEEN after NOT"));
        }

        Ok(left)
    }

    fn parse_is_test(&mut self, expr: Expr) -> ParseResult<Expr> {
        let negated = self.eat_keyword(Keyword::NOT);
        let test = if self.eat_keyword(Keyword::NULL) {
            if negated { IsTest::NotNull } else { IsTest::Null }
        } else if self.eat_keyword(Keyword::TRUE) {
            if negated { IsTest::NotTrue } else { IsTest::True }
        } else if self.eat_keyword(Keyword::FALSE) {
            if negated { IsTest::NotFalse } else { IsTest::False }
        } else if self.eat_keyword(Keyword::UNKNOWN) {
            if negated {
                IsTest::NotUnknown
            } else {
                IsTest::Unknown
            }
        } else {
            return Err(self.error_here("expected NULL, TRUE, FALSE, or UNKNOWN after IS"));
        };

        Ok(Expr::Is {
            expr: Box::new(expr),
            test,
        })
    }

    /// Internal operator symbols map onto the same canonical comparison
    /// nodes as their keyword spellings (`~~` is LIKE, `~` is a POSIX
    /// regex match), so both inputs diff as equal.
    fn eat_comparison_op(&mut self) -> Option<ComparisonOp> {
        let op = match self.peek_kind() {
            TokenKind::Eq => ComparisonOp::Equal,
            TokenKind::Neq => ComparisonOp::NotEqual,
            TokenKind::Lt => ComparisonOp::LessThan,
            TokenKind::LtEq => ComparisonOp::LessThanOrEqual,
            TokenKind::Gt => ComparisonOp::GreaterThan,
            TokenKind::GtEq => ComparisonOp::GreaterThanOrEqual,
            TokenKind::TildeTilde => ComparisonOp::Like,
            TokenKind::NotTildeTilde => ComparisonOp::NotLike,
            TokenKind::TildeTildeStar => ComparisonOp::ILike,
            TokenKind::NotTildeTildeStar => ComparisonOp::NotILike,
            TokenKind::Tilde => ComparisonOp::Regexp,
            TokenKind::TildeStar => ComparisonOp::RegexpCi,
            TokenKind::NotTilde => ComparisonOp::NotRegexp,
            TokenKind::NotTildeStar => ComparisonOp::NotRegexpCi,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_comparison_rhs(&mut self, left: Expr, op: ComparisonOp) -> ParseResult<Expr> {
        let quantifier = if self.eat_keyword(Keyword::ANY) {
            Some(SetQuantifier::Any)
        } else if self.eat_keyword(Keyword::SOME) {
            Some(SetQuantifier::Some)
        } else if self.eat_keyword(Keyword::ALL) {
            Some(SetQuantifier::All)
        } else {
            None
        };

        let right = if quantifier.is_some() {
            self.expect_kind(TokenKind::LParen)?;
            let inner = if self.check_keyword(Keyword::SELECT) {
                Expr::Subquery(Box::new(SubQuery {
                    sql: self.capture_balanced_text()?,
                }))
            } else {
                self.parse_expr()?
            };
            self.expect_kind(TokenKind::RParen)?;
            inner
        } else {
            self.parse_additive()?
        };

        Ok(Expr::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
            quantifier,
        })
    }

    fn parse_in_rhs(&mut self, left: Expr, negated: bool) -> ParseResult<Expr> {
        self.expect_kind(TokenKind::LParen)?;

        if self.check_keyword(Keyword::SELECT) {
            let sql = self.capture_balanced_text()?;
            self.expect_kind(TokenKind::RParen)?;
            return Ok(Expr::In {
                expr: Box::new(left),
                list: vec![Expr::Subquery(Box::new(SubQuery { sql }))],
                negated,
            });
        }

        let mut list = vec![self.parse_expr()?];
        while self.eat_kind(TokenKind::Comma) {
            list.push(self.parse_expr()?);
        }
        self.expect_kind(TokenKind::RParen)?;

        Ok(Expr::In {
            expr: Box::new(left),
            list,
            negated,
        })
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                TokenKind::PipePipe => BinaryOperator::StringConcat,
                TokenKind::Ampersand => BinaryOperator::BitwiseAnd,
                TokenKind::Pipe => BinaryOperator::BitwiseOr,
                TokenKind::Caret => BinaryOperator::BitwiseXor,
                TokenKind::ShiftLeft => BinaryOperator::ShiftLeft,
                TokenKind::ShiftRight => BinaryOperator::ShiftRight,
                TokenKind::Arrow => BinaryOperator::JsonGet,
                TokenKind::LongArrow => BinaryOperator::JsonGetText,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                TokenKind::Percent => BinaryOperator::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                let inner = self.parse_unary()?;
                Ok(fold_signed_literal(inner, true))
            }
            TokenKind::Plus => {
                self.advance();
                let inner = self.parse_unary()?;
                Ok(fold_signed_literal(inner, false))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_kind(TokenKind::DoubleColon) {
                let data_type = self.parse_data_type()?;
                expr = Expr::Cast {
                    expr: Box::new(expr),
                    data_type,
                };
                continue;
            }
            if self.check_keyword(Keyword::COLLATE) {
                self.advance();
                let name = self.parse_qualified_name()?;
                expr = Expr::Collate {
                    expr: Box::new(expr),
                    collation: render_collation_name(&name),
                };
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Expr::Literal(parse_number_literal(&token.text)))
            }
            TokenKind::StringLit | TokenKind::NationalStringLit => {
                self.advance();
                Ok(Expr::Literal(Literal::String(token.text)))
            }
            TokenKind::DollarString => {
                self.advance();
                Ok(Expr::Literal(Literal::String(token.text)))
            }
            TokenKind::HexLit => {
                self.advance();
                Ok(Expr::Literal(Literal::Hex(token.text)))
            }
            TokenKind::BitLit => {
                self.advance();
                Ok(Expr::Literal(Literal::Bit(token.text)))
            }
            TokenKind::Parameter => {
                self.advance();
                Ok(Expr::Raw(format!("${}", token.text)))
            }
            TokenKind::LParen => {
                self.advance();
                if self.check_keyword(Keyword::SELECT) {
                    let sql = self.capture_balanced_text()?;
                    self.expect_kind(TokenKind::RParen)?;
                    return Ok(Expr::Subquery(Box::new(SubQuery { sql })));
                }
                let first = self.parse_expr()?;
                if self.eat_kind(TokenKind::Comma) {
                    let mut items = vec![first, self.parse_expr()?];
                    while self.eat_kind(TokenKind::Comma) {
                        items.push(self.parse_expr()?);
                    }
                    self.expect_kind(TokenKind::RParen)?;
                    return Ok(Expr::Tuple(items));
                }
                self.expect_kind(TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(first)))
            }
            TokenKind::QuotedIdent => self.parse_ident_expr(),
            TokenKind::Word(Some(keyword)) => match keyword {
                Keyword::NULL => {
                    self.advance();
                    Ok(Expr::Null)
                }
                Keyword::TRUE => {
                    self.advance();
                    Ok(Expr::Literal(Literal::Boolean(true)))
                }
                Keyword::FALSE => {
                    self.advance();
                    Ok(Expr::Literal(Literal::Boolean(false)))
                }
                Keyword::CASE => self.parse_case(),
                Keyword::CAST => self.parse_cast(),
                Keyword::ARRAY => self.parse_array_constructor(),
                Keyword::EXISTS => self.parse_exists(),
                Keyword::INTERVAL => self.parse_interval(),
                Keyword::CURRENT_TIMESTAMP
                | Keyword::CURRENT_DATE
                | Keyword::CURRENT_TIME
                | Keyword::CURRENT_USER
                | Keyword::SESSION_USER => {
                    self.advance();
                    Ok(Expr::Function {
                        name: token.text.to_ascii_lowercase(),
                        args: Vec::new(),
                    })
                }
                _ if !keyword.is_reserved() => self.parse_ident_expr(),
                _ => Err(self.error_here("unexpected keyword in expression")),
            },
            TokenKind::Word(None) => self.parse_ident_expr(),
            _ => Err(self.error_here("expected expression")),
        }
    }

    /// Identifier, qualified identifier, or function call.
    fn parse_ident_expr(&mut self) -> ParseResult<Expr> {
        let first = self.parse_ident()?;

        if self.eat_kind(TokenKind::Dot) {
            let second = self.parse_ident()?;
            if self.peek_kind() == TokenKind::LParen {
                let name = format!("{}.{}", first.value, second.value);
                return self.parse_function_call(name);
            }
            return Ok(Expr::QualifiedIdent {
                qualifier: first,
                name: second,
            });
        }

        if self.peek_kind() == TokenKind::LParen {
            return self.parse_function_call(first.value);
        }

        Ok(Expr::Ident(first))
    }

    fn parse_function_call(&mut self, name: String) -> ParseResult<Expr> {
        self.expect_kind(TokenKind::LParen)?;

        let mut args = Vec::new();
        if self.peek_kind() == TokenKind::Star {
            self.advance();
            args.push(Expr::Raw("*".to_string()));
        } else if self.peek_kind() != TokenKind::RParen {
            args.push(self.parse_expr()?);
            while self.eat_kind(TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
        }
        self.expect_kind(TokenKind::RParen)?;

        Ok(Expr::Function { name, args })
    }

    fn parse_case(&mut self) -> ParseResult<Expr> {
        self.expect_keyword(Keyword::CASE)?;

        let operand = if self.check_keyword(Keyword::WHEN) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        let mut when_clauses = Vec::new();
        while self.eat_keyword(Keyword::WHEN) {
            let when_expr = self.parse_expr()?;
            self.expect_keyword(Keyword::THEN)?;
            let then_expr = self.parse_expr()?;
            when_clauses.push((when_expr, then_expr));
        }
        if when_clauses.is_empty() {
            return Err(self.error_here("CASE requires at least one WHEN clause"));
        }

        let else_clause = if self.eat_keyword(Keyword::ELSE) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword(Keyword::END)?;

        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    fn parse_cast(&mut self) -> ParseResult<Expr> {
        self.expect_keyword(Keyword::CAST)?;
        self.expect_kind(TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect_keyword(Keyword::AS)?;
        let data_type = self.parse_data_type()?;
        self.expect_kind(TokenKind::RParen)?;

        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    fn parse_array_constructor(&mut self) -> ParseResult<Expr> {
        self.expect_keyword(Keyword::ARRAY)?;
        self.expect_kind(TokenKind::LBracket)?;

        let mut items = Vec::new();
        if self.peek_kind() != TokenKind::RBracket {
            items.push(self.parse_expr()?);
            while self.eat_kind(TokenKind::Comma) {
                items.push(self.parse_expr()?);
            }
        }
        self.expect_kind(TokenKind::RBracket)?;

        Ok(Expr::ArrayConstructor(items))
    }

    fn parse_exists(&mut self) -> ParseResult<Expr> {
        self.expect_keyword(Keyword::EXISTS)?;
        self.expect_kind(TokenKind::LParen)?;
        let sql = self.capture_balanced_text()?;
        self.expect_kind(TokenKind::RParen)?;

        Ok(Expr::Exists(Box::new(SubQuery { sql })))
    }

    fn parse_interval(&mut self) -> ParseResult<Expr> {
        self.expect_keyword(Keyword::INTERVAL)?;
        let value = self.parse_string()?;

        let unit = match self.peek().as_ident_value() {
            Some(word) if is_interval_unit(word) => {
                let unit = word.to_ascii_lowercase();
                self.advance();
                Some(unit)
            }
            _ => None,
        };

        Ok(Expr::Interval {
            value: Box::new(Expr::Literal(Literal::String(value))),
            unit,
        })
    }

    // --- data types ---

    pub(crate) fn parse_data_type(&mut self) -> ParseResult<DataType> {
        let token = self.peek().clone();
        let word = match token.as_ident_value() {
            Some(value) => value.to_ascii_lowercase(),
            None => return Err(self.error_here("expected data type")),
        };
        self.advance();

        let mut data_type = match word.as_str() {
            "bool" | "boolean" => DataType::Boolean,
            "int2" | "smallint" => DataType::SmallInt,
            "int" | "int4" | "integer" | "mediumint" => DataType::Integer,
            "int8" | "bigint" => DataType::BigInt,
            "float4" | "real" => DataType::Real,
            "float8" => DataType::DoublePrecision,
            "float" => self.parse_float_type()?,
            "double" => {
                self.eat_keyword(Keyword::PRECISION);
                DataType::DoublePrecision
            }
            "numeric" | "decimal" => self.parse_numeric_type()?,
            "text" => DataType::Text,
            "varchar" => DataType::Varchar {
                length: self.parse_optional_length()?,
            },
            "character" => {
                if self.eat_keyword(Keyword::VARYING) {
                    DataType::Varchar {
                        length: self.parse_optional_length()?,
                    }
                } else {
                    DataType::Char {
                        length: self.parse_optional_length()?,
                    }
                }
            }
            "char" | "bpchar" => DataType::Char {
                length: self.parse_optional_length()?,
            },
            "bytea" | "blob" => DataType::Blob,
            "date" => DataType::Date,
            "time" => {
                let precision = self.parse_optional_length()?;
                let with_timezone = self.parse_timezone_suffix();
                DataType::Time {
                    precision,
                    with_timezone,
                }
            }
            "timetz" => DataType::Time {
                precision: None,
                with_timezone: true,
            },
            "timestamp" => {
                let precision = self.parse_optional_length()?;
                let with_timezone = self.parse_timezone_suffix();
                DataType::Timestamp {
                    precision,
                    with_timezone,
                }
            }
            "timestamptz" => DataType::Timestamp {
                precision: self.parse_optional_length()?,
                with_timezone: true,
            },
            "interval" => DataType::Interval,
            "json" => DataType::Json,
            "jsonb" => DataType::Jsonb,
            "uuid" => DataType::Uuid,
            _ => self.parse_custom_type(word)?,
        };

        while self.eat_kind(TokenKind::LBracket) {
            self.expect_kind(TokenKind::RBracket)?;
            data_type = DataType::Array(Box::new(data_type));
        }

        Ok(data_type)
    }

    fn parse_float_type(&mut self) -> ParseResult<DataType> {
        match self.parse_optional_length()? {
            Some(precision) if precision <= 24 => Ok(DataType::Real),
            _ => Ok(DataType::DoublePrecision),
        }
    }

    fn parse_numeric_type(&mut self) -> ParseResult<DataType> {
        if !self.eat_kind(TokenKind::LParen) {
            return Ok(DataType::Numeric {
                precision: None,
                scale: None,
            });
        }

        let precision = Some(self.parse_unsigned_number()?);
        let scale = if self.eat_kind(TokenKind::Comma) {
            Some(self.parse_unsigned_number()?)
        } else {
            None
        };
        self.expect_kind(TokenKind::RParen)?;

        Ok(DataType::Numeric { precision, scale })
    }

    fn parse_optional_length(&mut self) -> ParseResult<Option<u32>> {
        if !self.eat_kind(TokenKind::LParen) {
            return Ok(None);
        }
        let length = self.parse_unsigned_number()?;
        self.expect_kind(TokenKind::RParen)?;
        Ok(Some(length))
    }

    fn parse_unsigned_number(&mut self) -> ParseResult<u32> {
        let token = self.expect_kind(TokenKind::Number)?;
        token
            .text
            .parse::<u32>()
            .map_err(|_| self.error_at(&token, "expected an unsigned integer"))
    }

    /// `WITH TIME ZONE` / `WITHOUT TIME ZONE`; absent means without.
    fn parse_timezone_suffix(&mut self) -> bool {
        if self.eat_keyword(Keyword::WITH) {
            let _ = self.eat_keyword(Keyword::TIME) && self.eat_keyword(Keyword::ZONE);
            return true;
        }
        if self.eat_keyword(Keyword::WITHOUT) {
            let _ = self.eat_keyword(Keyword::TIME) && self.eat_keyword(Keyword::ZONE);
        }
        false
    }

    /// Everything else: enum references, qualified types, mysql oddities.
    /// The text is preserved for the dialect normalizer to canonicalize.
    fn parse_custom_type(&mut self, first_word: String) -> ParseResult<DataType> {
        let mut name = first_word;

        while self.eat_kind(TokenKind::Dot) {
            let part = self.parse_ident()?;
            name.push('.');
            name.push_str(&part.value);
        }

        // mysql `enum('a','b')` and parametrized custom types keep their
        // argument list verbatim.
        if self.eat_kind(TokenKind::LParen) {
            let args = self.capture_balanced_text()?;
            self.expect_kind(TokenKind::RParen)?;
            name.push('(');
            name.push_str(&args);
            name.push(')');
        }

        if self.eat_keyword(Keyword::UNSIGNED) {
            name.push_str(" unsigned");
        }
        if self.eat_keyword(Keyword::ZEROFILL) {
            name.push_str(" zerofill");
        }

        Ok(DataType::Custom(name))
    }

    // --- raw text capture ---

    /// Collects tokens up to (not including) the parenthesis that closes
    /// the current nesting level, rendered back to normalized SQL text.
    pub(crate) fn capture_balanced_text(&mut self) -> ParseResult<String> {
        let mut depth = 0usize;
        let mut tokens = Vec::new();

        loop {
            match self.peek_kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Eof | TokenKind::LexError => {
                    return Err(self.error_here("unterminated parenthesized expression"));
                }
                _ => {}
            }
            tokens.push(self.advance());
        }

        Ok(join_tokens(&tokens))
    }

    /// Collects tokens to the end of the statement, rendered back to
    /// normalized SQL text (view bodies). Stops short of a trailing
    /// `WITH [NO] DATA` clause so materialized views can consume it.
    pub(crate) fn capture_statement_tail(&mut self) -> ParseResult<String> {
        let mut tokens = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::Semicolon | TokenKind::WithBeforeData => break,
                TokenKind::LexError => {
                    return Err(self.error_here("unterminated statement"));
                }
                _ => tokens.push(self.advance()),
            }
        }
        Ok(join_tokens(&tokens))
    }
}

fn fold_signed_literal(inner: Expr, negative: bool) -> Expr {
    // `-5` is the literal -5, not a unary op applied to 5; the unary op
    // survives only around non-literal operands.
    match inner {
        Expr::Literal(Literal::Integer(value)) => {
            Expr::Literal(Literal::Integer(if negative { -value } else { value }))
        }
        Expr::Literal(Literal::Float(value)) => {
            Expr::Literal(Literal::Float(if negative { -value } else { value }))
        }
        other => Expr::UnaryOp {
            op: if negative {
                declsql_core::UnaryOperator::Minus
            } else {
                declsql_core::UnaryOperator::Plus
            },
            expr: Box::new(other),
        },
    }
}

fn parse_number_literal(text: &str) -> Literal {
    if !text.contains('.') && !text.contains('e') && !text.contains('E') {
        if let Ok(value) = text.parse::<i64>() {
            return Literal::Integer(value);
        }
    }
    match text.parse::<f64>() {
        Ok(value) => Literal::Float(value),
        Err(_) => Literal::Integer(0),
    }
}

fn render_collation_name(name: &declsql_core::QualifiedName) -> String {
    match &name.schema {
        Some(schema) => format!("{}.{}", schema.value, name.name.value),
        None => name.name.value.clone(),
    }
}

fn is_interval_unit(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "year" | "month" | "week" | "day" | "hour" | "minute" | "second"
            | "years" | "months" | "weeks" | "days" | "hours" | "minutes" | "seconds"
    )
}

/// Render a token run back to text with conventional spacing; used for
/// view bodies and subqueries, which are compared textually.
pub(crate) fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();

    for token in tokens {
        let text = token_text(token);
        let no_space_before = matches!(
            token.kind,
            TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::Dot
                | TokenKind::DoubleColon
                | TokenKind::Semicolon
        );
        let last = out.chars().last();
        let no_space_after_last = matches!(last, Some('(') | Some('[') | Some('.') | None)
            || out.ends_with("::");

        if !no_space_before && !no_space_after_last {
            out.push(' ');
        }
        out.push_str(&text);
    }

    out
}

fn token_text(token: &Token) -> String {
    match token.kind {
        TokenKind::StringLit | TokenKind::NationalStringLit | TokenKind::DollarString => {
            format!("'{}'", token.text.replace('\'', "''"))
        }
        TokenKind::QuotedIdent => format!("\"{}\"", token.text.replace('"', "\"\"")),
        TokenKind::Parameter => format!("${}", token.text),
        TokenKind::HexLit => format!("x'{}'", token.text),
        TokenKind::BitLit => format!("b'{}'", token.text),
        _ => token.text.clone(),
    }
}
