//! Hand-written SQL DDL parser: a dialect-mode tokenizer, a recursive
//! descent grammar over the core IR, and a statement splitter that
//! tolerates semicolons embedded in strings and dollar-quoted bodies.

mod grammar;
mod keywords;
mod lexer;
mod splitter;
mod token;

use std::collections::BTreeMap;
use std::io;

use declsql_core::{
    Expr, ParseError, QualifiedNameKey, Result, SchemaObject, display_qualified_name,
};
use tracing::debug;

use grammar::attach_table_constraint;

pub use grammar::{AlterTableAction, ParsedStatement, Parser, TableConstraint};
pub use keywords::Keyword;
pub use lexer::{Lexer, ParserMode};
pub use token::{Token, TokenKind};

/// Cut a DDL text into statement candidates at top-level semicolons.
#[must_use]
pub fn split_statements(sql: &str, mode: ParserMode) -> Vec<String> {
    splitter::split_candidates(sql, mode)
}

/// Parse exactly one statement; `None` for comment-only/empty input.
pub fn parse_single_statement(sql: &str, mode: ParserMode) -> Result<Option<ParsedStatement>> {
    let mut parser = Parser::new(sql, mode);
    Ok(parser.parse_statement()?)
}

/// Parse a multi-statement DDL text into schema objects. `ALTER TABLE …
/// ADD` statements are folded into the tables they target.
pub fn parse_schema(sql: &str, mode: ParserMode) -> Result<Vec<SchemaObject>> {
    let statements = parse_statements(sql, mode)?;
    assemble_schema(statements)
}

/// Parse a bare expression (defaults, index predicates).
pub fn parse_expression(text: &str, mode: ParserMode) -> Result<Expr> {
    let mut parser = Parser::new(text, mode);
    let expr = parser.parse_expr()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse the body of a check constraint as returned by a catalog: the
/// leading `CHECK` keyword and its outer parentheses are stripped before
/// the remainder is parsed as an expression.
pub fn parse_check_body(text: &str, mode: ParserMode) -> Result<Expr> {
    let trimmed = text.trim();
    let without_keyword = trimmed
        .strip_prefix("CHECK")
        .or_else(|| trimmed.strip_prefix("check"))
        .unwrap_or(trimmed)
        .trim();

    parse_expression(without_keyword, mode)
}

/// The multi-statement loop: split into candidates at top-level
/// semicolons, then commit each candidate as soon as it parses cleanly;
/// a candidate that fails is extended across the next semicolon and
/// retried, which is what survives `;` inside routine bodies. Exhausting
/// the input bubbles up the last parse error.
fn parse_statements(sql: &str, mode: ParserMode) -> Result<Vec<ParsedStatement>> {
    let segments = splitter::split_candidates(sql, mode);
    let mut parsed = Vec::new();
    let mut index = 0usize;

    while index < segments.len() {
        let mut buffer = segments[index].clone();
        let mut end = index;

        loop {
            let mut parser = Parser::new(&buffer, mode);
            match parser.parse_statement() {
                Ok(Some(statement)) => {
                    parsed.push(statement);
                    break;
                }
                Ok(None) => break,
                Err(error) => {
                    if end + 1 >= segments.len() {
                        return Err(error.into());
                    }
                    end += 1;
                    debug!(extended_to = end, "statement candidate failed, extending");
                    buffer.push(';');
                    buffer.push_str(&segments[end]);
                }
            }
        }

        index = end + 1;
    }

    Ok(parsed)
}

/// Fold parsed statements into a schema: `ALTER TABLE` actions are merged
/// into the tables they target, everything else passes through in input
/// order.
pub fn assemble_schema(statements: Vec<ParsedStatement>) -> Result<Vec<SchemaObject>> {
    let mut objects: Vec<SchemaObject> = Vec::new();
    let mut table_positions: BTreeMap<QualifiedNameKey, usize> = BTreeMap::new();

    for (statement_index, statement) in statements.into_iter().enumerate() {
        match statement {
            ParsedStatement::Object(object) => {
                if let SchemaObject::Table(table) = &object {
                    table_positions.insert(table.name.key(), objects.len());
                }
                objects.push(object);
            }
            ParsedStatement::AlterTable { table, action } => {
                let position = find_table(&table_positions, &table).ok_or_else(|| {
                    ParseError::StatementConversion {
                        statement_index,
                        source_sql: format!("ALTER TABLE {}", display_qualified_name(&table)),
                        source: Box::new(io::Error::other(
                            "ALTER TABLE references a table not defined in this schema",
                        )),
                    }
                })?;

                let Some(SchemaObject::Table(target)) = objects.get_mut(position) else {
                    continue;
                };
                match action {
                    AlterTableAction::AddColumn(column) => target.columns.push(column),
                    AlterTableAction::AddConstraint(constraint) => {
                        attach_table_constraint(target, constraint);
                    }
                }
            }
        }
    }

    Ok(objects)
}

/// Exact key match first; otherwise an unqualified reference resolves
/// against a uniquely-named table.
fn find_table(
    table_positions: &BTreeMap<QualifiedNameKey, usize>,
    table: &declsql_core::QualifiedName,
) -> Option<usize> {
    if let Some(position) = table_positions.get(&table.key()) {
        return Some(*position);
    }

    let name_key = table.name.key();
    let mut matches = table_positions
        .iter()
        .filter(|(key, _)| key.name == name_key)
        .map(|(_, position)| *position);

    let first = matches.next();
    if matches.next().is_some() {
        return None;
    }
    first
}
