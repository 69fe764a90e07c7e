use std::fmt;

use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Parse-time failure with enough position data to render a caret pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    /// Full excerpt of the offending source line.
    pub snippet: String,
    /// Column the caret points at within `snippet` (1-based).
    pub caret_col: usize,
    pub near_token: String,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "syntax error at line {}, column {}: {} (near `{}`)",
            self.line, self.column, self.message, self.near_token
        )?;
        writeln!(f, "  {}", self.snippet)?;
        write!(f, "  {}^", " ".repeat(self.caret_col.saturating_sub(1)))
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("statement[{statement_index}] could not be converted: {source_sql}")]
    StatementConversion {
        statement_index: usize,
        source_sql: String,
        #[source]
        source: BoxedError,
    },
}

#[derive(Debug, Error)]
#[error("catalog query for {entity_kind} `{entity_name}` failed")]
pub struct CatalogError {
    pub entity_kind: &'static str,
    pub entity_name: String,
    #[source]
    pub source: BoxedError,
}

impl CatalogError {
    pub fn new<E>(entity_kind: &'static str, entity_name: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            entity_kind,
            entity_name: entity_name.into(),
            source: Box::new(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cannot plan change for `{target}`: {operation}")]
    Incompatible { target: String, operation: String },
    #[error("dialect `{dialect}` cannot render `{op}` for `{target}`")]
    UnsupportedOp {
        op: &'static str,
        target: String,
        dialect: String,
    },
}

#[derive(Debug, Error)]
#[error("apply statement[{statement_index}] failed after {executed_statements} successes: {sql}")]
pub struct ApplyError {
    pub statement_index: usize,
    pub sql: String,
    pub executed_statements: usize,
    #[source]
    pub source: BoxedError,
}

impl ApplyError {
    pub fn new<E>(statement_index: usize, sql: impl Into<String>, executed_statements: usize, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            statement_index,
            sql: sql.into(),
            executed_statements,
            source: Box::new(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("apply error: {0}")]
    Apply(#[from] ApplyError),
}

impl From<SyntaxError> for Error {
    fn from(value: SyntaxError) -> Self {
        Self::Parse(ParseError::Syntax(value))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
