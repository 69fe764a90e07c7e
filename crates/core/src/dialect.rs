use crate::{
    ConnectionConfig, DatabaseAdapter, DiffOp, ExportConfig, Ident, Result, SchemaObject, Statement,
};

/// Dialect contract for parsing, DDL generation, and connection lifecycle.
///
/// `parse` returns *normalized* objects: the diff engine compares whatever
/// a dialect hands it structurally, so semantically equal spellings must
/// already be folded to one canonical form. Unsupported parse or generate
/// scenarios are errors, never silently skipped.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &str;

    /// Parse a multi-statement DDL text into normalized schema objects.
    fn parse(&self, sql: &str) -> Result<Vec<SchemaObject>>;

    /// Render a full diff-op batch into executable statements.
    fn generate_ddl(&self, ops: &[DiffOp]) -> Result<Vec<Statement>>;

    /// Render one schema object back to DDL text (export mode).
    fn to_sql(&self, obj: &SchemaObject) -> Result<String>;

    fn quote_ident(&self, ident: &Ident) -> String;

    fn connect(
        &self,
        config: &ConnectionConfig,
        export: &ExportConfig,
    ) -> Result<Box<dyn DatabaseAdapter>>;
}
