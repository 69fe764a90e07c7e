use declsql_core::{
    ConnectionConfig, DatabaseAdapter, Dialect, DiffOp, ExportConfig, Ident, Result, SchemaObject,
    Statement,
};

mod adapter;
mod export_queries;
mod generator;
mod normalize;
mod parser;
mod to_sql;

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

const DIALECT_NAME: &str = "postgres";

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        DIALECT_NAME
    }

    fn parse(&self, sql: &str) -> Result<Vec<SchemaObject>> {
        parser::parse_schema(sql)
    }

    fn generate_ddl(&self, ops: &[DiffOp]) -> Result<Vec<Statement>> {
        generator::generate_ddl(self.name(), ops)
    }

    fn to_sql(&self, obj: &SchemaObject) -> Result<String> {
        to_sql::render_object(obj)
    }

    fn quote_ident(&self, ident: &Ident) -> String {
        format!("\"{}\"", ident.value.replace('"', "\"\""))
    }

    fn connect(
        &self,
        config: &ConnectionConfig,
        export: &ExportConfig,
    ) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(config, export)
    }
}
