//! The postgres parse pipeline. `pg_query` (the server's own grammar) is
//! the primary path; statements its converter refuses fall back to the
//! in-house grammar. Both paths produce the same IR for the statements
//! both recognize, which the fixture suite enforces.

use std::io;

use declsql_parser::{ParsedStatement, ParserMode, assemble_schema, split_statements};
use pg_query::protobuf::{ConstrType, node::Node as NodeEnum};
use declsql_core::{
    Column, DataType, Expr, Ident, Identity, QualifiedName, Result, SchemaObject, Table,
};
use tracing::debug;

use crate::normalize;

const MODE: ParserMode = ParserMode::Postgres;

/// Outcome of the primary path for one statement.
#[derive(Debug)]
enum Primary {
    Converted(ParsedStatement),
    /// The primary parser accepted the statement but the converter does
    /// not model it; the in-house grammar owns it.
    Refused,
}

type ConversionResult<T> = std::result::Result<T, io::Error>;

pub(crate) fn parse_schema(sql: &str) -> Result<Vec<SchemaObject>> {
    let segments = split_statements(sql, MODE);
    let mut statements = Vec::new();
    let mut index = 0usize;

    while index < segments.len() {
        let mut buffer = segments[index].clone();
        let mut end = index;

        loop {
            match parse_one(&buffer) {
                Ok(Some(statement)) => {
                    statements.push(statement);
                    break;
                }
                Ok(None) => break,
                Err(error) => {
                    // A `;` inside a quoted body split the statement in
                    // half; extend the candidate and retry.
                    if end + 1 >= segments.len() {
                        return Err(error);
                    }
                    end += 1;
                    buffer.push(';');
                    buffer.push_str(&segments[end]);
                }
            }
        }

        index = end + 1;
    }

    let mut objects = assemble_schema(statements)?;
    normalize::normalize_schema(&mut objects);
    Ok(objects)
}

fn parse_one(sql: &str) -> Result<Option<ParsedStatement>> {
    if sql.trim().is_empty() {
        return Ok(None);
    }

    match primary_parse(sql) {
        Ok(Primary::Converted(statement)) => return Ok(Some(statement)),
        Ok(Primary::Refused) => {}
        Err(reason) => {
            debug!(%reason, "primary parser rejected statement, trying in-house grammar");
        }
    }

    declsql_parser::parse_single_statement(sql, MODE)
}

/// Run the statement through `pg_query` and convert the result when the
/// converter supports the node kind.
fn primary_parse(sql: &str) -> std::result::Result<Primary, String> {
    let parsed = pg_query::parse(sql).map_err(|error| error.to_string())?;

    let mut nodes = parsed
        .protobuf
        .stmts
        .iter()
        .filter_map(|raw| raw.stmt.as_ref().and_then(|stmt| stmt.node.as_ref()));
    let Some(node) = nodes.next() else {
        return Ok(Primary::Refused);
    };
    if nodes.next().is_some() {
        // One candidate should hold one statement here; anything else
        // means the splitter and pg_query disagree, so stay conservative.
        return Ok(Primary::Refused);
    }

    match node {
        NodeEnum::CreateStmt(create_stmt) => match convert_create_table(create_stmt) {
            Ok(table) => Ok(Primary::Converted(ParsedStatement::Object(
                SchemaObject::Table(table),
            ))),
            Err(reason) => {
                debug!(%reason, "primary CREATE TABLE conversion refused");
                Ok(Primary::Refused)
            }
        },
        _ => Ok(Primary::Refused),
    }
}

/// Plain `CREATE TABLE` conversion: columns with types, defaults, NOT
/// NULL, and identity. Table-level constraints, partitioning, inheritance
/// and storage clauses are refused to the fallback grammar.
fn convert_create_table(
    create_stmt: &pg_query::protobuf::CreateStmt,
) -> ConversionResult<Table> {
    let relation = create_stmt
        .relation
        .as_ref()
        .ok_or_else(|| conversion_error("CREATE TABLE is missing relation"))?;

    if create_stmt.partspec.is_some()
        || create_stmt.partbound.is_some()
        || !create_stmt.inh_relations.is_empty()
        || !create_stmt.access_method.is_empty()
        || !create_stmt.tablespacename.is_empty()
        || create_stmt.if_not_exists
    {
        return Err(conversion_error("table-level clause outside converter scope"));
    }

    let mut table = Table::named(relation.relname.as_str());
    table.name = QualifiedName {
        schema: (!relation.schemaname.is_empty()).then(|| pg_ident(&relation.schemaname)),
        name: pg_ident(&relation.relname),
    };

    for table_element in &create_stmt.table_elts {
        let element = table_element
            .node
            .as_ref()
            .ok_or_else(|| conversion_error("CREATE TABLE element is missing node payload"))?;

        match element {
            NodeEnum::ColumnDef(column_def) => {
                table.columns.push(convert_column(column_def)?);
            }
            _ => {
                return Err(conversion_error(
                    "table constraints are outside converter scope",
                ));
            }
        }
    }

    Ok(table)
}

fn convert_column(column_def: &pg_query::protobuf::ColumnDef) -> ConversionResult<Column> {
    let type_name = column_def.type_name.as_ref().ok_or_else(|| {
        conversion_error(format!(
            "column {} is missing type information",
            column_def.colname
        ))
    })?;

    let mut column = Column::new(pg_ident(&column_def.colname), convert_data_type(type_name)?);
    column.not_null = column_def.is_not_null;

    if let Some(raw_default) = &column_def.raw_default {
        column.default = Some(convert_expr(raw_default, &column_def.colname)?);
    }

    for constraint_node in &column_def.constraints {
        let Some(NodeEnum::Constraint(constraint)) = constraint_node.node.as_ref() else {
            continue;
        };
        let Ok(constraint_type) = ConstrType::try_from(constraint.contype) else {
            return Err(conversion_error("unknown column constraint type"));
        };

        match constraint_type {
            ConstrType::ConstrNotnull => column.not_null = true,
            ConstrType::ConstrNull => column.not_null = false,
            ConstrType::ConstrDefault => {
                if let Some(raw_expr) = &constraint.raw_expr {
                    column.default = Some(convert_expr(raw_expr, &column_def.colname)?);
                }
            }
            ConstrType::ConstrIdentity => {
                column.identity = Some(identity_from_generated_when(
                    constraint.generated_when.as_str(),
                ));
                column.not_null = true;
            }
            _ => {
                // Inline PRIMARY KEY / UNIQUE / CHECK / REFERENCES lift
                // constraints to table level; the fallback grammar owns
                // that shape.
                return Err(conversion_error(
                    "inline column constraint outside converter scope",
                ));
            }
        }
    }

    Ok(column)
}

fn convert_expr(node: &pg_query::protobuf::Node, column: &str) -> ConversionResult<Expr> {
    let text = node.deparse().map_err(|source| {
        conversion_error(format!(
            "column {column} default expression deparse failed: {source}"
        ))
    })?;

    declsql_parser::parse_expression(&text, MODE)
        .map_err(|source| conversion_error(format!("column {column} default: {source}")))
}

fn identity_from_generated_when(generated_when: &str) -> Identity {
    let normalized = generated_when.trim().to_ascii_lowercase();
    Identity {
        always: matches!(normalized.as_str(), "a" | "always"),
    }
}

fn convert_data_type(type_name: &pg_query::protobuf::TypeName) -> ConversionResult<DataType> {
    let names = type_name_parts(type_name);
    if names.is_empty() {
        return Err(conversion_error("type name has no identifiers"));
    }

    let typmods = typmod_values(type_name);
    let base = names
        .last()
        .map(String::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();

    let mut data_type = match base.as_str() {
        "bool" | "boolean" => DataType::Boolean,
        "int2" | "smallint" => DataType::SmallInt,
        "int" | "int4" | "integer" => DataType::Integer,
        "int8" | "bigint" => DataType::BigInt,
        "float4" | "real" => DataType::Real,
        "float8" | "double precision" => DataType::DoublePrecision,
        "numeric" | "decimal" => DataType::Numeric {
            precision: typmods.first().copied(),
            scale: typmods.get(1).copied(),
        },
        "text" => DataType::Text,
        "varchar" | "character varying" => DataType::Varchar {
            length: typmods.first().copied(),
        },
        "bpchar" | "char" | "character" => DataType::Char {
            length: typmods.first().copied(),
        },
        "bytea" => DataType::Blob,
        "date" => DataType::Date,
        "time" => DataType::Time {
            precision: typmods.first().copied(),
            with_timezone: false,
        },
        "timetz" => DataType::Time {
            precision: typmods.first().copied(),
            with_timezone: true,
        },
        "timestamp" => DataType::Timestamp {
            precision: typmods.first().copied(),
            with_timezone: false,
        },
        "timestamptz" => DataType::Timestamp {
            precision: typmods.first().copied(),
            with_timezone: true,
        },
        "interval" => DataType::Interval,
        "json" => DataType::Json,
        "jsonb" => DataType::Jsonb,
        "uuid" => DataType::Uuid,
        _ => DataType::Custom(join_custom_name(&names)),
    };

    for _ in &type_name.array_bounds {
        data_type = DataType::Array(Box::new(data_type));
    }

    Ok(data_type)
}

fn typmod_values(type_name: &pg_query::protobuf::TypeName) -> Vec<u32> {
    type_name
        .typmods
        .iter()
        .filter_map(|node| match node.node.as_ref() {
            Some(NodeEnum::AConst(constant)) => match constant.val.as_ref() {
                Some(pg_query::protobuf::a_const::Val::Ival(value)) => {
                    u32::try_from(value.ival).ok()
                }
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn type_name_parts(type_name: &pg_query::protobuf::TypeName) -> Vec<String> {
    type_name
        .names
        .iter()
        .filter_map(|node| match node.node.as_ref() {
            Some(NodeEnum::String(value)) => Some(value.sval.clone()),
            _ => None,
        })
        .filter(|part| part != "pg_catalog")
        .collect()
}

fn join_custom_name(names: &[String]) -> String {
    names.join(".")
}

/// `pg_query` hands back already-folded names; anything that still has
/// uppercase must have been quoted in the source.
fn pg_ident(value: &str) -> Ident {
    if value == value.to_ascii_lowercase() {
        Ident::unquoted(value)
    } else {
        Ident::quoted(value)
    }
}

fn conversion_error(message: impl Into<String>) -> io::Error {
    io::Error::other(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Statements both paths recognize must convert to the same IR.
    #[test]
    fn primary_and_fallback_agree_on_plain_create_table() {
        let fixtures = [
            "CREATE TABLE users (id bigint NOT NULL, email varchar(255))",
            "CREATE TABLE t (v integer DEFAULT 0, note text DEFAULT 'x')",
            "CREATE TABLE n (amount numeric(12,2), ratio real)",
            "CREATE TABLE ts (at timestamp(3), tz timestamptz, d date)",
            "CREATE TABLE arr (tags text[], matrix integer[][])",
            "CREATE TABLE idn (id bigint GENERATED ALWAYS AS IDENTITY)",
        ];

        for sql in fixtures {
            let primary = match primary_parse(sql) {
                Ok(Primary::Converted(statement)) => statement,
                other => panic!("primary path should convert `{sql}`: {other:?}"),
            };
            let fallback = declsql_parser::parse_single_statement(sql, MODE)
                .expect("fallback should parse")
                .expect("fallback should yield a statement");

            assert_eq!(primary, fallback, "paths disagree on `{sql}`");
        }
    }

    #[test]
    fn primary_path_refuses_table_constraints_to_the_fallback() {
        let sql = "CREATE TABLE t (id integer, CONSTRAINT t_pkey PRIMARY KEY (id))";
        assert!(matches!(primary_parse(sql), Ok(Primary::Refused)));

        let objects = parse_schema(&format!("{sql};")).expect("fallback should parse");
        let SchemaObject::Table(table) = &objects[0] else {
            panic!("expected table");
        };
        assert!(table.primary_key.is_some());
    }

    #[test]
    fn primary_path_rejects_garbage_and_fallback_reports_position() {
        let error = parse_schema("CREATE ELEPHANT t ();").expect_err("nonsense should fail");
        assert!(matches!(error, declsql_core::Error::Parse(_)));
    }

    #[test]
    fn quoted_mixed_case_names_survive_the_primary_path() {
        let primary = match primary_parse("CREATE TABLE \"Users\" (\"Id\" integer)") {
            Ok(Primary::Converted(ParsedStatement::Object(SchemaObject::Table(table)))) => table,
            other => panic!("expected converted table, got {other:?}"),
        };
        assert_eq!(primary.name.name, Ident::quoted("Users"));
        assert_eq!(primary.columns[0].name, Ident::quoted("Id"));
    }
}
