//! DiffOp batch → executable statements. Rendering is deterministic:
//! identifiers always double-quoted, list clauses in input order, map
//! contents in sorted order.

use std::fmt::Write;

use declsql_core::{
    CheckConstraint, Column, ColumnChange, Comment, CommentTarget, DiffOp, EnumValuePosition,
    ExclusionConstraint, ForeignKey, Ident, IndexDef, PlanError, PrimaryKey, Privilege,
    QualifiedName, Result, Statement, TypeChange, UniqueConstraint, diff_op_tag,
};

use crate::to_sql::{
    quote_string, render_check_clause, render_column_definition, render_create_policy,
    render_create_table_inline, render_data_type, render_expr, render_foreign_key_clause,
    render_ident, render_ident_list, render_primary_key_clause, render_privilege_object,
    render_privilege_ops, render_qualified_name, render_unique_clause,
};

pub(crate) fn generate_ddl(dialect_name: &str, ops: &[DiffOp]) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    for op in ops {
        emit_op(dialect_name, op, &mut statements)?;
    }
    Ok(statements)
}

fn emit_op(dialect_name: &str, op: &DiffOp, out: &mut Vec<Statement>) -> Result<()> {
    match op {
        DiffOp::CreateTable(table) => {
            out.push(Statement::transactional(render_create_table_inline(table)));
        }
        DiffOp::DropTable(name) => {
            out.push(Statement::transactional(format!(
                "DROP TABLE {}",
                render_qualified_name(name)
            )));
        }
        DiffOp::AddColumn { table, column } => {
            out.push(Statement::transactional(render_add_column(table, column)));
        }
        DiffOp::DropColumn { table, column } => {
            out.push(Statement::transactional(format!(
                "ALTER TABLE {} DROP COLUMN {}",
                render_qualified_name(table),
                render_ident(column)
            )));
        }
        DiffOp::AlterColumn {
            table,
            column,
            changes,
        } => {
            for change in changes {
                out.push(Statement::transactional(render_alter_column_change(
                    table, column, change,
                )));
            }
        }
        DiffOp::SetPrimaryKey { table, pk } => {
            out.push(Statement::transactional(render_set_primary_key(table, pk)));
        }
        DiffOp::DropPrimaryKey { table, name } => {
            out.push(Statement::transactional(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                render_qualified_name(table),
                render_ident(name)
            )));
        }
        DiffOp::AddIndex(index) => {
            let sql = render_add_index(dialect_name, op, index)?;
            out.push(if index.concurrent {
                Statement::non_transactional(sql)
            } else {
                Statement::transactional(sql)
            });
        }
        DiffOp::DropIndex { table, name } => {
            let qualified = QualifiedName {
                schema: table.schema.clone(),
                name: name.clone(),
            };
            out.push(Statement::transactional(format!(
                "DROP INDEX {}",
                render_qualified_name(&qualified)
            )));
        }
        DiffOp::AddForeignKey { table, fk } => {
            out.push(Statement::transactional(render_add_foreign_key(table, fk)));
        }
        DiffOp::DropForeignKey { table, name } => {
            out.push(Statement::transactional(render_drop_constraint(table, name)));
        }
        DiffOp::AddCheck { table, check } => {
            out.push(Statement::transactional(render_add_check(table, check)));
        }
        DiffOp::DropCheck { table, name } => {
            out.push(Statement::transactional(render_drop_constraint(table, name)));
        }
        DiffOp::AddUnique { table, unique } => {
            out.push(Statement::transactional(render_add_unique(table, unique)));
        }
        DiffOp::DropUnique { table, name } => {
            out.push(Statement::transactional(render_drop_constraint(table, name)));
        }
        DiffOp::AddExclusion { table, exclusion } => {
            out.push(Statement::transactional(render_add_exclusion(
                table, exclusion,
            )));
        }
        DiffOp::DropExclusion { table, name } => {
            out.push(Statement::transactional(render_drop_constraint(table, name)));
        }
        DiffOp::CreateView(view) => {
            if view.query.trim().is_empty() {
                return Err(unsupported_diff_op(
                    dialect_name,
                    op,
                    "view query must not be empty",
                ));
            }
            let mut sql = format!("CREATE VIEW {}", render_qualified_name(&view.name));
            if !view.columns.is_empty() {
                write!(sql, " ({})", render_ident_list(&view.columns))
                    .expect("writing to String should not fail");
            }
            write!(sql, " AS {}", view.query).expect("writing to String should not fail");
            out.push(Statement::transactional(sql));
        }
        DiffOp::DropView(name) => {
            out.push(Statement::transactional(format!(
                "DROP VIEW {}",
                render_qualified_name(name)
            )));
        }
        DiffOp::CreateMaterializedView(view) => {
            let mut sql = format!(
                "CREATE MATERIALIZED VIEW {} AS {}",
                render_qualified_name(&view.name),
                view.query
            );
            if !view.with_data {
                sql.push_str(" WITH NO DATA");
            }
            out.push(Statement::transactional(sql));
        }
        DiffOp::DropMaterializedView(name) => {
            out.push(Statement::transactional(format!(
                "DROP MATERIALIZED VIEW {}",
                render_qualified_name(name)
            )));
        }
        DiffOp::CreateType(ty) => {
            let labels = ty
                .labels
                .iter()
                .map(|label| quote_string(label))
                .collect::<Vec<_>>()
                .join(", ");
            out.push(Statement::transactional(format!(
                "CREATE TYPE {} AS ENUM ({labels})",
                render_qualified_name(&ty.name)
            )));
        }
        DiffOp::DropType(name) => {
            out.push(Statement::transactional(format!(
                "DROP TYPE {}",
                render_qualified_name(name)
            )));
        }
        DiffOp::AlterType { name, change } => {
            out.push(render_alter_type(name, change));
        }
        DiffOp::CreateExtension(extension) => {
            let mut sql = format!(
                "CREATE EXTENSION {}",
                render_ident(&extension.name)
            );
            let mut clauses = Vec::new();
            if let Some(schema) = &extension.schema {
                clauses.push(format!("SCHEMA {}", render_ident(schema)));
            }
            if let Some(version) = &extension.version {
                clauses.push(format!("VERSION {}", quote_string(version)));
            }
            if !clauses.is_empty() {
                write!(sql, " WITH {}", clauses.join(" "))
                    .expect("writing to String should not fail");
            }
            out.push(Statement::transactional(sql));
        }
        DiffOp::DropExtension(name) => {
            out.push(Statement::transactional(format!(
                "DROP EXTENSION {}",
                render_ident(name)
            )));
        }
        DiffOp::CreateSchema(schema) => {
            out.push(Statement::transactional(format!(
                "CREATE SCHEMA {}",
                render_ident(&schema.name)
            )));
        }
        DiffOp::DropSchema(name) => {
            out.push(Statement::transactional(format!(
                "DROP SCHEMA {}",
                render_ident(name)
            )));
        }
        DiffOp::SetComment(comment) => {
            out.push(Statement::transactional(render_set_comment(comment)));
        }
        DiffOp::DropComment { target } => {
            out.push(Statement::transactional(format!(
                "COMMENT ON {} IS NULL",
                render_comment_target(target)
            )));
        }
        DiffOp::Grant(privilege) => {
            out.push(Statement::transactional(render_grant(
                dialect_name,
                op,
                privilege,
            )?));
        }
        DiffOp::Revoke(privilege) => {
            out.push(Statement::transactional(render_revoke(
                dialect_name,
                op,
                privilege,
            )?));
        }
        DiffOp::CreatePolicy(policy) => {
            out.push(Statement::transactional(render_create_policy(policy)));
        }
        DiffOp::DropPolicy { name, table } => {
            out.push(Statement::transactional(format!(
                "DROP POLICY {} ON {}",
                render_ident(name),
                render_qualified_name(table)
            )));
        }
    }

    Ok(())
}

fn render_add_column(table: &QualifiedName, column: &Column) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {}",
        render_qualified_name(table),
        render_column_definition(column)
    )
}

fn render_alter_column_change(
    table: &QualifiedName,
    column: &Ident,
    change: &ColumnChange,
) -> String {
    let prefix = format!(
        "ALTER TABLE {} ALTER COLUMN {}",
        render_qualified_name(table),
        render_ident(column)
    );

    match change {
        ColumnChange::SetType(data_type) => {
            format!("{prefix} TYPE {}", render_data_type(data_type))
        }
        ColumnChange::SetNotNull(true) => format!("{prefix} SET NOT NULL"),
        ColumnChange::SetNotNull(false) => format!("{prefix} DROP NOT NULL"),
        ColumnChange::SetDefault(default_expr) => default_expr
            .as_ref()
            .map(|expr| format!("{prefix} SET DEFAULT {}", render_expr(expr)))
            .unwrap_or_else(|| format!("{prefix} DROP DEFAULT")),
    }
}

fn render_set_primary_key(table: &QualifiedName, pk: &PrimaryKey) -> String {
    format!(
        "ALTER TABLE {} ADD {}",
        render_qualified_name(table),
        render_primary_key_clause(pk)
    )
}

fn render_drop_constraint(table: &QualifiedName, name: &Ident) -> String {
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {}",
        render_qualified_name(table),
        render_ident(name)
    )
}

fn render_add_foreign_key(table: &QualifiedName, fk: &ForeignKey) -> String {
    format!(
        "ALTER TABLE {} ADD {}",
        render_qualified_name(table),
        render_foreign_key_clause(fk)
    )
}

fn render_add_check(table: &QualifiedName, check: &CheckConstraint) -> String {
    format!(
        "ALTER TABLE {} ADD {}",
        render_qualified_name(table),
        render_check_clause(check)
    )
}

fn render_add_unique(table: &QualifiedName, unique: &UniqueConstraint) -> String {
    format!(
        "ALTER TABLE {} ADD {}",
        render_qualified_name(table),
        render_unique_clause(unique)
    )
}

fn render_add_exclusion(table: &QualifiedName, exclusion: &ExclusionConstraint) -> String {
    format!(
        "ALTER TABLE {} ADD {}",
        render_qualified_name(table),
        crate::to_sql::render_exclusion_clause(exclusion)
    )
}

fn render_add_index(dialect_name: &str, op: &DiffOp, index: &IndexDef) -> Result<String> {
    let name = index
        .name
        .as_ref()
        .ok_or_else(|| unsupported_diff_op(dialect_name, op, "index name is required"))?;

    let columns = index
        .columns
        .iter()
        .map(crate::to_sql::render_index_column)
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "CREATE {}INDEX {}{} ON {}{} ({columns})",
        if index.unique { "UNIQUE " } else { "" },
        if index.concurrent {
            "CONCURRENTLY "
        } else {
            ""
        },
        render_ident(name),
        render_qualified_name(&index.table),
        index
            .method
            .as_ref()
            .map(|method| format!(" USING {method}"))
            .unwrap_or_default(),
    );

    if !index.include.is_empty() {
        write!(sql, " INCLUDE ({})", render_ident_list(&index.include))
            .expect("writing to String should not fail");
    }
    if let Some(where_clause) = &index.where_clause {
        write!(sql, " WHERE {}", render_expr(where_clause))
            .expect("writing to String should not fail");
    }

    Ok(sql)
}

fn render_alter_type(name: &QualifiedName, change: &TypeChange) -> Statement {
    match change {
        TypeChange::AddValue { value, position } => {
            let mut sql = format!(
                "ALTER TYPE {} ADD VALUE {}",
                render_qualified_name(name),
                quote_string(value)
            );
            match position {
                Some(EnumValuePosition::Before(existing)) => {
                    sql.push_str(&format!(" BEFORE {}", quote_string(existing)));
                }
                Some(EnumValuePosition::After(existing)) => {
                    sql.push_str(&format!(" AFTER {}", quote_string(existing)));
                }
                None => {}
            }
            // `ALTER TYPE … ADD VALUE` cannot run inside a transaction
            // block on older servers; play it safe.
            Statement::non_transactional(sql)
        }
    }
}

fn render_set_comment(comment: &Comment) -> String {
    format!(
        "COMMENT ON {} IS {}",
        render_comment_target(&comment.target),
        comment
            .text
            .as_ref()
            .map(|text| quote_string(text))
            .unwrap_or_else(|| "NULL".to_string())
    )
}

fn render_comment_target(target: &CommentTarget) -> String {
    match target {
        CommentTarget::Table(name) => format!("TABLE {}", render_qualified_name(name)),
        CommentTarget::Column { table, column } => format!(
            "COLUMN {}.{}",
            render_qualified_name(table),
            render_ident(column)
        ),
        CommentTarget::Index(name) => format!("INDEX {}", render_qualified_name(name)),
        CommentTarget::View(name) => format!("VIEW {}", render_qualified_name(name)),
        CommentTarget::MaterializedView(name) => {
            format!("MATERIALIZED VIEW {}", render_qualified_name(name))
        }
        CommentTarget::Type(name) => format!("TYPE {}", render_qualified_name(name)),
        CommentTarget::Extension(name) => format!("EXTENSION {}", render_ident(name)),
        CommentTarget::Schema(name) => format!("SCHEMA {}", render_ident(name)),
    }
}

fn render_grant(dialect_name: &str, op: &DiffOp, privilege: &Privilege) -> Result<String> {
    let operations = render_privilege_ops(&privilege.operations).ok_or_else(|| {
        unsupported_diff_op(dialect_name, op, "privilege operation list must not be empty")
    })?;

    Ok(format!(
        "GRANT {} ON {} TO {}{}",
        operations,
        render_privilege_object(&privilege.on),
        render_ident(&privilege.grantee),
        if privilege.with_grant_option {
            " WITH GRANT OPTION"
        } else {
            ""
        }
    ))
}

fn render_revoke(dialect_name: &str, op: &DiffOp, privilege: &Privilege) -> Result<String> {
    let operations = render_privilege_ops(&privilege.operations).ok_or_else(|| {
        unsupported_diff_op(dialect_name, op, "privilege operation list must not be empty")
    })?;

    Ok(format!(
        "REVOKE {} ON {} FROM {}",
        operations,
        render_privilege_object(&privilege.on),
        render_ident(&privilege.grantee)
    ))
}

fn unsupported_diff_op(
    dialect_name: &str,
    op: &DiffOp,
    target: impl Into<String>,
) -> declsql_core::Error {
    PlanError::UnsupportedOp {
        op: diff_op_tag(op),
        target: target.into(),
        dialect: dialect_name.to_string(),
    }
    .into()
}
