//! Rendering the IR back to PostgreSQL text. Everything here is
//! deterministic: identifiers always quoted, options in sorted order, and
//! the export format puts one column per line with four-space indent.

use std::fmt::Write;

use declsql_core::{
    BinaryOperator, CheckConstraint, Column, ComparisonOp, DataType, Deferrable,
    ExclusionConstraint, Expr, ForeignKey, ForeignKeyAction, Ident, IndexColumn, IsTest, Literal,
    NullsOrder, Policy, PolicyCommand, PrimaryKey, PrivilegeObject, PrivilegeOp, QualifiedName,
    Result, SchemaObject, SetQuantifier, SortOrder, Table, UnaryOperator, UniqueConstraint,
};

/// Export rendering: one object, one terminated statement (plus trailing
/// grants for privileges).
pub(crate) fn render_object(obj: &SchemaObject) -> Result<String> {
    let sql = match obj {
        SchemaObject::Table(table) => render_create_table_pretty(table),
        SchemaObject::View(view) => {
            let mut sql = format!("CREATE VIEW {}", render_qualified_name(&view.name));
            if !view.columns.is_empty() {
                write!(sql, " ({})", render_ident_list(&view.columns))
                    .expect("writing to String should not fail");
            }
            write!(sql, " AS {}", view.query).expect("writing to String should not fail");
            sql
        }
        SchemaObject::MaterializedView(view) => {
            let mut sql = format!(
                "CREATE MATERIALIZED VIEW {} AS {}",
                render_qualified_name(&view.name),
                view.query
            );
            if !view.with_data {
                sql.push_str(" WITH NO DATA");
            }
            sql
        }
        SchemaObject::Index(index) => {
            let mut sql = format!(
                "CREATE {}INDEX ",
                if index.unique { "UNIQUE " } else { "" }
            );
            if let Some(name) = &index.name {
                write!(sql, "{} ", render_ident(name)).expect("writing to String should not fail");
            }
            write!(sql, "ON {}", render_qualified_name(&index.table))
                .expect("writing to String should not fail");
            if let Some(method) = &index.method {
                write!(sql, " USING {method}").expect("writing to String should not fail");
            }
            let columns = index
                .columns
                .iter()
                .map(render_index_column)
                .collect::<Vec<_>>()
                .join(", ");
            write!(sql, " ({columns})").expect("writing to String should not fail");
            if !index.include.is_empty() {
                write!(sql, " INCLUDE ({})", render_ident_list(&index.include))
                    .expect("writing to String should not fail");
            }
            if let Some(where_clause) = &index.where_clause {
                write!(sql, " WHERE {}", render_expr(where_clause))
                    .expect("writing to String should not fail");
            }
            sql
        }
        SchemaObject::Type(ty) => {
            let labels = ty
                .labels
                .iter()
                .map(|label| quote_string(label))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "CREATE TYPE {} AS ENUM ({labels})",
                render_qualified_name(&ty.name)
            )
        }
        SchemaObject::Extension(extension) => {
            let mut sql = format!(
                "CREATE EXTENSION IF NOT EXISTS {}",
                render_ident(&extension.name)
            );
            if let Some(schema) = &extension.schema {
                write!(sql, " WITH SCHEMA {}", render_ident(schema))
                    .expect("writing to String should not fail");
            }
            sql
        }
        SchemaObject::Schema(schema) => {
            format!("CREATE SCHEMA {}", render_ident(&schema.name))
        }
        SchemaObject::Comment(comment) => {
            let target = match &comment.target {
                declsql_core::CommentTarget::Table(name) => {
                    format!("TABLE {}", render_qualified_name(name))
                }
                declsql_core::CommentTarget::Column { table, column } => format!(
                    "COLUMN {}.{}",
                    render_qualified_name(table),
                    render_ident(column)
                ),
                declsql_core::CommentTarget::Index(name) => {
                    format!("INDEX {}", render_qualified_name(name))
                }
                declsql_core::CommentTarget::View(name) => {
                    format!("VIEW {}", render_qualified_name(name))
                }
                declsql_core::CommentTarget::MaterializedView(name) => {
                    format!("MATERIALIZED VIEW {}", render_qualified_name(name))
                }
                declsql_core::CommentTarget::Type(name) => {
                    format!("TYPE {}", render_qualified_name(name))
                }
                declsql_core::CommentTarget::Extension(name) => {
                    format!("EXTENSION {}", render_ident(name))
                }
                declsql_core::CommentTarget::Schema(name) => {
                    format!("SCHEMA {}", render_ident(name))
                }
            };
            format!(
                "COMMENT ON {target} IS {}",
                comment
                    .text
                    .as_ref()
                    .map(|text| quote_string(text))
                    .unwrap_or_else(|| "NULL".to_string())
            )
        }
        SchemaObject::Privilege(privilege) => {
            let operations =
                render_privilege_ops(&privilege.operations).unwrap_or_else(|| "ALL".to_string());
            format!(
                "GRANT {} ON {} TO {}{}",
                operations,
                render_privilege_object(&privilege.on),
                render_ident(&privilege.grantee),
                if privilege.with_grant_option {
                    " WITH GRANT OPTION"
                } else {
                    ""
                }
            )
        }
        SchemaObject::Policy(policy) => render_create_policy(policy),
    };

    Ok(format!("{sql};"))
}

/// The export format: one column or constraint per line, four-space
/// indent.
fn render_create_table_pretty(table: &Table) -> String {
    let elements = table_elements(table);
    if elements.is_empty() {
        return format!("CREATE TABLE {} ()", render_qualified_name(&table.name));
    }

    let body = elements
        .iter()
        .map(|element| format!("    {element}"))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "CREATE TABLE {} (\n{body}\n){}",
        render_qualified_name(&table.name),
        render_table_options(table)
    )
}

/// Compact single-line form used in generated plans.
pub(crate) fn render_create_table_inline(table: &Table) -> String {
    format!(
        "CREATE TABLE {} ({}){}",
        render_qualified_name(&table.name),
        table_elements(table).join(", "),
        render_table_options(table)
    )
}

fn table_elements(table: &Table) -> Vec<String> {
    let mut elements = Vec::new();
    for column in &table.columns {
        elements.push(render_column_definition(column));
    }
    if let Some(pk) = &table.primary_key {
        elements.push(render_primary_key_clause(pk));
    }
    for unique in &table.uniques {
        elements.push(render_unique_clause(unique));
    }
    for foreign_key in &table.foreign_keys {
        elements.push(render_foreign_key_clause(foreign_key));
    }
    for check in &table.checks {
        elements.push(render_check_clause(check));
    }
    for exclusion in &table.exclusions {
        elements.push(render_exclusion_clause(exclusion));
    }
    elements
}

fn render_table_options(table: &Table) -> String {
    let mut suffix = String::new();
    // BTreeMap: options render in sorted key order.
    for (key, value) in &table.options {
        match key.as_str() {
            "partition_by" => {
                write!(suffix, " PARTITION BY {value}").expect("writing to String should not fail");
            }
            "access_method" => {
                write!(suffix, " USING {value}").expect("writing to String should not fail");
            }
            _ => {
                write!(suffix, " /* {key}={value} */").expect("writing to String should not fail");
            }
        }
    }
    suffix
}

pub(crate) fn render_column_definition(column: &Column) -> String {
    let mut sql = format!(
        "{} {}",
        render_ident(&column.name),
        render_data_type(&column.data_type)
    );

    if let Some(collation) = &column.collation {
        write!(sql, " COLLATE {collation}").expect("writing to String should not fail");
    }
    if let Some(identity) = &column.identity {
        write!(
            sql,
            " GENERATED {} AS IDENTITY",
            if identity.always { "ALWAYS" } else { "BY DEFAULT" }
        )
        .expect("writing to String should not fail");
    }
    if let Some(generated) = &column.generated {
        write!(
            sql,
            " GENERATED ALWAYS AS ({}){}",
            render_expr(&generated.expr),
            if generated.stored { " STORED" } else { "" }
        )
        .expect("writing to String should not fail");
    }
    if let Some(default_expr) = &column.default {
        write!(sql, " DEFAULT {}", render_expr(default_expr))
            .expect("writing to String should not fail");
    }
    if column.not_null {
        sql.push_str(" NOT NULL");
    }

    sql
}

pub(crate) fn render_primary_key_clause(pk: &PrimaryKey) -> String {
    let mut sql = String::new();
    if let Some(name) = &pk.name {
        write!(sql, "CONSTRAINT {} ", render_ident(name))
            .expect("writing to String should not fail");
    }
    write!(sql, "PRIMARY KEY ({})", render_ident_list(&pk.columns))
        .expect("writing to String should not fail");
    sql
}

pub(crate) fn render_unique_clause(unique: &UniqueConstraint) -> String {
    let mut sql = String::new();
    if let Some(name) = &unique.name {
        write!(sql, "CONSTRAINT {} ", render_ident(name))
            .expect("writing to String should not fail");
    }
    write!(sql, "UNIQUE ({})", render_ident_list(&unique.columns))
        .expect("writing to String should not fail");
    if let Some(deferrable) = unique.deferrable {
        write!(sql, " {}", render_deferrable(deferrable))
            .expect("writing to String should not fail");
    }
    sql
}

pub(crate) fn render_foreign_key_clause(foreign_key: &ForeignKey) -> String {
    let mut sql = String::new();
    if let Some(name) = &foreign_key.name {
        write!(sql, "CONSTRAINT {} ", render_ident(name))
            .expect("writing to String should not fail");
    }

    write!(
        sql,
        "FOREIGN KEY ({}) REFERENCES {} ({})",
        render_ident_list(&foreign_key.columns),
        render_qualified_name(&foreign_key.referenced_table),
        render_ident_list(&foreign_key.referenced_columns)
    )
    .expect("writing to String should not fail");

    if let Some(on_delete) = foreign_key.on_delete {
        write!(sql, " ON DELETE {}", render_fk_action(on_delete))
            .expect("writing to String should not fail");
    }
    if let Some(on_update) = foreign_key.on_update {
        write!(sql, " ON UPDATE {}", render_fk_action(on_update))
            .expect("writing to String should not fail");
    }
    if let Some(deferrable) = foreign_key.deferrable {
        write!(sql, " {}", render_deferrable(deferrable))
            .expect("writing to String should not fail");
    }

    sql
}

pub(crate) fn render_check_clause(check: &CheckConstraint) -> String {
    let mut sql = String::new();
    if let Some(name) = &check.name {
        write!(sql, "CONSTRAINT {} ", render_ident(name))
            .expect("writing to String should not fail");
    }
    write!(sql, "CHECK ({})", render_expr(&check.expr)).expect("writing to String should not fail");
    if check.no_inherit {
        sql.push_str(" NO INHERIT");
    }
    sql
}

pub(crate) fn render_exclusion_clause(exclusion: &ExclusionConstraint) -> String {
    let mut sql = String::new();
    if let Some(name) = &exclusion.name {
        write!(sql, "CONSTRAINT {} ", render_ident(name))
            .expect("writing to String should not fail");
    }

    let elements = exclusion
        .elements
        .iter()
        .map(|element| format!("{} WITH {}", render_expr(&element.expr), element.operator))
        .collect::<Vec<_>>()
        .join(", ");
    write!(sql, "EXCLUDE USING {} ({elements})", exclusion.index_method)
        .expect("writing to String should not fail");

    if let Some(where_clause) = &exclusion.where_clause {
        write!(sql, " WHERE ({})", render_expr(where_clause))
            .expect("writing to String should not fail");
    }
    if let Some(deferrable) = exclusion.deferrable {
        write!(sql, " {}", render_deferrable(deferrable))
            .expect("writing to String should not fail");
    }

    sql
}

pub(crate) fn render_index_column(column: &IndexColumn) -> String {
    let mut sql = match &column.expr {
        Expr::Ident(ident) => render_ident(ident),
        other => format!("({})", render_expr(other)),
    };

    if let Some(order) = column.order {
        sql.push_str(match order {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        });
    }
    if let Some(nulls) = column.nulls {
        sql.push_str(match nulls {
            NullsOrder::First => " NULLS FIRST",
            NullsOrder::Last => " NULLS LAST",
        });
    }

    sql
}

pub(crate) fn render_create_policy(policy: &Policy) -> String {
    let mut sql = format!(
        "CREATE POLICY {} ON {} AS {}",
        render_ident(&policy.name),
        render_qualified_name(&policy.table),
        if policy.permissive {
            "PERMISSIVE"
        } else {
            "RESTRICTIVE"
        }
    );

    if let Some(command) = policy.command {
        write!(sql, " FOR {}", render_policy_command(command))
            .expect("writing to String should not fail");
    }

    if policy.roles.is_empty() {
        sql.push_str(" TO PUBLIC");
    } else {
        write!(sql, " TO {}", render_ident_list(&policy.roles))
            .expect("writing to String should not fail");
    }

    if let Some(using_expr) = &policy.using_expr {
        write!(sql, " USING ({})", render_expr(using_expr))
            .expect("writing to String should not fail");
    }
    if let Some(check_expr) = &policy.check_expr {
        write!(sql, " WITH CHECK ({})", render_expr(check_expr))
            .expect("writing to String should not fail");
    }

    sql
}

fn render_policy_command(command: PolicyCommand) -> &'static str {
    match command {
        PolicyCommand::All => "ALL",
        PolicyCommand::Select => "SELECT",
        PolicyCommand::Insert => "INSERT",
        PolicyCommand::Update => "UPDATE",
        PolicyCommand::Delete => "DELETE",
    }
}

/// `None` when the list is empty; `ALL` spells out as `ALL PRIVILEGES`.
pub(crate) fn render_privilege_ops(operations: &[PrivilegeOp]) -> Option<String> {
    if operations.is_empty() {
        return None;
    }

    Some(
        operations
            .iter()
            .map(|operation| match operation {
                PrivilegeOp::Select => "SELECT",
                PrivilegeOp::Insert => "INSERT",
                PrivilegeOp::Update => "UPDATE",
                PrivilegeOp::Delete => "DELETE",
                PrivilegeOp::Truncate => "TRUNCATE",
                PrivilegeOp::References => "REFERENCES",
                PrivilegeOp::Trigger => "TRIGGER",
                PrivilegeOp::Usage => "USAGE",
                PrivilegeOp::Create => "CREATE",
                PrivilegeOp::All => "ALL PRIVILEGES",
            })
            .collect::<Vec<_>>()
            .join(", "),
    )
}

pub(crate) fn render_privilege_object(object: &PrivilegeObject) -> String {
    match object {
        PrivilegeObject::Table(name) => format!("TABLE {}", render_qualified_name(name)),
        PrivilegeObject::Schema(name) => format!("SCHEMA {}", render_ident(name)),
    }
}

/// Type keywords render in their uppercase canonical spelling; custom
/// types are identifiers and keep their canonical (folded) name.
pub(crate) fn render_data_type(data_type: &DataType) -> String {
    match data_type {
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::SmallInt => "SMALLINT".to_string(),
        DataType::Integer => "INTEGER".to_string(),
        DataType::BigInt => "BIGINT".to_string(),
        DataType::Real => "REAL".to_string(),
        DataType::DoublePrecision => "DOUBLE PRECISION".to_string(),
        DataType::Numeric { precision, scale } => match (precision, scale) {
            (Some(precision), Some(scale)) => format!("NUMERIC({precision},{scale})"),
            (Some(precision), None) => format!("NUMERIC({precision})"),
            _ => "NUMERIC".to_string(),
        },
        DataType::Text => "TEXT".to_string(),
        DataType::Varchar { length } => length
            .map(|length| format!("VARCHAR({length})"))
            .unwrap_or_else(|| "VARCHAR".to_string()),
        DataType::Char { length } => length
            .map(|length| format!("CHAR({length})"))
            .unwrap_or_else(|| "CHAR".to_string()),
        DataType::Blob => "BYTEA".to_string(),
        DataType::Date => "DATE".to_string(),
        DataType::Time {
            precision,
            with_timezone,
        } => render_time_type("TIME", *precision, *with_timezone),
        DataType::Timestamp {
            precision,
            with_timezone,
        } => render_time_type("TIMESTAMP", *precision, *with_timezone),
        DataType::Interval => "INTERVAL".to_string(),
        DataType::Json => "JSON".to_string(),
        DataType::Jsonb => "JSONB".to_string(),
        DataType::Uuid => "UUID".to_string(),
        DataType::Array(inner) => format!("{}[]", render_data_type(inner)),
        DataType::Custom(custom) => custom.clone(),
    }
}

fn render_time_type(base: &str, precision: Option<u32>, with_timezone: bool) -> String {
    let mut sql = base.to_string();
    if let Some(precision) = precision {
        write!(sql, "({precision})").expect("writing to String should not fail");
    }
    sql.push_str(if with_timezone {
        " WITH TIME ZONE"
    } else {
        " WITHOUT TIME ZONE"
    });
    sql
}

pub(crate) fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(literal) => render_literal(literal),
        Expr::Ident(ident) => render_ident(ident),
        Expr::QualifiedIdent { qualifier, name } => {
            format!("{}.{}", render_ident(qualifier), render_ident(name))
        }
        Expr::Null => "NULL".to_string(),
        Expr::Raw(raw) => raw.clone(),
        Expr::BinaryOp { left, op, right } => format!(
            "{} {} {}",
            render_operand(left),
            render_binary_op(*op),
            render_operand(right)
        ),
        Expr::UnaryOp { op, expr } => format!(
            "{}{}",
            match op {
                UnaryOperator::Plus => "+",
                UnaryOperator::Minus => "-",
            },
            render_operand(expr)
        ),
        Expr::Comparison {
            left,
            op,
            right,
            quantifier,
        } => match quantifier {
            Some(quantifier) => format!(
                "{} {} {}({})",
                render_operand(left),
                render_comparison_op(*op),
                render_set_quantifier(*quantifier),
                render_expr(right)
            ),
            None => format!(
                "{} {} {}",
                render_operand(left),
                render_comparison_op(*op),
                render_operand(right)
            ),
        },
        Expr::And(left, right) => {
            format!("{} AND {}", render_operand(left), render_operand(right))
        }
        Expr::Or(left, right) => {
            format!("{} OR {}", render_operand(left), render_operand(right))
        }
        Expr::Not(inner) => format!("NOT {}", render_operand(inner)),
        Expr::Is { expr, test } => {
            format!("{} IS {}", render_operand(expr), render_is_test(*test))
        }
        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => format!(
            "{} {}BETWEEN {} AND {}",
            render_operand(expr),
            if *negated { "NOT " } else { "" },
            render_operand(low),
            render_operand(high)
        ),
        Expr::In {
            expr,
            list,
            negated,
        } => format!(
            "{} {}IN ({})",
            render_operand(expr),
            if *negated { "NOT " } else { "" },
            render_expr_list(list)
        ),
        Expr::Paren(inner) => format!("({})", render_expr(inner)),
        Expr::Tuple(items) => format!("({})", render_expr_list(items)),
        Expr::Function { name, args } => {
            if args.is_empty() && is_parenless_function(name) {
                return name.to_ascii_uppercase();
            }
            format!("{name}({})", render_expr_list(args))
        }
        Expr::Cast { expr, data_type } => {
            // `::` binds tighter than a sign, so a negative literal needs
            // grouping to re-parse as the same tree.
            let inner = match expr.as_ref() {
                Expr::Literal(Literal::Integer(value)) if *value < 0 => {
                    format!("({})", render_expr(expr))
                }
                Expr::Literal(Literal::Float(value)) if *value < 0.0 => {
                    format!("({})", render_expr(expr))
                }
                Expr::UnaryOp { .. } => format!("({})", render_expr(expr)),
                _ => render_operand(expr),
            };
            format!("{inner}::{}", render_data_type(data_type))
        }
        Expr::Collate { expr, collation } => {
            format!("{} COLLATE {collation}", render_operand(expr))
        }
        Expr::Interval { value, unit } => {
            let mut sql = format!("interval {}", render_expr(value));
            if let Some(unit) = unit {
                sql.push(' ');
                sql.push_str(unit);
            }
            sql
        }
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            let mut sql = String::from("CASE");
            if let Some(operand) = operand {
                write!(sql, " {}", render_expr(operand)).expect("writing to String should not fail");
            }
            for (when_expr, then_expr) in when_clauses {
                write!(
                    sql,
                    " WHEN {} THEN {}",
                    render_expr(when_expr),
                    render_expr(then_expr)
                )
                .expect("writing to String should not fail");
            }
            if let Some(else_expr) = else_clause {
                write!(sql, " ELSE {}", render_expr(else_expr))
                    .expect("writing to String should not fail");
            }
            sql.push_str(" END");
            sql
        }
        Expr::ArrayConstructor(items) => format!("ARRAY[{}]", render_expr_list(items)),
        Expr::Subquery(subquery) => format!("({})", subquery.sql),
        Expr::Exists(subquery) => format!("EXISTS ({})", subquery.sql),
    }
}

/// Composite operands get grouping parens so the rendered text re-parses
/// with the same shape.
fn render_operand(expr: &Expr) -> String {
    match expr {
        Expr::BinaryOp { .. }
        | Expr::Comparison { .. }
        | Expr::And(..)
        | Expr::Or(..)
        | Expr::Not(_)
        | Expr::Is { .. }
        | Expr::Between { .. }
        | Expr::In { .. }
        | Expr::Case { .. } => format!("({})", render_expr(expr)),
        _ => render_expr(expr),
    }
}

fn render_expr_list(items: &[Expr]) -> String {
    items.iter().map(render_expr).collect::<Vec<_>>().join(", ")
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::String(value) => quote_string(value),
        Literal::Integer(value) => value.to_string(),
        Literal::Float(value) => {
            if value.is_finite() {
                value.to_string()
            } else if value.is_nan() {
                quote_string("NaN")
            } else if value.is_sign_positive() {
                quote_string("Infinity")
            } else {
                quote_string("-Infinity")
            }
        }
        Literal::Boolean(true) => "true".to_string(),
        Literal::Boolean(false) => "false".to_string(),
        Literal::Hex(value) => format!("x'{value}'"),
        Literal::Bit(value) => format!("b'{value}'"),
    }
}

fn render_binary_op(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Modulo => "%",
        BinaryOperator::StringConcat => "||",
        BinaryOperator::BitwiseAnd => "&",
        BinaryOperator::BitwiseOr => "|",
        BinaryOperator::BitwiseXor => "#",
        BinaryOperator::ShiftLeft => "<<",
        BinaryOperator::ShiftRight => ">>",
        BinaryOperator::JsonGet => "->",
        BinaryOperator::JsonGetText => "->>",
    }
}

fn render_comparison_op(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Equal => "=",
        ComparisonOp::NotEqual => "<>",
        ComparisonOp::GreaterThan => ">",
        ComparisonOp::GreaterThanOrEqual => ">=",
        ComparisonOp::LessThan => "<",
        ComparisonOp::LessThanOrEqual => "<=",
        ComparisonOp::Like => "LIKE",
        ComparisonOp::NotLike => "NOT LIKE",
        ComparisonOp::ILike => "ILIKE",
        ComparisonOp::NotILike => "NOT ILIKE",
        ComparisonOp::Regexp => "~",
        ComparisonOp::RegexpCi => "~*",
        ComparisonOp::NotRegexp => "!~",
        ComparisonOp::NotRegexpCi => "!~*",
    }
}

fn render_set_quantifier(quantifier: SetQuantifier) -> &'static str {
    match quantifier {
        SetQuantifier::Any => "ANY",
        SetQuantifier::Some => "SOME",
        SetQuantifier::All => "ALL",
    }
}

fn render_is_test(test: IsTest) -> &'static str {
    match test {
        IsTest::Null => "NULL",
        IsTest::NotNull => "NOT NULL",
        IsTest::True => "TRUE",
        IsTest::NotTrue => "NOT TRUE",
        IsTest::False => "FALSE",
        IsTest::NotFalse => "NOT FALSE",
        IsTest::Unknown => "UNKNOWN",
        IsTest::NotUnknown => "NOT UNKNOWN",
    }
}

fn render_fk_action(action: ForeignKeyAction) -> &'static str {
    match action {
        ForeignKeyAction::NoAction => "NO ACTION",
        ForeignKeyAction::Restrict => "RESTRICT",
        ForeignKeyAction::Cascade => "CASCADE",
        ForeignKeyAction::SetNull => "SET NULL",
        ForeignKeyAction::SetDefault => "SET DEFAULT",
    }
}

fn render_deferrable(deferrable: Deferrable) -> &'static str {
    match deferrable {
        Deferrable::Deferrable {
            initially_deferred: true,
        } => "DEFERRABLE INITIALLY DEFERRED",
        Deferrable::Deferrable {
            initially_deferred: false,
        } => "DEFERRABLE INITIALLY IMMEDIATE",
        Deferrable::NotDeferrable => "NOT DEFERRABLE",
    }
}

fn is_parenless_function(name: &str) -> bool {
    matches!(
        name,
        "current_timestamp" | "current_date" | "current_time" | "current_user" | "session_user"
    )
}

pub(crate) fn render_ident(ident: &Ident) -> String {
    let escaped = ident.value.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

pub(crate) fn render_qualified_name(name: &QualifiedName) -> String {
    match &name.schema {
        Some(schema) => format!("{}.{}", render_ident(schema), render_ident(&name.name)),
        None => render_ident(&name.name),
    }
}

pub(crate) fn render_ident_list(items: &[Ident]) -> String {
    items
        .iter()
        .map(render_ident)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
