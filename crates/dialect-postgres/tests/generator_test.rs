use declsql_core::{
    CheckConstraint, Column, ColumnChange, DataType, Dialect, DiffOp, EnumValuePosition, Expr,
    ForeignKey, ForeignKeyAction, Ident, IndexColumn, IndexDef, Literal, PrimaryKey, QualifiedName,
    Statement, TypeChange,
};
use declsql_dialect_postgres::PostgresDialect;

fn ident(value: &str) -> Ident {
    Ident::unquoted(value)
}

fn qualified(name: &str) -> QualifiedName {
    QualifiedName {
        schema: Some(ident("public")),
        name: ident(name),
    }
}

fn generate(ops: &[DiffOp]) -> Vec<Statement> {
    PostgresDialect
        .generate_ddl(ops)
        .expect("generation should succeed")
}

fn single_sql(ops: &[DiffOp]) -> String {
    let statements = generate(ops);
    assert_eq!(statements.len(), 1, "expected exactly one statement");
    statements[0].sql.clone()
}

#[test]
fn add_column_statement() {
    let sql = single_sql(&[DiffOp::AddColumn {
        table: qualified("t"),
        column: Box::new(Column::new(
            ident("name"),
            DataType::Varchar { length: Some(32) },
        )),
    }]);
    assert_eq!(sql, "ALTER TABLE \"public\".\"t\" ADD COLUMN \"name\" VARCHAR(32)");
}

#[test]
fn alter_column_changes_render_one_statement_each() {
    let statements = generate(&[DiffOp::AlterColumn {
        table: qualified("t"),
        column: ident("v"),
        changes: vec![
            ColumnChange::SetType(DataType::BigInt),
            ColumnChange::SetNotNull(true),
            ColumnChange::SetDefault(Some(Expr::Literal(Literal::Integer(0)))),
            ColumnChange::SetDefault(None),
            ColumnChange::SetNotNull(false),
        ],
    }]);

    let sql: Vec<&str> = statements
        .iter()
        .map(|statement| statement.sql.as_str())
        .collect();
    assert_eq!(
        sql,
        vec![
            "ALTER TABLE \"public\".\"t\" ALTER COLUMN \"v\" TYPE BIGINT",
            "ALTER TABLE \"public\".\"t\" ALTER COLUMN \"v\" SET NOT NULL",
            "ALTER TABLE \"public\".\"t\" ALTER COLUMN \"v\" SET DEFAULT 0",
            "ALTER TABLE \"public\".\"t\" ALTER COLUMN \"v\" DROP DEFAULT",
            "ALTER TABLE \"public\".\"t\" ALTER COLUMN \"v\" DROP NOT NULL",
        ]
    );
}

#[test]
fn primary_key_statements() {
    let sql = single_sql(&[DiffOp::SetPrimaryKey {
        table: qualified("t"),
        pk: PrimaryKey {
            name: Some(ident("t_pk")),
            columns: vec![ident("id")],
        },
    }]);
    assert_eq!(
        sql,
        "ALTER TABLE \"public\".\"t\" ADD CONSTRAINT \"t_pk\" PRIMARY KEY (\"id\")"
    );

    let sql = single_sql(&[DiffOp::DropPrimaryKey {
        table: qualified("t"),
        name: ident("t_pkey"),
    }]);
    assert_eq!(sql, "ALTER TABLE \"public\".\"t\" DROP CONSTRAINT \"t_pkey\"");
}

#[test]
fn foreign_key_statement_with_actions() {
    let sql = single_sql(&[DiffOp::AddForeignKey {
        table: qualified("orders"),
        fk: ForeignKey {
            name: Some(ident("orders_user_fk")),
            columns: vec![ident("user_id")],
            referenced_table: qualified("users"),
            referenced_columns: vec![ident("id")],
            on_delete: Some(ForeignKeyAction::SetNull),
            on_update: Some(ForeignKeyAction::Cascade),
            deferrable: None,
        },
    }]);
    assert_eq!(
        sql,
        "ALTER TABLE \"public\".\"orders\" ADD CONSTRAINT \"orders_user_fk\" \
         FOREIGN KEY (\"user_id\") REFERENCES \"public\".\"users\" (\"id\") \
         ON DELETE SET NULL ON UPDATE CASCADE"
    );
}

#[test]
fn check_constraint_statement() {
    let sql = single_sql(&[DiffOp::AddCheck {
        table: qualified("t"),
        check: CheckConstraint {
            name: Some(ident("qty_positive")),
            expr: Expr::Comparison {
                left: Box::new(Expr::Ident(ident("qty"))),
                op: declsql_core::ComparisonOp::GreaterThan,
                right: Box::new(Expr::Literal(Literal::Integer(0))),
                quantifier: None,
            },
            no_inherit: false,
        },
    }]);
    assert_eq!(
        sql,
        "ALTER TABLE \"public\".\"t\" ADD CONSTRAINT \"qty_positive\" CHECK (\"qty\" > 0)"
    );
}

#[test]
fn concurrent_index_is_non_transactional() {
    let statements = generate(&[DiffOp::AddIndex(IndexDef {
        name: Some(ident("t_v_idx")),
        table: qualified("t"),
        columns: vec![IndexColumn::plain(Expr::Ident(ident("v")))],
        unique: false,
        method: Some("btree".to_string()),
        where_clause: None,
        include: vec![],
        concurrent: true,
    })]);

    assert_eq!(statements.len(), 1);
    assert!(!statements[0].transactional);
    assert_eq!(
        statements[0].sql,
        "CREATE INDEX CONCURRENTLY \"t_v_idx\" ON \"public\".\"t\" USING btree (\"v\")"
    );
}

#[test]
fn alter_type_positions_render_before_and_after() {
    let sql = single_sql(&[DiffOp::AlterType {
        name: qualified("color"),
        change: TypeChange::AddValue {
            value: "yellow".to_string(),
            position: Some(EnumValuePosition::Before("green".to_string())),
        },
    }]);
    assert_eq!(
        sql,
        "ALTER TYPE \"public\".\"color\" ADD VALUE 'yellow' BEFORE 'green'"
    );

    let sql = single_sql(&[DiffOp::AlterType {
        name: qualified("color"),
        change: TypeChange::AddValue {
            value: "teal".to_string(),
            position: Some(EnumValuePosition::After("green".to_string())),
        },
    }]);
    assert_eq!(
        sql,
        "ALTER TYPE \"public\".\"color\" ADD VALUE 'teal' AFTER 'green'"
    );
}

#[test]
fn alter_type_add_value_is_non_transactional() {
    let statements = generate(&[DiffOp::AlterType {
        name: qualified("color"),
        change: TypeChange::AddValue {
            value: "blue".to_string(),
            position: None,
        },
    }]);
    assert!(!statements[0].transactional);
}

#[test]
fn string_literals_escape_single_quotes() {
    let sql = single_sql(&[DiffOp::SetComment(declsql_core::Comment {
        target: declsql_core::CommentTarget::Table(qualified("t")),
        text: Some("it's a table".to_string()),
    })]);
    assert_eq!(
        sql,
        "COMMENT ON TABLE \"public\".\"t\" IS 'it''s a table'"
    );
}

#[test]
fn quoted_identifiers_escape_embedded_quotes() {
    let sql = single_sql(&[DiffOp::DropTable(QualifiedName {
        schema: None,
        name: Ident::quoted("odd\"name"),
    })]);
    assert_eq!(sql, "DROP TABLE \"odd\"\"name\"");
}
