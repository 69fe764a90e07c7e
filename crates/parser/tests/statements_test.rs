use declsql_core::{
    CommentTarget, Expr, Ident, PolicyCommand, PrivilegeOp, SchemaObject, SortOrder,
};
use declsql_parser::{ParserMode, parse_schema};

fn parse_one(sql: &str) -> SchemaObject {
    let objects = parse_schema(sql, ParserMode::Postgres).expect("schema should parse");
    assert_eq!(objects.len(), 1, "expected exactly one object");
    objects.into_iter().next().expect("one object")
}

#[test]
fn create_index_with_method_order_and_where() {
    let SchemaObject::Index(index) = parse_one(
        "CREATE UNIQUE INDEX users_email_idx ON users USING btree (email DESC) WHERE deleted_at IS NULL;",
    ) else {
        panic!("expected index");
    };

    assert!(index.unique);
    assert_eq!(index.name, Some(Ident::unquoted("users_email_idx")));
    assert_eq!(index.method.as_deref(), Some("btree"));
    assert_eq!(index.columns[0].order, Some(SortOrder::Desc));
    assert!(index.where_clause.is_some());
    assert!(!index.concurrent);
}

#[test]
fn create_index_without_name_gets_the_default() {
    let SchemaObject::Index(index) = parse_one("CREATE INDEX ON users (email);") else {
        panic!("expected index");
    };
    assert_eq!(index.name, Some(Ident::unquoted("users_email_idx")));
}

#[test]
fn create_index_concurrently_is_flagged() {
    let SchemaObject::Index(index) =
        parse_one("CREATE INDEX CONCURRENTLY users_email_idx ON users (email);")
    else {
        panic!("expected index");
    };
    assert!(index.concurrent);
}

#[test]
fn create_index_with_include_columns() {
    let SchemaObject::Index(index) =
        parse_one("CREATE INDEX users_email_idx ON users (email) INCLUDE (name, id);")
    else {
        panic!("expected index");
    };
    assert_eq!(
        index.include,
        vec![Ident::unquoted("name"), Ident::unquoted("id")]
    );
}

#[test]
fn create_view_captures_query_text() {
    let SchemaObject::View(view) =
        parse_one("CREATE VIEW active_users AS SELECT id, name FROM users WHERE active;")
    else {
        panic!("expected view");
    };
    assert_eq!(view.name.name, Ident::unquoted("active_users"));
    assert_eq!(view.query, "SELECT id, name FROM users WHERE active");
}

#[test]
fn create_materialized_view_with_no_data() {
    let SchemaObject::MaterializedView(view) =
        parse_one("CREATE MATERIALIZED VIEW mv AS SELECT 1 WITH NO DATA;")
    else {
        panic!("expected materialized view");
    };
    assert!(!view.with_data);
}

#[test]
fn create_materialized_view_defaults_to_with_data() {
    let SchemaObject::MaterializedView(view) =
        parse_one("CREATE MATERIALIZED VIEW mv AS SELECT 1;")
    else {
        panic!("expected materialized view");
    };
    assert!(view.with_data);
}

#[test]
fn create_policy_full_form() {
    let SchemaObject::Policy(policy) = parse_one(
        "CREATE POLICY tenant_isolation ON accounts AS RESTRICTIVE FOR SELECT TO app_user \
         USING (tenant_id = 1) WITH CHECK (tenant_id = 1);",
    ) else {
        panic!("expected policy");
    };

    assert_eq!(policy.name, Ident::unquoted("tenant_isolation"));
    assert!(!policy.permissive);
    assert_eq!(policy.command, Some(PolicyCommand::Select));
    assert_eq!(policy.roles, vec![Ident::unquoted("app_user")]);
    assert!(policy.using_expr.is_some());
    assert!(policy.check_expr.is_some());
}

#[test]
fn create_type_as_enum() {
    let SchemaObject::Type(type_def) =
        parse_one("CREATE TYPE color AS ENUM ('red', 'green', 'blue');")
    else {
        panic!("expected type");
    };
    assert_eq!(type_def.labels, vec!["red", "green", "blue"]);
}

#[test]
fn create_schema_and_extension() {
    let SchemaObject::Schema(schema) = parse_one("CREATE SCHEMA analytics;") else {
        panic!("expected schema");
    };
    assert_eq!(schema.name, Ident::unquoted("analytics"));

    let SchemaObject::Extension(extension) =
        parse_one("CREATE EXTENSION IF NOT EXISTS pgcrypto WITH SCHEMA public;")
    else {
        panic!("expected extension");
    };
    assert_eq!(extension.name, Ident::unquoted("pgcrypto"));
    assert_eq!(extension.schema, Some(Ident::unquoted("public")));
}

#[test]
fn grant_with_all_privileges() {
    let SchemaObject::Privilege(privilege) =
        parse_one("GRANT ALL PRIVILEGES ON TABLE t TO readonly;")
    else {
        panic!("expected privilege");
    };
    assert_eq!(privilege.operations, vec![PrivilegeOp::All]);
    assert_eq!(privilege.grantee, Ident::unquoted("readonly"));
}

#[test]
fn grant_with_privilege_list() {
    let SchemaObject::Privilege(privilege) =
        parse_one("GRANT SELECT, INSERT ON t TO writer WITH GRANT OPTION;")
    else {
        panic!("expected privilege");
    };
    assert_eq!(
        privilege.operations,
        vec![PrivilegeOp::Select, PrivilegeOp::Insert]
    );
    assert!(privilege.with_grant_option);
}

#[test]
fn revoke_is_rejected_as_non_declarative() {
    let error = parse_schema("REVOKE SELECT ON t FROM readonly;", ParserMode::Postgres)
        .expect_err("revoke should be rejected");
    assert!(matches!(error, declsql_core::Error::Parse(_)));
}

#[test]
fn comment_on_table_and_column() {
    let SchemaObject::Comment(comment) = parse_one("COMMENT ON TABLE t IS 'the table';") else {
        panic!("expected comment");
    };
    assert_eq!(comment.text.as_deref(), Some("the table"));

    let SchemaObject::Comment(comment) = parse_one("COMMENT ON COLUMN t.id IS NULL;") else {
        panic!("expected comment");
    };
    assert_eq!(comment.text, None);
    assert!(matches!(comment.target, CommentTarget::Column { .. }));
}

#[test]
fn statement_splitter_survives_semicolons_in_strings() {
    let objects = parse_schema(
        "CREATE TABLE a (x text DEFAULT 'one;two');\nCREATE TABLE b (y integer);",
        ParserMode::Postgres,
    )
    .expect("schema should parse");
    assert_eq!(objects.len(), 2);

    let SchemaObject::Table(table) = &objects[0] else {
        panic!("expected table");
    };
    assert_eq!(
        table.columns[0].default,
        Some(Expr::Literal(declsql_core::Literal::String(
            "one;two".to_string()
        )))
    );
}

#[test]
fn syntax_error_carries_position_and_caret() {
    let error = parse_schema("CREATE TABLE t (id integer", ParserMode::Postgres)
        .expect_err("unterminated statement should fail");

    let declsql_core::Error::Parse(declsql_core::ParseError::Syntax(syntax)) = error else {
        panic!("expected syntax error, got something else");
    };
    assert_eq!(syntax.line, 1);
    assert!(syntax.column > 1);
    assert!(syntax.snippet.contains("CREATE TABLE"));
    let rendered = syntax.to_string();
    assert!(rendered.contains('^'));
}
