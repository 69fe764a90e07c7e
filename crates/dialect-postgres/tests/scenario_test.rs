//! End-to-end reconciliation scenarios: the desired text and a
//! catalog-shaped current text both go through the parse pipeline, the
//! diff engine plans, and the generator renders executable SQL.

use declsql_core::{DiffConfig, DiffEngine, Dialect, build_ddl_plan, render_plan};
use declsql_dialect_postgres::PostgresDialect;

fn plan(desired_sql: &str, current_sql: &str, enable_drop: bool) -> String {
    let dialect = PostgresDialect;
    let desired = dialect.parse(desired_sql).expect("desired should parse");
    let current = dialect.parse(current_sql).expect("current should parse");

    let config = DiffConfig {
        enable_drop,
        default_schema: "public".to_string(),
    };
    let ops = DiffEngine::new()
        .diff(&desired, &current, &config)
        .expect("diff should succeed");
    let ddl_plan = build_ddl_plan(ops);
    let statements = dialect
        .generate_ddl(ddl_plan.ops())
        .expect("generation should succeed");
    render_plan(&statements)
}

/// S1: a schema identical to the database is a no-op.
#[test]
fn no_op_when_current_matches_desired() {
    let desired = "CREATE TABLE t (id INTEGER PRIMARY KEY);";
    let current = "CREATE TABLE \"public\".\"t\" (\n    \"id\" integer NOT NULL,\n    CONSTRAINT \"t_pkey\" PRIMARY KEY (\"id\")\n);";

    assert_eq!(plan(desired, current, true), "");
}

/// S2: one added column becomes exactly one ALTER TABLE ADD COLUMN, with
/// the bare desired name resolved against the default schema.
#[test]
fn added_column_emits_single_alter() {
    let desired = "CREATE TABLE t (id INTEGER PRIMARY KEY, name VARCHAR(32));";
    let current = "CREATE TABLE \"public\".\"t\" (\n    \"id\" integer NOT NULL,\n    CONSTRAINT \"t_pkey\" PRIMARY KEY (\"id\")\n);";

    assert_eq!(
        plan(desired, current, false),
        "ALTER TABLE \"public\".\"t\" ADD COLUMN \"name\" VARCHAR(32);\n"
    );
}

/// S3: new enum labels append with ALTER TYPE ADD VALUE.
#[test]
fn enum_label_addition_emits_alter_type() {
    let desired = "CREATE TYPE color AS ENUM ('red', 'green', 'blue');";
    let current = "CREATE TYPE \"public\".\"color\" AS ENUM ('red', 'green');";

    assert_eq!(
        plan(desired, current, false),
        "ALTER TYPE \"public\".\"color\" ADD VALUE 'blue';\n"
    );
}

/// S4: the catalog's canonical check spelling diffs as equal after
/// normalization.
#[test]
fn normalized_check_constraints_are_equal() {
    let desired = "CREATE TABLE t (
        status text,
        CONSTRAINT t_status_check CHECK (status = ANY(ARRAY['active', 'pending']))
    );";
    let current = "CREATE TABLE \"public\".\"t\" (
        \"status\" text,
        CONSTRAINT \"t_status_check\" CHECK ((status = ANY (ARRAY['active'::text, 'pending'::text])))
    );";

    assert_eq!(plan(desired, current, true), "");
}

/// S5: a primary-key rename is a drop of the old constraint followed by
/// an add under the new name.
#[test]
fn primary_key_rename_drops_then_adds() {
    let desired = "CREATE TABLE t (id INTEGER, CONSTRAINT t_pk PRIMARY KEY (id));";
    let current = "CREATE TABLE \"public\".\"t\" (\n    \"id\" integer NOT NULL,\n    CONSTRAINT \"t_pkey\" PRIMARY KEY (\"id\")\n);";

    assert_eq!(
        plan(desired, current, false),
        "ALTER TABLE \"public\".\"t\" DROP CONSTRAINT \"t_pkey\";\n\
         ALTER TABLE \"public\".\"t\" ADD CONSTRAINT \"t_pk\" PRIMARY KEY (\"id\");\n"
    );
}

/// S6: revoking a full privilege set collapses to REVOKE ALL PRIVILEGES,
/// then the desired grants are issued.
#[test]
fn full_privilege_set_collapses_on_revoke() {
    let desired = "CREATE TABLE t (id INTEGER);
        GRANT SELECT ON TABLE t TO readonly;";
    let current = "CREATE TABLE \"public\".\"t\" (\n    \"id\" integer\n);
        GRANT ALL PRIVILEGES ON TABLE \"public\".\"t\" TO \"readonly\";";

    assert_eq!(
        plan(desired, current, false),
        "REVOKE ALL PRIVILEGES ON TABLE \"public\".\"t\" FROM \"readonly\";\n\
         GRANT SELECT ON TABLE \"public\".\"t\" TO \"readonly\";\n"
    );
}

/// Running the differ against its own output state converges: a second
/// diff of the same pair stays empty once the plans agree.
#[test]
fn diff_is_idempotent_for_equal_inputs() {
    let schema = "CREATE TABLE a (id BIGINT PRIMARY KEY, name TEXT NOT NULL);
        CREATE INDEX a_name_idx ON a (name);
        CREATE VIEW recent AS SELECT id FROM a;";

    assert_eq!(plan(schema, schema, true), "");
}

#[test]
fn drops_are_suppressed_without_enable_drop() {
    let desired = "CREATE TABLE keep (id INTEGER);";
    let current = "CREATE TABLE keep (id INTEGER);
        CREATE TABLE orphan (id INTEGER);";

    assert_eq!(plan(desired, current, false), "");
    let with_drop = plan(desired, current, true);
    assert!(with_drop.contains("DROP TABLE \"public\".\"orphan\";"));
}

#[test]
fn new_tables_with_foreign_keys_order_referenced_first() {
    let desired = "CREATE TABLE orders (
            id BIGINT PRIMARY KEY,
            user_id BIGINT REFERENCES users (id)
        );
        CREATE TABLE users (id BIGINT PRIMARY KEY);";

    let rendered = plan(desired, "", false);
    let users_pos = rendered
        .find("CREATE TABLE \"public\".\"users\"")
        .expect("users created");
    let orders_pos = rendered
        .find("CREATE TABLE \"public\".\"orders\"")
        .expect("orders created");
    assert!(users_pos < orders_pos);
}

/// Serial columns and their catalog spelling (integer + nextval default)
/// are the same schema.
#[test]
fn serial_matches_integer_with_nextval_default() {
    let desired = "CREATE TABLE t (id SERIAL PRIMARY KEY);";
    let current = "CREATE TABLE \"public\".\"t\" (
        \"id\" integer DEFAULT nextval('t_id_seq'::regclass) NOT NULL,
        CONSTRAINT \"t_pkey\" PRIMARY KEY (\"id\")
    );";

    assert_eq!(plan(desired, current, true), "");
}
