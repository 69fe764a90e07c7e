use declsql_core::{
    Comment, CommentTarget, DiffOp, Extension, ForeignKey, Ident, Policy, PrimaryKey, Privilege,
    PrivilegeObject, PrivilegeOp, QualifiedName, SchemaDef, Table, TypeDef, View, sort_diff_ops,
};

fn ident(value: &str) -> Ident {
    Ident::unquoted(value)
}

fn qualified(name: &str) -> QualifiedName {
    QualifiedName {
        schema: Some(ident("public")),
        name: ident(name),
    }
}

fn table(name: &str) -> Table {
    let mut table = Table::named(name);
    table.name = qualified(name);
    table
}

fn table_with_fk(name: &str, references: &str) -> Table {
    let mut table = table(name);
    table.foreign_keys.push(ForeignKey {
        name: None,
        columns: vec![ident("ref_id")],
        referenced_table: qualified(references),
        referenced_columns: vec![ident("id")],
        on_delete: None,
        on_update: None,
        deferrable: None,
    });
    table
}

fn op_position(ops: &[DiffOp], predicate: impl Fn(&DiffOp) -> bool) -> usize {
    ops.iter()
        .position(predicate)
        .expect("op should be present")
}

#[test]
fn create_order_follows_dependency_chain() {
    let ops = vec![
        DiffOp::Grant(Privilege {
            operations: vec![PrivilegeOp::Select],
            on: PrivilegeObject::Table(qualified("t")),
            grantee: ident("r"),
            with_grant_option: false,
        }),
        DiffOp::CreatePolicy(Policy {
            name: ident("p"),
            table: qualified("t"),
            permissive: true,
            command: None,
            roles: vec![],
            using_expr: None,
            check_expr: None,
        }),
        DiffOp::SetComment(Comment {
            target: CommentTarget::Table(qualified("t")),
            text: Some("c".to_string()),
        }),
        DiffOp::CreateView(View::new(qualified("v"), "select 1")),
        DiffOp::CreateTable(table("t")),
        DiffOp::CreateType(TypeDef {
            name: qualified("color"),
            labels: vec!["red".to_string()],
        }),
        DiffOp::CreateExtension(Extension {
            name: ident("pgcrypto"),
            schema: None,
            version: None,
        }),
        DiffOp::CreateSchema(SchemaDef {
            name: ident("analytics"),
        }),
    ];

    let sorted = sort_diff_ops(ops);

    let schema = op_position(&sorted, |op| matches!(op, DiffOp::CreateSchema(_)));
    let extension = op_position(&sorted, |op| matches!(op, DiffOp::CreateExtension(_)));
    let type_pos = op_position(&sorted, |op| matches!(op, DiffOp::CreateType(_)));
    let table_pos = op_position(&sorted, |op| matches!(op, DiffOp::CreateTable(_)));
    let view = op_position(&sorted, |op| matches!(op, DiffOp::CreateView(_)));
    let policy = op_position(&sorted, |op| matches!(op, DiffOp::CreatePolicy(_)));
    let comment = op_position(&sorted, |op| matches!(op, DiffOp::SetComment(_)));
    let grant = op_position(&sorted, |op| matches!(op, DiffOp::Grant(_)));

    assert!(schema < extension);
    assert!(extension < type_pos);
    assert!(type_pos < table_pos);
    assert!(table_pos < view);
    assert!(view < policy);
    assert!(policy < comment);
    assert!(comment < grant);
}

#[test]
fn drops_run_in_reverse_dependency_order() {
    let ops = vec![
        DiffOp::DropSchema(ident("analytics")),
        DiffOp::DropTable(qualified("t")),
        DiffOp::DropView(qualified("v")),
        DiffOp::DropPolicy {
            name: ident("p"),
            table: qualified("t"),
        },
        DiffOp::DropType(qualified("color")),
        DiffOp::CreateTable(table("fresh")),
    ];

    let sorted = sort_diff_ops(ops);

    let policy = op_position(&sorted, |op| matches!(op, DiffOp::DropPolicy { .. }));
    let view = op_position(&sorted, |op| matches!(op, DiffOp::DropView(_)));
    let table_pos = op_position(&sorted, |op| matches!(op, DiffOp::DropTable(_)));
    let type_pos = op_position(&sorted, |op| matches!(op, DiffOp::DropType(_)));
    let schema = op_position(&sorted, |op| matches!(op, DiffOp::DropSchema(_)));
    let create = op_position(&sorted, |op| matches!(op, DiffOp::CreateTable(_)));

    assert!(policy < view);
    assert!(view < table_pos);
    assert!(table_pos < type_pos);
    assert!(type_pos < schema);
    assert!(schema < create);
}

#[test]
fn created_tables_sort_before_their_referrers() {
    let ops = vec![
        DiffOp::CreateTable(table_with_fk("comments", "posts")),
        DiffOp::CreateTable(table_with_fk("posts", "users")),
        DiffOp::CreateTable(table("users")),
    ];

    let sorted = sort_diff_ops(ops);
    let names: Vec<String> = sorted
        .iter()
        .map(|op| match op {
            DiffOp::CreateTable(table) => table.name.name.value.clone(),
            other => panic!("unexpected op {other:?}"),
        })
        .collect();

    assert_eq!(names, vec!["users", "posts", "comments"]);
}

#[test]
fn self_referencing_table_does_not_cycle() {
    let ops = vec![DiffOp::CreateTable(table_with_fk("tree", "tree"))];
    let sorted = sort_diff_ops(ops);
    assert_eq!(sorted.len(), 1);
}

#[test]
fn views_sort_before_views_that_read_them() {
    let base = View::new(qualified("base"), "select id from t");
    let derived = View::new(qualified("derived"), "select id from base");

    let sorted = sort_diff_ops(vec![
        DiffOp::CreateView(derived.clone()),
        DiffOp::CreateView(base.clone()),
    ]);

    assert_eq!(
        sorted,
        vec![DiffOp::CreateView(base), DiffOp::CreateView(derived)]
    );
}

#[test]
fn table_scoped_ops_group_by_table_with_stable_sub_order() {
    let ops = vec![
        DiffOp::SetPrimaryKey {
            table: qualified("t"),
            pk: PrimaryKey {
                name: None,
                columns: vec![ident("id")],
            },
        },
        DiffOp::AddColumn {
            table: qualified("t"),
            column: Box::new(declsql_core::Column::new(
                ident("id"),
                declsql_core::DataType::Integer,
            )),
        },
        DiffOp::AlterColumn {
            table: qualified("t"),
            column: ident("v"),
            changes: vec![declsql_core::ColumnChange::SetNotNull(true)],
        },
    ];

    let sorted = sort_diff_ops(ops);
    assert!(matches!(sorted[0], DiffOp::AlterColumn { .. }));
    assert!(matches!(sorted[1], DiffOp::AddColumn { .. }));
    assert!(matches!(sorted[2], DiffOp::SetPrimaryKey { .. }));
}

/// No forward references: every statement that mentions an object comes
/// after the statement creating it.
#[test]
fn add_foreign_key_lands_after_both_tables_exist() {
    let fk = ForeignKey {
        name: Some(ident("orders_user_fk")),
        columns: vec![ident("user_id")],
        referenced_table: qualified("users"),
        referenced_columns: vec![ident("id")],
        on_delete: None,
        on_update: None,
        deferrable: None,
    };
    let ops = vec![
        DiffOp::AddForeignKey {
            table: qualified("orders"),
            fk,
        },
        DiffOp::CreateTable(table("orders")),
        DiffOp::CreateTable(table("users")),
    ];

    let sorted = sort_diff_ops(ops);
    let fk_pos = op_position(&sorted, |op| matches!(op, DiffOp::AddForeignKey { .. }));
    let last_create = sorted
        .iter()
        .rposition(|op| matches!(op, DiffOp::CreateTable(_)))
        .expect("create tables present");

    assert!(last_create < fk_pos);
}
