use declsql_core::{
    CheckConstraint, Column, ColumnChange, DataType, DiffConfig, DiffEngine, DiffOp, Expr,
    ForeignKey, Ident, Literal, PrimaryKey, QualifiedName, SchemaObject, Table, UniqueConstraint,
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

fn column(name: &str, data_type: DataType) -> Column {
    Column::new(ident(name), data_type)
}

fn with_enable_drop(enable_drop: bool) -> DiffConfig {
    DiffConfig {
        enable_drop,
        ..DiffConfig::default()
    }
}

fn diff(desired: &[SchemaObject], current: &[SchemaObject], config: &DiffConfig) -> Vec<DiffOp> {
    DiffEngine::new()
        .diff(desired, current, config)
        .expect("diff should succeed")
}

#[test]
fn creates_table_when_missing_in_current() {
    let desired_table = table("users");
    let ops = diff(
        &[SchemaObject::Table(desired_table.clone())],
        &[],
        &with_enable_drop(false),
    );
    assert_eq!(ops, vec![DiffOp::CreateTable(desired_table)]);
}

#[test]
fn identical_tables_produce_no_ops() {
    let mut t = table("users");
    t.columns.push(column("id", DataType::BigInt));
    t.primary_key = Some(PrimaryKey {
        name: None,
        columns: vec![ident("id")],
    });

    let desired = vec![SchemaObject::Table(t.clone())];
    let mut current_table = t;
    // The catalog names the constraint; an unnamed desired PK accepts it.
    current_table.primary_key = Some(PrimaryKey {
        name: Some(ident("users_pkey")),
        columns: vec![ident("id")],
    });
    let current = vec![SchemaObject::Table(current_table)];

    assert_eq!(diff(&desired, &current, &with_enable_drop(true)), vec![]);
}

#[test]
fn unqualified_and_qualified_names_pair_via_default_schema() {
    let mut desired_table = Table::named("t");
    desired_table.columns.push(column("id", DataType::Integer));
    let mut current_table = table("t");
    current_table.columns.push(column("id", DataType::Integer));

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(true),
    );
    assert_eq!(ops, vec![]);
}

#[test]
fn table_drop_is_gated_by_enable_drop() {
    let current = vec![SchemaObject::Table(table("orphan"))];

    assert_eq!(diff(&[], &current, &with_enable_drop(false)), vec![]);
    assert_eq!(
        diff(&[], &current, &with_enable_drop(true)),
        vec![DiffOp::DropTable(qualified("orphan"))]
    );
}

#[test]
fn adds_missing_column() {
    let mut desired_table = table("t");
    desired_table.columns.push(column("id", DataType::Integer));
    desired_table
        .columns
        .push(column("name", DataType::Varchar { length: Some(32) }));
    let mut current_table = table("t");
    current_table.columns.push(column("id", DataType::Integer));

    let ops = diff(
        &[SchemaObject::Table(desired_table.clone())],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(false),
    );
    assert_eq!(
        ops,
        vec![DiffOp::AddColumn {
            table: qualified("t"),
            column: Box::new(desired_table.columns[1].clone()),
        }]
    );
}

#[test]
fn column_changes_cover_type_not_null_and_default() {
    let mut desired_table = table("t");
    let mut desired_column = column("v", DataType::BigInt);
    desired_column.not_null = true;
    desired_column.default = Some(Expr::Literal(Literal::Integer(0)));
    desired_table.columns.push(desired_column);

    let mut current_table = table("t");
    current_table.columns.push(column("v", DataType::Integer));

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(false),
    );

    assert_eq!(
        ops,
        vec![DiffOp::AlterColumn {
            table: qualified("t"),
            column: ident("v"),
            changes: vec![
                ColumnChange::SetType(DataType::BigInt),
                ColumnChange::SetNotNull(true),
                ColumnChange::SetDefault(Some(Expr::Literal(Literal::Integer(0)))),
            ],
        }]
    );
}

#[test]
fn column_names_pair_case_insensitively_when_unquoted() {
    let mut desired_table = table("t");
    desired_table.columns.push(column("ID", DataType::Integer));
    let mut current_table = table("t");
    current_table.columns.push(column("id", DataType::Integer));

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(true),
    );
    assert_eq!(ops, vec![]);
}

#[test]
fn primary_key_rename_is_drop_then_add() {
    let mut desired_table = table("t");
    desired_table.columns.push(column("id", DataType::Integer));
    desired_table.primary_key = Some(PrimaryKey {
        name: Some(ident("t_pk")),
        columns: vec![ident("id")],
    });

    let mut current_table = desired_table.clone();
    current_table.primary_key = Some(PrimaryKey {
        name: Some(ident("t_pkey")),
        columns: vec![ident("id")],
    });

    let ops = diff(
        &[SchemaObject::Table(desired_table.clone())],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(false),
    );

    assert_eq!(
        ops,
        vec![
            DiffOp::DropPrimaryKey {
                table: qualified("t"),
                name: ident("t_pkey"),
            },
            DiffOp::SetPrimaryKey {
                table: qualified("t"),
                pk: desired_table.primary_key.clone().expect("pk"),
            },
        ]
    );
}

#[test]
fn unnamed_current_primary_key_drop_uses_default_name() {
    let mut current_table = table("t");
    current_table.columns.push(column("id", DataType::Integer));
    current_table.primary_key = Some(PrimaryKey {
        name: None,
        columns: vec![ident("id")],
    });

    let mut desired_table = current_table.clone();
    desired_table.primary_key = None;

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(false),
    );
    assert_eq!(
        ops,
        vec![DiffOp::DropPrimaryKey {
            table: qualified("t"),
            name: ident("t_pkey"),
        }]
    );
}

#[test]
fn named_check_mismatch_is_drop_then_add() {
    let desired_check = CheckConstraint {
        name: Some(ident("qty_positive")),
        expr: Expr::Raw("qty > 0".to_string()),
        no_inherit: false,
    };
    let current_check = CheckConstraint {
        name: Some(ident("qty_positive")),
        expr: Expr::Raw("qty >= 0".to_string()),
        no_inherit: false,
    };

    let mut desired_table = table("t");
    desired_table.checks.push(desired_check.clone());
    let mut current_table = table("t");
    current_table.checks.push(current_check);

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(false),
    );
    assert_eq!(
        ops,
        vec![
            DiffOp::DropCheck {
                table: qualified("t"),
                name: ident("qty_positive"),
            },
            DiffOp::AddCheck {
                table: qualified("t"),
                check: desired_check,
            },
        ]
    );
}

#[test]
fn unnamed_desired_check_pairs_by_equivalent_expression() {
    let mut desired_table = table("t");
    desired_table.checks.push(CheckConstraint {
        name: None,
        expr: Expr::Raw("qty > 0".to_string()),
        no_inherit: false,
    });
    let mut current_table = table("t");
    current_table.checks.push(CheckConstraint {
        name: Some(ident("t_qty_check")),
        expr: Expr::Raw("(qty > 0)".to_string()),
        no_inherit: false,
    });

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(true),
    );
    assert_eq!(ops, vec![]);
}

#[test]
fn foreign_keys_pair_by_name_and_rebuild_on_mismatch() {
    let desired_fk = ForeignKey {
        name: Some(ident("orders_user_fk")),
        columns: vec![ident("user_id")],
        referenced_table: qualified("users"),
        referenced_columns: vec![ident("id")],
        on_delete: Some(declsql_core::ForeignKeyAction::Cascade),
        on_update: None,
        deferrable: None,
    };
    let mut current_fk = desired_fk.clone();
    current_fk.on_delete = None;

    let mut desired_table = table("orders");
    desired_table.foreign_keys.push(desired_fk.clone());
    let mut current_table = table("orders");
    current_table.foreign_keys.push(current_fk);

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(false),
    );
    assert_eq!(
        ops,
        vec![
            DiffOp::DropForeignKey {
                table: qualified("orders"),
                name: ident("orders_user_fk"),
            },
            DiffOp::AddForeignKey {
                table: qualified("orders"),
                fk: desired_fk,
            },
        ]
    );
}

#[test]
fn no_action_and_absent_fk_action_are_equivalent() {
    let mut desired_fk = ForeignKey {
        name: Some(ident("fk")),
        columns: vec![ident("a")],
        referenced_table: qualified("users"),
        referenced_columns: vec![ident("id")],
        on_delete: Some(declsql_core::ForeignKeyAction::NoAction),
        on_update: None,
        deferrable: None,
    };
    let mut current_fk = desired_fk.clone();
    desired_fk.on_delete = Some(declsql_core::ForeignKeyAction::NoAction);
    current_fk.on_delete = None;

    let mut desired_table = table("t");
    desired_table.foreign_keys.push(desired_fk);
    let mut current_table = table("t");
    current_table.foreign_keys.push(current_fk);

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(true),
    );
    assert_eq!(ops, vec![]);
}

#[test]
fn unique_constraints_pair_by_column_set_when_unnamed() {
    let mut desired_table = table("t");
    desired_table.uniques.push(UniqueConstraint {
        name: None,
        columns: vec![ident("email")],
        deferrable: None,
    });
    let mut current_table = table("t");
    current_table.uniques.push(UniqueConstraint {
        name: Some(ident("t_email_key")),
        columns: vec![ident("email")],
        deferrable: None,
    });

    let ops = diff(
        &[SchemaObject::Table(desired_table)],
        &[SchemaObject::Table(current_table)],
        &with_enable_drop(true),
    );
    assert_eq!(ops, vec![]);
}

#[test]
fn column_drop_requires_enable_drop() {
    let mut desired_table = table("t");
    desired_table.columns.push(column("id", DataType::Integer));
    let mut current_table = desired_table.clone();
    current_table.columns.push(column("legacy", DataType::Text));

    assert_eq!(
        diff(
            &[SchemaObject::Table(desired_table.clone())],
            &[SchemaObject::Table(current_table.clone())],
            &with_enable_drop(false),
        ),
        vec![]
    );

    assert_eq!(
        diff(
            &[SchemaObject::Table(desired_table)],
            &[SchemaObject::Table(current_table)],
            &with_enable_drop(true),
        ),
        vec![DiffOp::DropColumn {
            table: qualified("t"),
            column: ident("legacy"),
        }]
    );
}
