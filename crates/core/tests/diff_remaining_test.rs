use declsql_core::{
    Comment, CommentTarget, DiffConfig, DiffEngine, DiffOp, EnumValuePosition, Error, Expr, Ident,
    Policy, QualifiedName, SchemaDef, SchemaObject, Table, TypeChange, TypeDef, View,
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

fn enum_type(name: &str, labels: &[&str]) -> TypeDef {
    TypeDef {
        name: qualified(name),
        labels: labels.iter().map(|label| label.to_string()).collect(),
    }
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
fn enum_label_appended_at_end_has_no_position() {
    let desired = vec![SchemaObject::Type(enum_type(
        "color",
        &["red", "green", "blue"],
    ))];
    let current = vec![SchemaObject::Type(enum_type("color", &["red", "green"]))];

    let ops = diff(&desired, &current, &with_enable_drop(false));
    assert_eq!(
        ops,
        vec![DiffOp::AlterType {
            name: qualified("color"),
            change: TypeChange::AddValue {
                value: "blue".to_string(),
                position: None,
            },
        }]
    );
}

#[test]
fn enum_label_inserted_in_the_middle_gets_before_position() {
    let desired = vec![SchemaObject::Type(enum_type(
        "color",
        &["red", "yellow", "green"],
    ))];
    let current = vec![SchemaObject::Type(enum_type("color", &["red", "green"]))];

    let ops = diff(&desired, &current, &with_enable_drop(false));
    assert_eq!(
        ops,
        vec![DiffOp::AlterType {
            name: qualified("color"),
            change: TypeChange::AddValue {
                value: "yellow".to_string(),
                position: Some(EnumValuePosition::Before("green".to_string())),
            },
        }]
    );
}

#[test]
fn enum_label_removal_is_a_plan_error() {
    let desired = vec![SchemaObject::Type(enum_type("color", &["red"]))];
    let current = vec![SchemaObject::Type(enum_type("color", &["red", "green"]))];

    let error = DiffEngine::new()
        .diff(&desired, &current, &with_enable_drop(true))
        .expect_err("label removal should fail planning");
    assert!(matches!(error, Error::Plan(_)));
}

#[test]
fn changed_view_is_dropped_and_recreated() {
    let desired_view = View::new(qualified("v"), "select id from t");
    let current_view = View::new(qualified("v"), "select id, name from t");

    let ops = diff(
        &[SchemaObject::View(desired_view.clone())],
        &[SchemaObject::View(current_view)],
        &with_enable_drop(false),
    );
    assert_eq!(
        ops,
        vec![
            DiffOp::DropView(qualified("v")),
            DiffOp::CreateView(desired_view),
        ]
    );
}

#[test]
fn schema_drop_is_never_implicit() {
    let current = vec![SchemaObject::Schema(SchemaDef {
        name: ident("analytics"),
    })];

    assert_eq!(diff(&[], &current, &with_enable_drop(true)), vec![]);
}

#[test]
fn comment_text_change_emits_set_comment() {
    let mut desired_table = Table::named("t");
    desired_table.name = qualified("t");
    let desired = vec![
        SchemaObject::Table(desired_table.clone()),
        SchemaObject::Comment(Comment {
            target: CommentTarget::Table(qualified("t")),
            text: Some("new".to_string()),
        }),
    ];
    let current = vec![
        SchemaObject::Table(desired_table),
        SchemaObject::Comment(Comment {
            target: CommentTarget::Table(qualified("t")),
            text: Some("old".to_string()),
        }),
    ];

    let ops = diff(&desired, &current, &with_enable_drop(false));
    assert_eq!(
        ops,
        vec![DiffOp::SetComment(Comment {
            target: CommentTarget::Table(qualified("t")),
            text: Some("new".to_string()),
        })]
    );
}

#[test]
fn comment_on_dropped_table_is_not_dropped_separately() {
    let mut current_table = Table::named("t");
    current_table.name = qualified("t");
    let current = vec![
        SchemaObject::Table(current_table),
        SchemaObject::Comment(Comment {
            target: CommentTarget::Table(qualified("t")),
            text: Some("doomed".to_string()),
        }),
    ];

    let ops = diff(&[], &current, &with_enable_drop(true));
    assert_eq!(ops, vec![DiffOp::DropTable(qualified("t"))]);
}

#[test]
fn policy_mismatch_is_drop_then_create() {
    let mut table = Table::named("accounts");
    table.name = qualified("accounts");

    let desired_policy = Policy {
        name: ident("tenant_isolation"),
        table: qualified("accounts"),
        permissive: true,
        command: None,
        roles: vec![ident("app_user")],
        using_expr: Some(Expr::Raw("tenant_id = 1".to_string())),
        check_expr: None,
    };
    let mut current_policy = desired_policy.clone();
    current_policy.using_expr = Some(Expr::Raw("tenant_id = 2".to_string()));

    let ops = diff(
        &[
            SchemaObject::Table(table.clone()),
            SchemaObject::Policy(desired_policy.clone()),
        ],
        &[
            SchemaObject::Table(table),
            SchemaObject::Policy(current_policy),
        ],
        &with_enable_drop(false),
    );

    assert_eq!(
        ops,
        vec![
            DiffOp::DropPolicy {
                name: ident("tenant_isolation"),
                table: qualified("accounts"),
            },
            DiffOp::CreatePolicy(desired_policy),
        ]
    );
}

#[test]
fn policy_on_dropped_table_cascades_silently() {
    let mut current_table = Table::named("accounts");
    current_table.name = qualified("accounts");
    let current = vec![
        SchemaObject::Table(current_table),
        SchemaObject::Policy(Policy {
            name: ident("p"),
            table: qualified("accounts"),
            permissive: true,
            command: None,
            roles: vec![],
            using_expr: None,
            check_expr: None,
        }),
    ];

    let ops = diff(&[], &current, &with_enable_drop(true));
    assert_eq!(ops, vec![DiffOp::DropTable(qualified("accounts"))]);
}

#[test]
fn policy_role_order_does_not_matter() {
    let mut table = Table::named("t");
    table.name = qualified("t");

    let mut desired_policy = Policy {
        name: ident("p"),
        table: qualified("t"),
        permissive: true,
        command: None,
        roles: vec![ident("a"), ident("b")],
        using_expr: None,
        check_expr: None,
    };
    let mut current_policy = desired_policy.clone();
    desired_policy.roles = vec![ident("b"), ident("a")];
    current_policy.roles = vec![ident("a"), ident("b")];

    let ops = diff(
        &[
            SchemaObject::Table(table.clone()),
            SchemaObject::Policy(desired_policy),
        ],
        &[
            SchemaObject::Table(table),
            SchemaObject::Policy(current_policy),
        ],
        &with_enable_drop(true),
    );
    assert_eq!(ops, vec![]);
}
