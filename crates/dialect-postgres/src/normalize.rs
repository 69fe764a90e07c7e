//! Canonicalizing rewrites applied to every parsed object before diffing.
//! The live database hands back expressions in its own canonical form;
//! these rules fold both spellings onto one shape. Normalization is
//! idempotent: applying it twice changes nothing.

use declsql_core::{
    Column, DataType, Expr, Literal, QualifiedName, SchemaObject, SetQuantifier, Table,
    UnaryOperator,
};

const DEFAULT_SCHEMA: &str = "public";

pub(crate) fn normalize_schema(objects: &mut [SchemaObject]) {
    for object in objects.iter_mut() {
        normalize_object(object);
    }
}

pub(crate) fn normalize_object(object: &mut SchemaObject) {
    match object {
        SchemaObject::Table(table) => normalize_table(table),
        SchemaObject::View(view) => {
            view.query = normalize_query_text(&view.query);
        }
        SchemaObject::MaterializedView(view) => {
            view.query = normalize_query_text(&view.query);
        }
        SchemaObject::Index(index) => {
            for column in &mut index.columns {
                normalize_expr(&mut column.expr);
            }
            if let Some(where_clause) = &mut index.where_clause {
                normalize_expr(where_clause);
            }
        }
        SchemaObject::Type(type_def) => strip_default_schema(&mut type_def.name),
        SchemaObject::Extension(_) => {}
        SchemaObject::Schema(_) => {}
        SchemaObject::Comment(_) => {}
        SchemaObject::Privilege(_) => {}
        SchemaObject::Policy(policy) => {
            if let Some(using_expr) = &mut policy.using_expr {
                normalize_expr(using_expr);
            }
            if let Some(check_expr) = &mut policy.check_expr {
                normalize_expr(check_expr);
            }
        }
    }
}

fn normalize_table(table: &mut Table) {
    let table_name = table.name.clone();
    for column in &mut table.columns {
        normalize_data_type(&mut column.data_type);
        normalize_serial_column(&table_name, column);

        if let Some(default) = &mut column.default {
            normalize_expr(default);
        }
        if let Some(generated) = &mut column.generated {
            normalize_expr(&mut generated.expr);
        }
        if column.identity.is_some() {
            column.not_null = true;
            column.default = None;
        }
    }

    for check in &mut table.checks {
        normalize_expr(&mut check.expr);
    }
    for exclusion in &mut table.exclusions {
        for element in &mut exclusion.elements {
            normalize_expr(&mut element.expr);
        }
        if let Some(where_clause) = &mut exclusion.where_clause {
            normalize_expr(where_clause);
        }
    }
}

/// `serial` columns are spelled out as their base type plus an implicit
/// `nextval` default, which is exactly what the catalog reports back.
fn normalize_serial_column(table_name: &QualifiedName, column: &mut Column) {
    let DataType::Custom(custom) = &column.data_type else {
        return;
    };

    let mapped = match custom.rsplit('.').next().unwrap_or(custom.as_str()) {
        "serial" | "serial4" => DataType::Integer,
        "bigserial" | "serial8" => DataType::BigInt,
        "smallserial" | "serial2" => DataType::SmallInt,
        _ => return,
    };

    column.data_type = mapped;
    column.not_null = true;
    if column.default.is_none() {
        let sequence = implicit_sequence_name(table_name, &column.name.value);
        column.default = Some(Expr::Function {
            name: "nextval".to_string(),
            args: vec![Expr::Cast {
                expr: Box::new(Expr::Literal(Literal::String(sequence))),
                data_type: DataType::Custom("regclass".to_string()),
            }],
        });
    }
}

fn implicit_sequence_name(table: &QualifiedName, column: &str) -> String {
    match &table.schema {
        Some(schema) if !schema.value.eq_ignore_ascii_case(DEFAULT_SCHEMA) => {
            format!("{}.{}_{}_seq", schema.value, table.name.value, column)
        }
        _ => format!("{}_{}_seq", table.name.value, column),
    }
}

pub(crate) fn normalize_data_type(data_type: &mut DataType) {
    match data_type {
        DataType::Array(inner) => normalize_data_type(inner.as_mut()),
        DataType::Custom(custom) => {
            let canonical = canonical_custom(custom);
            *data_type = match alias_to_data_type(&canonical) {
                Some(alias) => alias,
                None => DataType::Custom(canonical),
            };
        }
        _ => {}
    }
}

fn alias_to_data_type(base: &str) -> Option<DataType> {
    match base {
        "bool" | "boolean" => Some(DataType::Boolean),
        "int2" | "smallint" => Some(DataType::SmallInt),
        "int" | "int4" | "integer" => Some(DataType::Integer),
        "int8" | "bigint" => Some(DataType::BigInt),
        "float4" | "real" => Some(DataType::Real),
        "float8" | "double" | "double precision" => Some(DataType::DoublePrecision),
        "numeric" | "decimal" => Some(DataType::Numeric {
            precision: None,
            scale: None,
        }),
        "text" => Some(DataType::Text),
        "varchar" | "character varying" => Some(DataType::Varchar { length: None }),
        "bpchar" | "char" | "character" => Some(DataType::Char { length: None }),
        "bytea" => Some(DataType::Blob),
        "date" => Some(DataType::Date),
        "time" | "time without time zone" => Some(DataType::Time {
            precision: None,
            with_timezone: false,
        }),
        "timetz" | "time with time zone" => Some(DataType::Time {
            precision: None,
            with_timezone: true,
        }),
        "timestamp" | "timestamp without time zone" => Some(DataType::Timestamp {
            precision: None,
            with_timezone: false,
        }),
        "timestamptz" | "timestamp with time zone" => Some(DataType::Timestamp {
            precision: None,
            with_timezone: true,
        }),
        "json" => Some(DataType::Json),
        "jsonb" => Some(DataType::Jsonb),
        "uuid" => Some(DataType::Uuid),
        _ => None,
    }
}

/// Custom type names fold to lowercase with collapsed spacing, and a
/// leading default-schema qualifier is dropped so `public.color` and
/// `color` name the same type.
fn canonical_custom(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let segments: Vec<String> = split_qualified_segments(trimmed)
        .into_iter()
        .map(|segment| normalize_segment(&segment))
        .collect();

    match segments.as_slice() {
        [schema, rest @ ..] if schema == DEFAULT_SCHEMA && !rest.is_empty() => rest.join("."),
        _ => segments.join("."),
    }
}

fn split_qualified_segments(input: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_double_quote = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_double_quote = !in_double_quote;
                current.push(ch);
            }
            '.' if !in_double_quote => {
                segments.push(current);
                current = String::new();
            }
            _ => current.push(ch),
        }
    }

    segments.push(current);
    segments
}

fn normalize_segment(segment: &str) -> String {
    let trimmed = segment.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_ascii_lowercase()
    } else {
        collapse_spaces(trimmed).to_ascii_lowercase()
    }
}

fn collapse_spaces(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_default_schema(name: &mut QualifiedName) {
    if let Some(schema) = &name.schema
        && schema.key() == declsql_core::Ident::unquoted(DEFAULT_SCHEMA).key()
    {
        name.schema = None;
    }
}

// --- expression normalization ---

pub(crate) fn normalize_expr(expr: &mut Expr) {
    normalize_children(expr);
    rewrite_expr(expr);
}

fn normalize_children(expr: &mut Expr) {
    match expr {
        Expr::Literal(_) | Expr::Ident(_) | Expr::QualifiedIdent { .. } | Expr::Null => {}
        Expr::Raw(raw) => *raw = raw.trim().to_string(),
        Expr::BinaryOp { left, right, .. } => {
            normalize_expr(left);
            normalize_expr(right);
        }
        Expr::UnaryOp { expr, .. } => normalize_expr(expr),
        Expr::Comparison { left, right, .. } => {
            normalize_expr(left);
            normalize_expr(right);
        }
        Expr::And(left, right) | Expr::Or(left, right) => {
            normalize_expr(left);
            normalize_expr(right);
        }
        Expr::Not(inner) | Expr::Paren(inner) => normalize_expr(inner),
        Expr::Is { expr, .. } => normalize_expr(expr),
        Expr::Between {
            expr, low, high, ..
        } => {
            normalize_expr(expr);
            normalize_expr(low);
            normalize_expr(high);
        }
        Expr::In { expr, list, .. } => {
            normalize_expr(expr);
            for item in list {
                normalize_expr(item);
            }
        }
        Expr::Tuple(items) | Expr::ArrayConstructor(items) => {
            for item in items {
                normalize_expr(item);
            }
        }
        Expr::Function { args, .. } => {
            for arg in args {
                normalize_expr(arg);
            }
        }
        Expr::Cast { expr, .. } => normalize_expr(expr),
        Expr::Collate { expr, .. } => normalize_expr(expr),
        Expr::Interval { value, .. } => normalize_expr(value),
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            if let Some(operand) = operand {
                normalize_expr(operand);
            }
            for (when_expr, then_expr) in when_clauses {
                normalize_expr(when_expr);
                normalize_expr(then_expr);
            }
            if let Some(else_expr) = else_clause {
                normalize_expr(else_expr);
            }
        }
        Expr::Subquery(subquery) | Expr::Exists(subquery) => {
            subquery.sql = normalize_query_text(&subquery.sql);
        }
    }
}

fn rewrite_expr(expr: &mut Expr) {
    // Column references drop their table qualifier: it resolves
    // ambiguity, it is not identity.
    if let Expr::QualifiedIdent { name, .. } = expr {
        *expr = Expr::Ident(name.clone());
        return;
    }

    if let Expr::Function { name, .. } = expr {
        *name = name.to_ascii_lowercase();
    }

    // `+n` / `-n` on numeric literals folds into the literal.
    if let Expr::UnaryOp { op, expr: inner } = expr {
        let folded = match (&op, inner.as_ref()) {
            (UnaryOperator::Minus, Expr::Literal(Literal::Integer(value))) => {
                Some(Expr::Literal(Literal::Integer(-value)))
            }
            (UnaryOperator::Plus, Expr::Literal(Literal::Integer(value))) => {
                Some(Expr::Literal(Literal::Integer(*value)))
            }
            (UnaryOperator::Minus, Expr::Literal(Literal::Float(value))) => {
                Some(Expr::Literal(Literal::Float(-value)))
            }
            (UnaryOperator::Plus, Expr::Literal(Literal::Float(value))) => {
                Some(Expr::Literal(Literal::Float(*value)))
            }
            _ => None,
        };
        if let Some(folded) = folded {
            *expr = folded;
            return;
        }
    }

    // Parentheses carry no meaning once grouping lives in the tree; the
    // renderer re-inserts them from structure. Dropping them all makes
    // the catalog's over-parenthesized deparser output compare equal.
    if let Expr::Paren(inner) = expr {
        *expr = (**inner).clone();
        rewrite_expr(expr);
        return;
    }

    if let Expr::Cast { .. } = expr {
        rewrite_cast(expr);
        return;
    }

    // `IN (…)` is `= ANY(ARRAY[…])`; `NOT IN (…)` is `<> ALL(ARRAY[…])`.
    if let Expr::In {
        expr: operand,
        list,
        negated,
    } = expr
        && !matches!(list.as_slice(), [Expr::Subquery(_)])
    {
        let array = Expr::ArrayConstructor(std::mem::take(list));
        *expr = Expr::Comparison {
            left: operand.clone(),
            op: if *negated {
                declsql_core::ComparisonOp::NotEqual
            } else {
                declsql_core::ComparisonOp::Equal
            },
            right: Box::new(array),
            quantifier: Some(if *negated {
                SetQuantifier::All
            } else {
                SetQuantifier::Any
            }),
        };
        return;
    }

    // `CASE … ELSE NULL END` means the same without the ELSE branch.
    if let Expr::Case { else_clause, .. } = expr
        && matches!(else_clause.as_deref(), Some(Expr::Null))
    {
        *else_clause = None;
    }
}

fn rewrite_cast(expr: &mut Expr) {
    let Expr::Cast {
        expr: inner,
        data_type,
    } = expr
    else {
        return;
    };
    normalize_data_type(data_type);

    // `(e::t1)::t2` collapses to `e::t2`; an intermediate float cast
    // between two casts is likewise elided.
    if let Expr::Cast {
        expr: innermost, ..
    } = inner.as_mut()
    {
        let innermost = std::mem::replace(innermost.as_mut(), Expr::Null);
        *inner = Box::new(innermost);
    }

    // A cast is redundant when the literal already carries the type.
    let redundant = match (inner.as_ref(), &data_type) {
        (Expr::Literal(Literal::String(_)), DataType::Text) => true,
        (Expr::Literal(Literal::String(_)), DataType::Date) => true,
        (
            Expr::Literal(Literal::Integer(_)),
            DataType::Integer | DataType::BigInt | DataType::SmallInt,
        ) => true,
        (Expr::Literal(Literal::Float(_)), DataType::Real | DataType::DoublePrecision) => true,
        (Expr::Literal(Literal::Boolean(_)), DataType::Boolean) => true,
        _ => false,
    };
    if redundant {
        let unwrapped = std::mem::replace(inner.as_mut(), Expr::Null);
        *expr = unwrapped;
    }
}

/// View bodies and subqueries are compared as text: fold case outside
/// quoted regions, collapse whitespace, and drop a trailing semicolon.
pub(crate) fn normalize_query_text(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut pending_space = false;

    let mut chars = query.trim().trim_end_matches(';').trim_end().chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' && !in_double_quote {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
            if in_single_quote {
                if chars.peek() == Some(&'\'') {
                    out.push('\'');
                    chars.next();
                } else {
                    in_single_quote = false;
                }
            } else {
                in_single_quote = true;
            }
            continue;
        }
        if ch == '"' && !in_single_quote {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
            in_double_quote = !in_double_quote;
            continue;
        }

        if in_single_quote || in_double_quote {
            out.push(ch);
            continue;
        }

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch.to_ascii_lowercase());
    }

    out
}

/// Textual pre-normalization for check-constraint strings returned by the
/// catalog, applied before they reach the expression parser.
pub(crate) fn pre_normalize_check_text(raw: &str) -> String {
    let mut text = raw.replace("::text", "");
    text = replace_word_outside_quotes(&text, "AND", "and");
    text = replace_word_outside_quotes(&text, "OR", "or");
    text.replace("ANY (", "ANY(")
}

fn replace_word_outside_quotes(input: &str, from: &str, to: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_single_quote = false;
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut String| {
        if word == from {
            out.push_str(to);
        } else {
            out.push_str(word);
        }
        word.clear();
    };

    for ch in input.chars() {
        if ch == '\'' {
            flush(&mut word, &mut out);
            in_single_quote = !in_single_quote;
            out.push(ch);
            continue;
        }
        if in_single_quote {
            out.push(ch);
            continue;
        }
        if ch.is_alphanumeric() || ch == '_' {
            word.push(ch);
        } else {
            flush(&mut word, &mut out);
            out.push(ch);
        }
    }
    flush(&mut word, &mut out);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use declsql_core::ComparisonOp;

    fn normalized(mut expr: Expr) -> Expr {
        normalize_expr(&mut expr);
        expr
    }

    #[test]
    fn normalization_is_idempotent() {
        let exprs = vec![
            Expr::Paren(Box::new(Expr::Paren(Box::new(Expr::Ident(
                declsql_core::Ident::unquoted("x"),
            ))))),
            Expr::In {
                expr: Box::new(Expr::Ident(declsql_core::Ident::unquoted("status"))),
                list: vec![
                    Expr::Literal(Literal::String("a".to_string())),
                    Expr::Literal(Literal::String("b".to_string())),
                ],
                negated: false,
            },
            Expr::Cast {
                expr: Box::new(Expr::Literal(Literal::String("x".to_string()))),
                data_type: DataType::Text,
            },
            Expr::QualifiedIdent {
                qualifier: declsql_core::Ident::unquoted("t"),
                name: declsql_core::Ident::unquoted("c"),
            },
        ];

        for expr in exprs {
            let once = normalized(expr.clone());
            let twice = normalized(once.clone());
            assert_eq!(once, twice, "normalize must be idempotent for {expr:?}");
        }
    }

    #[test]
    fn in_list_rewrites_to_any_array() {
        let expr = normalized(Expr::In {
            expr: Box::new(Expr::Ident(declsql_core::Ident::unquoted("status"))),
            list: vec![Expr::Literal(Literal::String("a".to_string()))],
            negated: false,
        });

        let Expr::Comparison {
            op: ComparisonOp::Equal,
            quantifier: Some(declsql_core::SetQuantifier::Any),
            right,
            ..
        } = expr
        else {
            panic!("expected = ANY(...) rewrite");
        };
        assert!(matches!(*right, Expr::ArrayConstructor(_)));
    }

    #[test]
    fn not_in_rewrites_to_all() {
        let expr = normalized(Expr::In {
            expr: Box::new(Expr::Ident(declsql_core::Ident::unquoted("status"))),
            list: vec![Expr::Literal(Literal::String("a".to_string()))],
            negated: true,
        });
        assert!(matches!(
            expr,
            Expr::Comparison {
                op: ComparisonOp::NotEqual,
                quantifier: Some(declsql_core::SetQuantifier::All),
                ..
            }
        ));
    }

    #[test]
    fn redundant_casts_are_dropped() {
        let text_cast = normalized(Expr::Cast {
            expr: Box::new(Expr::Literal(Literal::String("x".to_string()))),
            data_type: DataType::Text,
        });
        assert_eq!(text_cast, Expr::Literal(Literal::String("x".to_string())));

        let date_cast = normalized(Expr::Cast {
            expr: Box::new(Expr::Literal(Literal::String("2022-01-01".to_string()))),
            data_type: DataType::Date,
        });
        assert_eq!(
            date_cast,
            Expr::Literal(Literal::String("2022-01-01".to_string()))
        );

        let int_cast = normalized(Expr::Cast {
            expr: Box::new(Expr::Literal(Literal::Integer(123))),
            data_type: DataType::Integer,
        });
        assert_eq!(int_cast, Expr::Literal(Literal::Integer(123)));
    }

    #[test]
    fn nested_casts_collapse_to_the_outer_type() {
        let expr = normalized(Expr::Cast {
            expr: Box::new(Expr::Cast {
                expr: Box::new(Expr::Ident(declsql_core::Ident::unquoted("v"))),
                data_type: DataType::DoublePrecision,
            }),
            data_type: DataType::Numeric {
                precision: None,
                scale: None,
            },
        });

        assert_eq!(
            expr,
            Expr::Cast {
                expr: Box::new(Expr::Ident(declsql_core::Ident::unquoted("v"))),
                data_type: DataType::Numeric {
                    precision: None,
                    scale: None,
                },
            }
        );
    }

    #[test]
    fn case_else_null_drops_the_else_branch() {
        let expr = normalized(Expr::Case {
            operand: None,
            when_clauses: vec![(
                Expr::Ident(declsql_core::Ident::unquoted("a")),
                Expr::Literal(Literal::Integer(1)),
            )],
            else_clause: Some(Box::new(Expr::Null)),
        });
        let Expr::Case { else_clause, .. } = expr else {
            panic!("expected CASE");
        };
        assert!(else_clause.is_none());
    }

    #[test]
    fn function_names_fold_to_lowercase() {
        let expr = normalized(Expr::Function {
            name: "COALESCE".to_string(),
            args: vec![Expr::Null],
        });
        assert!(matches!(expr, Expr::Function { name, .. } if name == "coalesce"));
    }

    #[test]
    fn column_qualifiers_are_dropped() {
        let expr = normalized(Expr::QualifiedIdent {
            qualifier: declsql_core::Ident::unquoted("t"),
            name: declsql_core::Ident::unquoted("c"),
        });
        assert_eq!(expr, Expr::Ident(declsql_core::Ident::unquoted("c")));
    }

    #[test]
    fn check_text_pre_normalization() {
        assert_eq!(
            pre_normalize_check_text("CHECK ((status = ANY (ARRAY['a'::text, 'b'::text])))"),
            "CHECK ((status = ANY(ARRAY['a', 'b'])))"
        );
        assert_eq!(
            pre_normalize_check_text("CHECK ((a > 0) AND (b > 0) OR (c > 0))"),
            "CHECK ((a > 0) and (b > 0) or (c > 0))"
        );
    }

    #[test]
    fn query_text_folds_case_outside_quotes() {
        assert_eq!(
            normalize_query_text(" SELECT Id, 'Mixed Case' FROM \"Users\" ; "),
            "select id, 'Mixed Case' from \"Users\""
        );
    }
}
