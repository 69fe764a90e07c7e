use declsql_core::{
    BinaryOperator, ComparisonOp, DataType, Expr, Ident, IsTest, Literal, SetQuantifier,
};
use declsql_parser::{ParserMode, parse_check_body, parse_expression};

fn parse(text: &str) -> Expr {
    parse_expression(text, ParserMode::Postgres).expect("expression should parse")
}

#[test]
fn and_binds_tighter_than_or() {
    let expr = parse("a OR b AND c");
    let Expr::Or(left, right) = expr else {
        panic!("expected OR at the top");
    };
    assert_eq!(*left, Expr::Ident(Ident::unquoted("a")));
    assert!(matches!(*right, Expr::And(..)));
}

#[test]
fn comparison_with_arithmetic_operands() {
    let expr = parse("price * 2 > 10");
    let Expr::Comparison {
        left,
        op: ComparisonOp::GreaterThan,
        right,
        quantifier: None,
    } = expr
    else {
        panic!("expected comparison");
    };
    assert!(matches!(
        *left,
        Expr::BinaryOp {
            op: BinaryOperator::Multiply,
            ..
        }
    ));
    assert_eq!(*right, Expr::Literal(Literal::Integer(10)));
}

#[test]
fn tilde_tilde_parses_as_like() {
    let symbolic = parse("name ~~ 'a%'");
    let spelled = parse("name LIKE 'a%'");
    assert_eq!(symbolic, spelled);

    let negated_symbolic = parse("name !~~* 'a%'");
    let negated_spelled = parse("name NOT ILIKE 'a%'");
    assert_eq!(negated_symbolic, negated_spelled);
}

#[test]
fn any_quantifier_over_array() {
    let expr = parse("status = ANY(ARRAY['active', 'pending'])");
    let Expr::Comparison {
        quantifier: Some(SetQuantifier::Any),
        right,
        ..
    } = expr
    else {
        panic!("expected quantified comparison");
    };
    assert!(matches!(*right, Expr::ArrayConstructor(_)));
}

#[test]
fn in_list_keeps_both_shape_and_negation() {
    let expr = parse("status IN ('a', 'b')");
    assert!(matches!(
        expr,
        Expr::In {
            negated: false,
            ..
        }
    ));

    let expr = parse("status NOT IN ('a', 'b')");
    assert!(matches!(expr, Expr::In { negated: true, .. }));
}

#[test]
fn between_and_is_tests() {
    let expr = parse("qty BETWEEN 1 AND 10");
    assert!(matches!(expr, Expr::Between { negated: false, .. }));

    let expr = parse("deleted_at IS NOT NULL");
    assert!(matches!(
        expr,
        Expr::Is {
            test: IsTest::NotNull,
            ..
        }
    ));
}

#[test]
fn postfix_cast_chain() {
    let expr = parse("'5'::text::integer");
    let Expr::Cast {
        expr: inner,
        data_type: DataType::Integer,
    } = expr
    else {
        panic!("expected outer cast to integer");
    };
    assert!(matches!(
        *inner,
        Expr::Cast {
            data_type: DataType::Text,
            ..
        }
    ));
}

#[test]
fn cast_function_call_and_case() {
    let expr = parse("CAST(qty AS bigint)");
    assert!(matches!(
        expr,
        Expr::Cast {
            data_type: DataType::BigInt,
            ..
        }
    ));

    let expr = parse("coalesce(a, 0)");
    let Expr::Function { name, args } = expr else {
        panic!("expected function call");
    };
    assert_eq!(name, "coalesce");
    assert_eq!(args.len(), 2);

    let expr = parse("CASE WHEN a THEN 1 ELSE 2 END");
    assert!(matches!(expr, Expr::Case { .. }));
}

#[test]
fn negative_literal_folds_at_parse_time() {
    assert_eq!(parse("-5"), Expr::Literal(Literal::Integer(-5)));
    assert_eq!(parse("+5"), Expr::Literal(Literal::Integer(5)));
}

#[test]
fn qualified_column_reference() {
    let expr = parse("users.id");
    assert!(matches!(expr, Expr::QualifiedIdent { .. }));
}

#[test]
fn exists_captures_subquery_text() {
    let expr = parse("EXISTS (SELECT 1 FROM other)");
    let Expr::Exists(subquery) = expr else {
        panic!("expected EXISTS");
    };
    assert_eq!(subquery.sql, "SELECT 1 FROM other");
}

#[test]
fn check_body_strips_keyword_and_parens() {
    let from_body = parse_check_body("CHECK (qty > 0)", ParserMode::Postgres)
        .expect("check body should parse");
    let direct = parse("(qty > 0)");
    assert_eq!(from_body, direct);
}

#[test]
fn interval_literal_with_unit() {
    let expr = parse("interval '1 day'");
    assert!(matches!(expr, Expr::Interval { unit: None, .. }));

    let expr = parse("interval '1' hour");
    let Expr::Interval { unit, .. } = expr else {
        panic!("expected interval");
    };
    assert_eq!(unit.as_deref(), Some("hour"));
}

#[test]
fn json_access_operators() {
    let expr = parse("payload ->> 'kind'");
    assert!(matches!(
        expr,
        Expr::BinaryOp {
            op: BinaryOperator::JsonGetText,
            ..
        }
    ));
}
