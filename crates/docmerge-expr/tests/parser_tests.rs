use docmerge_expr::{
    evaluate_str, extract_placeholders, parse, Expr, Row, SyntaxErrorKind, Value, MAX_NESTING,
};
use pretty_assertions::assert_eq;

fn syntax_kind(expression: &str) -> SyntaxErrorKind {
    match parse(expression) {
        Err(err) => err.kind,
        Ok(expr) => panic!("expected {expression:?} to be rejected, parsed {expr:?}"),
    }
}

#[test]
fn unknown_functions_are_rejected_at_parse_time() {
    let err = parse("foo(1)").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::UnknownFunction);
    assert_eq!(err.offset, 0);
    assert!(err.message.contains("foo"), "{}", err.message);
}

#[test]
fn function_names_are_case_insensitive() {
    assert_eq!(parse("SUM(1, 2)").unwrap(), parse("sum(1, 2)").unwrap());
    assert_eq!(parse("IfEmpty({{a}}, 'x')").unwrap(), parse("ifempty({{a}}, 'x')").unwrap());
}

#[test]
fn zero_argument_calls_are_rejected() {
    assert_eq!(syntax_kind("concat()"), SyntaxErrorKind::MissingArguments);
    assert_eq!(syntax_kind("upper( )"), SyntaxErrorKind::MissingArguments);
}

#[test]
fn unbalanced_parentheses() {
    assert_eq!(syntax_kind("(1 + 2"), SyntaxErrorKind::UnmatchedParen);
    assert_eq!(syntax_kind("sum(1, 2"), SyntaxErrorKind::UnmatchedParen);
    assert_eq!(syntax_kind("1 + 2)"), SyntaxErrorKind::UnmatchedParen);
    assert_eq!(syntax_kind("((1)"), SyntaxErrorKind::UnmatchedParen);
}

#[test]
fn trailing_tokens_after_a_complete_expression() {
    assert_eq!(syntax_kind("1 2"), SyntaxErrorKind::TrailingInput);
    assert_eq!(syntax_kind("{{a}} {{b}}"), SyntaxErrorKind::TrailingInput);
    assert_eq!(syntax_kind("'a' 'b'"), SyntaxErrorKind::TrailingInput);
}

#[test]
fn incomplete_expressions() {
    assert_eq!(syntax_kind(""), SyntaxErrorKind::UnexpectedEnd);
    assert_eq!(syntax_kind("1 +"), SyntaxErrorKind::UnexpectedEnd);
    assert_eq!(syntax_kind("sum(1,)"), SyntaxErrorKind::UnexpectedToken);
    assert_eq!(syntax_kind("* 2"), SyntaxErrorKind::UnexpectedToken);
}

#[test]
fn lexical_errors() {
    assert_eq!(syntax_kind("'abc"), SyntaxErrorKind::UnterminatedString);
    assert_eq!(syntax_kind("{{name"), SyntaxErrorKind::UnterminatedPlaceholder);
    assert_eq!(syntax_kind("{{name}"), SyntaxErrorKind::UnterminatedPlaceholder);
    assert_eq!(syntax_kind("{{  }}"), SyntaxErrorKind::EmptyPlaceholder);
    assert_eq!(syntax_kind("{name}"), SyntaxErrorKind::UnexpectedCharacter);
    assert_eq!(syntax_kind("1 | 2"), SyntaxErrorKind::UnexpectedCharacter);
    assert_eq!(syntax_kind("1 # 2"), SyntaxErrorKind::UnexpectedCharacter);
    assert_eq!(syntax_kind("1.2.3"), SyntaxErrorKind::InvalidNumber);
    assert_eq!(syntax_kind("2e"), SyntaxErrorKind::InvalidNumber);
}

#[test]
fn bare_identifiers_are_not_column_references() {
    let err = parse("price * 2").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::UnknownIdentifier);
    assert!(err.message.contains("{{price}}"), "{}", err.message);
}

#[test]
fn literals() {
    assert_eq!(parse("42").unwrap(), Expr::Literal(Value::Number(42.0)));
    assert_eq!(parse("1.5e3").unwrap(), Expr::Literal(Value::Number(1500.0)));
    assert_eq!(parse(".5").unwrap(), Expr::Literal(Value::Number(0.5)));
    assert_eq!(parse("TRUE").unwrap(), Expr::Literal(Value::Boolean(true)));
    assert_eq!(parse("'it\\'s'").unwrap(), Expr::Literal(Value::from("it's")));
    assert_eq!(parse("\"\"").unwrap(), Expr::Literal(Value::from("")));
}

#[test]
fn placeholders_keep_inner_punctuation() {
    assert_eq!(
        parse("{{Unit Price (USD)}}").unwrap(),
        Expr::ColumnRef("Unit Price (USD)".to_string())
    );
}

#[test]
fn extract_placeholders_keeps_duplicates_in_order() {
    assert_eq!(
        extract_placeholders("concat({{first}}, ' ', {{last}}, {{first}})"),
        vec!["first", "last", "first"]
    );
    assert!(extract_placeholders("no placeholders").is_empty());
}

#[test]
fn deep_nesting_is_a_syntax_error() {
    let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    assert_eq!(syntax_kind(&parens), SyntaxErrorKind::ExpressionTooLong);

    let negated = format!("{}1{}", "-(".repeat(1_000), ")".repeat(1_000));
    assert_eq!(syntax_kind(&negated), SyntaxErrorKind::NestingTooDeep);

    let calls = format!("{}1{}", "abs(".repeat(100), ")".repeat(100));
    assert_eq!(syntax_kind(&calls), SyntaxErrorKind::NestingTooDeep);

    let nots = format!("{}true", "!".repeat(500));
    assert_eq!(syntax_kind(&nots), SyntaxErrorKind::NestingTooDeep);
}

#[test]
fn long_operator_chains_are_bounded_by_tree_depth() {
    let chain = vec!["1"; 2_000].join("+");
    let err = parse(&chain).unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::NestingTooDeep);

    let sum = vec!["{{n}}"; 200].join(" + ");
    let expr = parse(&sum).unwrap();
    assert_eq!(expr.depth(), 200);
}

#[test]
fn moderate_nesting_still_evaluates() {
    let depth = MAX_NESTING / 2;
    let source = format!("{}{{{{n}}}}{}", "-(".repeat(depth / 2), ")".repeat(depth / 2));
    let row = Row::new().with("n", 3.0);
    assert_eq!(evaluate_str(&source, &row).unwrap(), Value::Number(3.0));
}
