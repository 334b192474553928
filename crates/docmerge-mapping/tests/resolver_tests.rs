use docmerge_expr::{EvalError, EvalWarning, SyntaxErrorKind};
use docmerge_mapping::{
    resolve, ConfigError, MappingRule, ResolverOptions, Resolver, RowError, Row, Value,
};
use pretty_assertions::assert_eq;

fn order_row() -> Row {
    Row::new()
        .with("Name", "Ada Lovelace")
        .with("price", 12.5)
        .with("qty", 4.0)
        .with("discount", 0.0)
        .with("note", Value::Blank)
}

#[test]
fn fields_come_back_in_rule_order() {
    let rules = vec![
        MappingRule::formula("total", "round({{price}} * {{qty}}, 2)"),
        MappingRule::direct("customer", "Name"),
        MappingRule::formula("size", r#"if({{qty}} > 3, "bulk", "single")"#),
    ];
    let row = resolve(&rules, &order_row()).unwrap();
    assert_eq!(
        row.iter_text().collect::<Vec<_>>(),
        vec![
            ("total", "50"),
            ("customer", "Ada Lovelace"),
            ("size", "bulk")
        ]
    );
    assert!(!row.has_failures());
}

#[test]
fn one_failing_rule_does_not_block_its_siblings() {
    let rules = vec![
        MappingRule::direct("customer", "Name"),
        MappingRule::formula("unit_ratio", "{{price}} / {{discount}}"),
        MappingRule::formula("broken", "concat({{Name}}"),
        MappingRule::formula("total", "{{price}} * {{qty}}"),
    ];
    let row = resolve(&rules, &order_row()).unwrap();

    assert_eq!(row.text("customer"), Some("Ada Lovelace"));
    assert_eq!(row.text("total"), Some("50"));

    let ratio = row.get("unit_ratio").unwrap();
    assert!(ratio.is_failed());
    assert_eq!(ratio.text, "");
    assert_eq!(ratio.value, None);
    assert_eq!(
        ratio.error.as_ref().and_then(|e| e.as_eval()),
        Some(&EvalError::DivisionByZero)
    );

    let broken = row.get("broken").unwrap();
    assert_eq!(
        broken.error.as_ref().and_then(|e| e.as_syntax()).map(|e| e.kind),
        Some(SyntaxErrorKind::UnmatchedParen)
    );

    let failed: Vec<&str> = row.failures().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["unit_ratio", "broken"]);
}

#[test]
fn duplicate_output_names_are_a_configuration_error() {
    let err = Resolver::new([
        MappingRule::direct("name", "Name"),
        MappingRule::formula("name", "upper({{Name}})"),
    ])
    .unwrap_err();
    assert_eq!(err, ConfigError::DuplicateName("name".to_string()));
}

#[test]
fn empty_names_and_sources_are_configuration_errors() {
    let err = Resolver::new([
        MappingRule::direct("a", "A"),
        MappingRule::direct("  ", "B"),
    ])
    .unwrap_err();
    assert_eq!(err, ConfigError::EmptyName { position: 2 });

    let err = Resolver::new([MappingRule::direct("a", "")]).unwrap_err();
    assert_eq!(err, ConfigError::EmptySource("a".to_string()));
}

#[test]
fn unparseable_formulas_are_reported_per_rule_not_per_config() {
    let resolver = Resolver::new([
        MappingRule::formula("a", "vlookup({{x}})"),
        MappingRule::direct("b", "x"),
    ])
    .unwrap();
    let errors: Vec<_> = resolver
        .syntax_errors()
        .map(|(name, err)| (name, err.kind))
        .collect();
    assert_eq!(errors, vec![("a", SyntaxErrorKind::UnknownFunction)]);

    let row = resolver
        .resolve_row(1, &Row::new().with("x", "hello"))
        .unwrap();
    assert!(row.get("a").unwrap().is_failed());
    assert_eq!(row.text("b"), Some("hello"));
}

#[test]
fn direct_rules_stringify_with_the_number_format() {
    let row = Row::new()
        .with("whole", 1500.0)
        .with("fraction", 0.1 + 0.2)
        .with("flag", true)
        .with("blank", Value::Blank);
    let rules = vec![
        MappingRule::direct("whole", "whole"),
        MappingRule::direct("fraction", "fraction"),
        MappingRule::direct("flag", "flag"),
        MappingRule::direct("blank", "blank"),
    ];
    let resolved = resolve(&rules, &row).unwrap();
    assert_eq!(
        resolved.iter_text().collect::<Vec<_>>(),
        vec![
            ("whole", "1500"),
            ("fraction", "0.3"),
            ("flag", "TRUE"),
            ("blank", "")
        ]
    );
}

#[test]
fn blank_default_is_applied_after_evaluation() {
    let rules = vec![
        MappingRule::direct("note", "note").with_default("n/a"),
        // The blank note is still 0 inside the arithmetic; only the final result is defaulted.
        MappingRule::formula("bumped", "{{note}} + 1").with_default("n/a"),
        MappingRule::formula("empty_text", "concat({{note}}, '')").with_default("-"),
    ];
    let row = resolve(&rules, &order_row()).unwrap();
    assert_eq!(row.text("note"), Some("n/a"));
    assert_eq!(row.get("note").unwrap().value, Some(Value::Blank));
    assert_eq!(row.text("bumped"), Some("1"));
    assert_eq!(row.text("empty_text"), Some("-"));
}

#[test]
fn error_text_prefers_the_rule_then_the_resolver_placeholder() {
    let options = ResolverOptions {
        error_placeholder: "#ERROR".to_string(),
        ..ResolverOptions::default()
    };
    let resolver = Resolver::with_options(
        [
            MappingRule::formula("a", "1 / 0"),
            MappingRule::formula("b", "1 / 0").with_error_text("infinite"),
        ],
        options,
    )
    .unwrap();
    let row = resolver.resolve_row(1, &Row::new()).unwrap();
    assert_eq!(row.text("a"), Some("#ERROR"));
    assert_eq!(row.text("b"), Some("infinite"));
}

#[test]
fn header_case_mismatch_resolves_with_a_warning() {
    let rules = vec![MappingRule::direct("customer", "name")];
    let row = resolve(&rules, &order_row()).unwrap();
    let field = row.get("customer").unwrap();
    assert!(field.is_ok());
    assert_eq!(field.text, "Ada Lovelace");
    assert_eq!(
        field.warnings,
        vec![EvalWarning::CaseInsensitiveMatch {
            requested: "name".to_string(),
            matched: "Name".to_string(),
        }]
    );
}

#[test]
fn lenient_mode_treats_missing_columns_as_blank() {
    let rules = vec![MappingRule::formula("x", "concat('<', {{missing}}, '>')")];
    let row = resolve(&rules, &order_row()).unwrap();
    let field = row.get("x").unwrap();
    assert_eq!(field.text, "<>");
    assert_eq!(
        field.warnings,
        vec![EvalWarning::MissingColumn {
            column: "missing".to_string()
        }]
    );
}

#[test]
fn strict_mode_fails_the_row_when_columns_are_missing() {
    let options = ResolverOptions {
        strict_columns: true,
        ..ResolverOptions::default()
    };
    let resolver = Resolver::with_options(
        [
            MappingRule::direct("customer", "name"),
            MappingRule::formula("total", "{{price}} * {{quantity}} + {{shipping}}"),
            MappingRule::formula("file", "concat('doc_', {{_index}})"),
        ],
        options,
    )
    .unwrap();

    let err = resolver.resolve_row(3, &order_row()).unwrap_err();
    assert_eq!(
        err,
        RowError::MissingColumns {
            columns: vec!["quantity".to_string(), "shipping".to_string()]
        }
    );

    let complete = order_row().with("quantity", 2.0).with("shipping", 5.0);
    let row = resolver.resolve_row(3, &complete).unwrap();
    assert_eq!(row.text("total"), Some("30"));
    assert_eq!(row.text("file"), Some("doc_3"));
}

#[test]
fn index_overrides_a_real_column_of_the_same_name() {
    let resolver = Resolver::new([MappingRule::direct("n", "_index")]).unwrap();
    let row = resolver
        .resolve_row(9, &Row::new().with("_index", "spreadsheet"))
        .unwrap();
    assert_eq!(row.text("n"), Some("9"));
    assert_eq!(row.index, 9);
}

#[test]
fn a_pathologically_nested_formula_only_fails_its_own_field() {
    let nested = format!("{}{{{{price}}}}{}", "-(".repeat(2_000), ")".repeat(2_000));
    let rules = vec![
        MappingRule::formula("deep", nested),
        MappingRule::direct("customer", "Name"),
    ];
    let row = resolve(&rules, &order_row()).unwrap();

    let deep = row.get("deep").unwrap();
    assert_eq!(
        deep.error.as_ref().and_then(|e| e.as_syntax()).map(|e| e.kind),
        Some(SyntaxErrorKind::NestingTooDeep)
    );
    assert_eq!(row.text("customer"), Some("Ada Lovelace"));
}
