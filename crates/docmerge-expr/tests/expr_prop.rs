use docmerge_expr::{evaluate, evaluate_str, parse, Row, Value};
use proptest::prelude::*;

fn arb_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Blank),
        (-1.0e6..1.0e6f64).prop_map(Value::Number),
        "[a-z]{0,6}".prop_map(Value::Text),
        (-999i32..999).prop_map(|n| Value::Text(n.to_string())),
        any::<bool>().prop_map(Value::Boolean),
    ]
}

proptest! {
    #[test]
    fn numeric_literals_round_trip(n in prop_oneof![
        -1.0e12..1.0e12f64,
        (-1_000_000i64..1_000_000).prop_map(|n| n as f64),
        Just(0.0),
    ]) {
        let source = n.to_string();
        let value = evaluate_str(&source, &Row::new()).unwrap();
        prop_assert_eq!(value, Value::Number(n));
    }

    #[test]
    fn precedence_matches_integer_arithmetic(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        let source = format!("{a} + {b} * {c} - ({a} - {b}) * {c}");
        let value = evaluate_str(&source, &Row::new()).unwrap();
        let expected = (a + b * c - (a - b) * c) as f64;
        prop_assert_eq!(value, Value::Number(expected));
    }

    #[test]
    fn evaluation_is_deterministic(a in arb_cell(), b in arb_cell()) {
        let row = Row::new().with("a", a).with("b", b);
        for source in [
            "{{a}} + {{b}}",
            "concat({{a}}, {{b}})",
            "if({{a}}, {{b}}, {{a}})",
            "{{a}} == {{b}}",
            "ifempty({{a}}, {{b}})",
        ] {
            let expr = parse(source).unwrap();
            let first = evaluate(&expr, &row);
            let second = evaluate(&expr, &row);
            match (first, second) {
                (Ok(Value::Number(x)), Ok(Value::Number(y))) => prop_assert_eq!(x.to_bits(), y.to_bits()),
                (first, second) => prop_assert_eq!(first, second),
            }
        }
    }

    #[test]
    fn concat_never_fails(a in arb_cell(), b in arb_cell()) {
        let row = Row::new().with("a", a.clone()).with("b", b.clone());
        let value = evaluate_str("concat({{a}}, {{b}})", &row).unwrap();
        prop_assert_eq!(value, Value::Text(format!("{a}{b}")));
    }
}
