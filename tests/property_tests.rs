// tests/property_tests.rs

use bexpr::{Evaluator, Filter, Options, Value, parser};
use proptest::prelude::*;
use serde_json::json;

fn leaf() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "A == 1",
        "A != 2",
        r#"B == "x""#,
        r#"B matches "^x""#,
        "2 in C",
        r#""k" in M"#,
        "C is empty",
        "M is not empty",
        "M.missing == 1",
        "any C as c { c == 3 }",
        "all M as k, v { v != 0 }",
    ])
    .prop_map(String::from)
}

fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| format!("not ({})", e)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({}) and ({})", a, b)),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{} or {}", a, b)),
        ]
    })
}

fn datum() -> impl Strategy<Value = Value> {
    (
        0i64..4,
        prop::sample::select(vec!["x", "y", "xy"]),
        prop::collection::vec(0i64..4, 0..4),
        prop::collection::btree_map(prop::sample::select(vec!["k", "j"]), 0i64..3, 0..3),
    )
        .prop_map(|(a, b, c, m)| Value::from(json!({"A": a, "B": b, "C": c, "M": m})))
}

fn eval(source: &str, datum: &Value) -> bool {
    Evaluator::new(source, Options::default())
        .unwrap()
        .evaluate(datum)
        .unwrap()
}

proptest! {
    #[test]
    fn test_parse_is_deterministic(source in expression()) {
        prop_assert_eq!(parser::parse(&source, 0).unwrap(), parser::parse(&source, 0).unwrap());
    }

    #[test]
    fn test_expression_text_is_preserved(source in expression()) {
        let evaluator = Evaluator::new(&source, Options::default()).unwrap();
        prop_assert_eq!(evaluator.expression(), source.as_str());
    }

    #[test]
    fn test_display_round_trips(source in expression()) {
        let ast = parser::parse(&source, 0).unwrap();
        let rendered = ast.to_string();
        prop_assert_eq!(parser::parse(&rendered, 0).unwrap(), ast);
    }

    #[test]
    fn test_de_morgan(a in expression(), b in expression(), d in datum()) {
        prop_assert_eq!(
            eval(&format!("not (({}) and ({}))", a, b), &d),
            eval(&format!("(not ({})) or (not ({}))", a, b), &d)
        );
        prop_assert_eq!(
            eval(&format!("not (({}) or ({}))", a, b), &d),
            eval(&format!("(not ({})) and (not ({}))", a, b), &d)
        );
    }

    #[test]
    fn test_double_negation(a in expression(), d in datum()) {
        prop_assert_eq!(eval(&format!("not not ({})", a), &d), eval(&a, &d));
    }

    #[test]
    fn test_max_expressions(source in expression()) {
        let count = parser::parse(&source, 0).unwrap().node_count();
        prop_assert!(parser::parse(&source, count).is_ok());
        if count > 1 {
            prop_assert!(parser::parse(&source, count - 1).unwrap_err().is_too_large());
        }
    }

    #[test]
    fn test_filter_is_idempotent(xs in prop::collection::vec(0i64..5, 0..8), x in 0i64..5) {
        let filter = Filter::new(&format!("X != {}", x)).unwrap();
        let data = Value::from(json!(xs.iter().map(|x| json!({"X": x})).collect::<Vec<_>>()));
        let once = filter.execute(&data).unwrap();
        let twice = filter.execute(&once).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.len(), Some(xs.iter().filter(|&&v| v != x).count()));
    }

    #[test]
    fn test_identity_filter(xs in prop::collection::vec(any::<i64>(), 0..8)) {
        let data = Value::from(json!(xs));
        prop_assert_eq!(Filter::new("").unwrap().execute(&data).unwrap(), data);
    }
}
