//! Properties of the sanitized output.

use proptest::prelude::*;
use shape_validation::{
    Environment, Map, SchemaNode, ValidationOptions, Value, validate, validate_named,
};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Absent),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1.0e6..1.0e6f64).prop_map(Value::Number),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::Text),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::vec(("[a-d]", inner), 0..4)
                .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
        ]
    })
}

/// Accepts every finite value: `anything = unit | bool | number | text | [anything] | {anything}`
fn anything() -> Environment {
    let node = [
        SchemaNode::Bool,
        SchemaNode::number(),
        SchemaNode::Text,
        SchemaNode::list(SchemaNode::reference("anything")),
        SchemaNode::dict(SchemaNode::reference("anything")),
    ]
    .into_iter()
    .fold(SchemaNode::Unit, |acc, next| SchemaNode::union(acc, next));
    [("anything", node)].into_iter().collect()
}

fn record() -> SchemaNode {
    SchemaNode::object([
        ("a", SchemaNode::maybe(SchemaNode::integer())),
        ("b", SchemaNode::maybe(SchemaNode::Text)),
    ])
}

proptest! {
    #[test]
    fn sanitized_output_revalidates_to_itself(value in arb_value()) {
        let env = anything();
        let options = ValidationOptions::default();
        let out = validate_named(&value, "anything", &env, &options);
        prop_assert!(out.is_ok(), "{:?}", out);

        let out = out.unwrap();
        prop_assert_eq!(validate_named(&out, "anything", &env, &options), Ok(out.clone()));
    }

    #[test]
    fn object_output_revalidates_to_itself(value in arb_value()) {
        let env = Environment::new();
        for options in [
            ValidationOptions::default(),
            ValidationOptions::new().skip_prop_check(true),
        ] {
            if let Ok(out) = validate(&value, &record(), &env, &options) {
                prop_assert_eq!(validate(&out, &record(), &env, &options), Ok(out.clone()));
            }
        }
    }

    #[test]
    fn undeclared_keys_never_survive(value in arb_value()) {
        let env = Environment::new();
        let options = ValidationOptions::new().skip_prop_check(true);
        if let Ok(out) = validate(&value, &record(), &env, &options) {
            let map = out.as_map().unwrap();
            prop_assert!(map.keys().all(|k| k == "a" || k == "b"));
        }
    }

    #[test]
    fn null_never_survives_sanitization(value in arb_value()) {
        fn contains_null(value: &Value) -> bool {
            match value {
                Value::Null => true,
                Value::List(items) => items.iter().any(contains_null),
                Value::Map(map) => map.values().any(contains_null),
                _ => false,
            }
        }
        let out = validate_named(&value, "anything", &anything(), &ValidationOptions::default()).unwrap();
        prop_assert!(!contains_null(&out));
    }
}

#[test]
fn test_absent_properties_are_omitted_from_json() {
    let value = Value::from(serde_json::json!({"a": 3}));
    let out = validate(&value, &record(), &Environment::new(), &ValidationOptions::default()).unwrap();

    // The declared but missing `b` stays in the map as the absence sentinel
    assert_eq!(out.as_map().unwrap().get("b"), Some(&Value::Absent));
    assert_eq!(out.to_json(), serde_json::json!({"a": 3}));
}
