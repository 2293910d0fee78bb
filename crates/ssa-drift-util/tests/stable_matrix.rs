use proptest::prelude::*;
use serde_json::{json, Map, Value};
use ssa_drift_util::{loose_deep_equal, stringify};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 ./\"\\\\-]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn reversed_keys(val: &Value) -> Value {
    match val {
        Value::Object(obj) => {
            let mut out = Map::new();
            for (k, v) in obj.iter().rev() {
                out.insert(k.clone(), reversed_keys(v));
            }
            Value::Object(out)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(reversed_keys).collect()),
        other => other.clone(),
    }
}

proptest! {
    #[test]
    fn stringify_parses_back(val in arb_json()) {
        let text = stringify(&val);
        let back: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(back, val);
    }

    #[test]
    fn stringify_ignores_key_insertion_order(val in arb_json()) {
        prop_assert_eq!(stringify(&val), stringify(&reversed_keys(&val)));
    }

    #[test]
    fn loose_deep_equal_is_reflexive(val in arb_json()) {
        prop_assert!(loose_deep_equal(&val, &val));
        prop_assert!(loose_deep_equal(&val, &reversed_keys(&val)));
    }
}

#[test]
fn canonical_form_matrix() {
    let cases = [
        (json!({}), "{}"),
        (json!({"b": [], "a": {}}), r#"{"a":{},"b":[]}"#),
        (json!({"x": "a\nb"}), r#"{"x":"a\nb"}"#),
        (json!([{"z": 1, "y": 2}]), r#"[{"y":2,"z":1}]"#),
    ];
    for (val, expected) in cases {
        assert_eq!(stringify(&val), expected);
    }
}
