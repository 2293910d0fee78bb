//! Canonical JSON serialization.
//!
//! Object keys are emitted in sorted order and no whitespace is written, so
//! two trees that differ only in key insertion order serialize to the same
//! bytes. Persisted projections and ownership maps use this form.

use serde_json::Value;

use crate::sort::insertion_sort_by;
use crate::strings::escape;

/// Serialize `val` to a deterministic JSON string with sorted object keys.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use ssa_drift_util::stringify;
///
/// let val = json!({"spec": {"replicas": 3}, "kind": "Deployment"});
/// assert_eq!(stringify(&val), r#"{"kind":"Deployment","spec":{"replicas":3}}"#);
/// ```
pub fn stringify(val: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, val);
    out
}

fn write_value(out: &mut String, val: &Value) {
    match val {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(obj) => {
            let mut keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
            insertion_sort_by(&mut keys, |a, b| a.cmp(b));
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, &obj[*key]);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    out.push_str(&escape(s));
    out.push('"');
}
