use serde_json::Value;

use super::loose_scalar_eq;

/// Performs a deep equality check with loose scalar comparison at the leaves.
///
/// Object key order never matters. Array order does: two arrays are equal
/// only when they have the same length and are pairwise equal.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use ssa_drift_util::loose_deep_equal;
///
/// let a = json!({"replicas": 3, "ports": [{"port": 80}]});
/// let b = json!({"ports": [{"port": "80"}], "replicas": "3"});
/// let c = json!({"replicas": 4, "ports": [{"port": 80}]});
///
/// assert!(loose_deep_equal(&a, &b));
/// assert!(!loose_deep_equal(&a, &c));
/// ```
pub fn loose_deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            if arr_a.len() != arr_b.len() {
                return false;
            }
            arr_a
                .iter()
                .zip(arr_b.iter())
                .all(|(x, y)| loose_deep_equal(x, y))
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            for (key, val_a) in obj_a {
                match obj_b.get(key) {
                    Some(val_b) => {
                        if !loose_deep_equal(val_a, val_b) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            true
        }

        (Value::Array(_), _) | (_, Value::Array(_)) => false,
        (Value::Object(_), _) | (_, Value::Object(_)) => false,

        _ => loose_scalar_eq(a, b),
    }
}
