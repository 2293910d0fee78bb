use std::borrow::Cow;

use serde_json::Value;

/// Returns the string form of a scalar, or `None` for maps and arrays.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use ssa_drift_util::loose_equal::scalar_string;
///
/// assert_eq!(scalar_string(&json!("app")).as_deref(), Some("app"));
/// assert_eq!(scalar_string(&json!(80)).as_deref(), Some("80"));
/// assert_eq!(scalar_string(&json!(true)).as_deref(), Some("true"));
/// assert_eq!(scalar_string(&json!(null)).as_deref(), Some("null"));
/// assert_eq!(scalar_string(&json!([1])), None);
/// ```
pub fn scalar_string(val: &Value) -> Option<Cow<'_, str>> {
    match val {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("true")),
        Value::Bool(false) => Some(Cow::Borrowed("false")),
        Value::Null => Some(Cow::Borrowed("null")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Compares two scalars by string form, with a numeric fallback.
///
/// Two scalars are equal when their string forms match, or when both read
/// as finite numbers of the same value (`1`, `"1"` and `1.0` are all equal).
/// `null` equals only `null`. A map or an array is never loosely equal to
/// anything; use [`loose_deep_equal`](super::loose_deep_equal) for containers.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use ssa_drift_util::loose_scalar_eq;
///
/// assert!(loose_scalar_eq(&json!(80), &json!("80")));
/// assert!(loose_scalar_eq(&json!(1), &json!(1.0)));
/// assert!(loose_scalar_eq(&json!(true), &json!("true")));
/// assert!(!loose_scalar_eq(&json!("a"), &json!("b")));
/// assert!(!loose_scalar_eq(&json!(null), &json!("null")));
/// assert!(!loose_scalar_eq(&json!({}), &json!({})));
/// ```
pub fn loose_scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => return true,
        (Value::Null, _) | (_, Value::Null) => return false,
        _ => {}
    }
    let (Some(sa), Some(sb)) = (scalar_string(a), scalar_string(b)) else {
        return false;
    };
    if sa == sb {
        return true;
    }
    match (as_finite(&sa), as_finite(&sb)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// A representative of `val`'s class under [`loose_scalar_eq`].
///
/// Two non-null scalars are loosely equal exactly when their keys are equal.
/// Returns `None` for `null`, maps and arrays.
///
/// ```
/// use serde_json::json;
/// use ssa_drift_util::loose_scalar_key;
///
/// assert_eq!(loose_scalar_key(&json!(8080)), loose_scalar_key(&json!("8080")));
/// assert_eq!(loose_scalar_key(&json!("1.0")), loose_scalar_key(&json!(1)));
/// assert_ne!(loose_scalar_key(&json!("app")), loose_scalar_key(&json!("App")));
/// assert_eq!(loose_scalar_key(&json!(null)), None);
/// ```
pub fn loose_scalar_key(val: &Value) -> Option<String> {
    if val.is_null() {
        return None;
    }
    let text = scalar_string(val)?;
    Some(match as_finite(&text) {
        Some(n) if n == 0.0 => "#0".to_string(),
        Some(n) => format!("#{n}"),
        None => format!("'{text}"),
    })
}

fn as_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}
