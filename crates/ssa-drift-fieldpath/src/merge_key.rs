//! Merge-key codec.
//!
//! Ownership metadata names list elements with prefixed tokens:
//! `k:{"name":"app"}` selects a map element by its key fields and
//! `v:"foo"` selects a scalar element of a set-like list. This module parses
//! and formats those tokens and locates the elements they name.
//!
//! Everything here is pure; callers are free to memoize parsed tokens.

use serde_json::{Map, Value};
use ssa_drift_util::stringify;

use crate::types::{KeyScalar, MatchMode, MergeKeyTuple};
use crate::FieldPathError;

/// Prefix of a field-name token.
pub const FIELD_PREFIX: &str = "f:";
/// Prefix of a merge-key token.
pub const KEY_PREFIX: &str = "k:";
/// Prefix of a set-element value token.
pub const VALUE_PREFIX: &str = "v:";
/// Marker meaning "this node itself is claimed".
pub const LEAF_MARKER: &str = ".";

fn malformed(token: &str, reason: impl Into<String>) -> FieldPathError {
    FieldPathError::MalformedKey {
        token: token.to_string(),
        reason: reason.into(),
    }
}

/// Parse a `k:{...}` token into a tuple.
///
/// # Errors
///
/// `MalformedKey` if the prefix is missing, the payload is not a JSON object,
/// the object is empty, or any value is not a scalar.
///
/// # Example
///
/// ```
/// use ssa_drift_fieldpath::{parse_key_token, KeyScalar};
///
/// let tuple = parse_key_token(r#"k:{"containerPort":80,"protocol":"TCP"}"#).unwrap();
/// assert_eq!(tuple.get("containerPort"), Some(&KeyScalar::Number("80".into())));
///
/// assert!(parse_key_token(r#"{"name":"app"}"#).is_err());
/// assert!(parse_key_token("k:{not json").is_err());
/// ```
pub fn parse_key_token(token: &str) -> Result<MergeKeyTuple, FieldPathError> {
    let payload = token
        .strip_prefix(KEY_PREFIX)
        .ok_or_else(|| malformed(token, "missing 'k:' prefix"))?;
    let parsed: Value =
        serde_json::from_str(payload).map_err(|e| malformed(token, e.to_string()))?;
    let Value::Object(obj) = parsed else {
        return Err(malformed(token, "payload is not an object"));
    };
    if obj.is_empty() {
        return Err(malformed(token, "empty key"));
    }
    let mut tuple = MergeKeyTuple::new();
    for (name, val) in &obj {
        let scalar = KeyScalar::from_value(val)
            .ok_or_else(|| malformed(token, format!("field '{name}' is not a scalar")))?;
        tuple.insert(name.clone(), scalar);
    }
    Ok(tuple)
}

/// Format a tuple as a `k:{...}` token with sorted fields.
///
/// ```
/// use ssa_drift_fieldpath::{format_key_token, KeyScalar, MergeKeyTuple};
///
/// let tuple = MergeKeyTuple::new()
///     .with("protocol", KeyScalar::String("TCP".into()))
///     .with("containerPort", KeyScalar::Number("80".into()));
/// assert_eq!(format_key_token(&tuple), r#"k:{"containerPort":80,"protocol":"TCP"}"#);
/// ```
pub fn format_key_token(tuple: &MergeKeyTuple) -> String {
    let obj: Map<String, Value> = tuple.to_object();
    format!("{KEY_PREFIX}{}", stringify(&Value::Object(obj)))
}

/// Parse a `v:<json scalar>` token.
pub fn parse_value_token(token: &str) -> Result<KeyScalar, FieldPathError> {
    let payload = token
        .strip_prefix(VALUE_PREFIX)
        .ok_or_else(|| malformed(token, "missing 'v:' prefix"))?;
    let parsed: Value =
        serde_json::from_str(payload).map_err(|e| malformed(token, e.to_string()))?;
    KeyScalar::from_value(&parsed).ok_or_else(|| malformed(token, "value is not a scalar"))
}

/// Find the first element of `array` matched by `tuple`.
///
/// Returns `None` when no element carries at least one tuple field, or when
/// every carrying element disagrees on some field.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift_fieldpath::{find_index, parse_key_token, MatchMode};
///
/// let containers = json!([{"name": "init"}, {"name": "app", "image": "nginx"}]);
/// let tuple = parse_key_token(r#"k:{"name":"app"}"#).unwrap();
/// let arr = containers.as_array().unwrap();
/// assert_eq!(find_index(arr, &tuple, MatchMode::Partial), Some(1));
/// ```
pub fn find_index(array: &[Value], tuple: &MergeKeyTuple, mode: MatchMode) -> Option<usize> {
    array.iter().position(|element| tuple.matches(element, mode))
}

/// Find the first element of a set-like list loosely equal to `value`.
pub fn find_value_index(array: &[Value], value: &KeyScalar) -> Option<usize> {
    array.iter().position(|element| value.matches(element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_token_errors() {
        for bad in [
            "k:",
            "k:[1]",
            "k:{}",
            r#"k:{"a":{"b":1}}"#,
            r#"k:{"a":[1]}"#,
            r#"f:{"a":1}"#,
            "name=app",
        ] {
            assert!(
                matches!(parse_key_token(bad), Err(FieldPathError::MalformedKey { .. })),
                "expected error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_format_parse_inverse() {
        let token = r#"k:{"ip":"10.0.0.1","port":8080}"#;
        let tuple = parse_key_token(token).unwrap();
        assert_eq!(format_key_token(&tuple), token);
    }

    #[test]
    fn test_value_token() {
        assert_eq!(parse_value_token(r#"v:"foo""#).unwrap(), KeyScalar::String("foo".into()));
        assert_eq!(parse_value_token("v:3").unwrap(), KeyScalar::Number("3".into()));
        assert!(parse_value_token(r#"v:{"a":1}"#).is_err());
        assert!(parse_value_token(r#""foo""#).is_err());

        let finalizers = json!(["a", "b", "3"]);
        let arr = finalizers.as_array().unwrap();
        assert_eq!(find_value_index(arr, &KeyScalar::String("b".into())), Some(1));
        assert_eq!(find_value_index(arr, &KeyScalar::Number("3".into())), Some(2));
        assert_eq!(find_value_index(arr, &KeyScalar::String("z".into())), None);
    }

    #[test]
    fn test_find_index_subset_and_cross_type() {
        let ports = json!([
            {"containerPort": "8080", "protocol": "TCP"},
            {"containerPort": 80, "protocol": "TCP", "name": "http"}
        ]);
        let arr = ports.as_array().unwrap();
        let tuple = parse_key_token(r#"k:{"containerPort":8080,"protocol":"TCP"}"#).unwrap();
        assert_eq!(find_index(arr, &tuple, MatchMode::Partial), Some(0));

        let partial = parse_key_token(r#"k:{"containerPort":80,"hostIP":"0.0.0.0"}"#).unwrap();
        assert_eq!(find_index(arr, &partial, MatchMode::Partial), Some(1));
        assert_eq!(find_index(arr, &partial, MatchMode::Strict), None);
    }

    #[test]
    fn test_find_index_not_found() {
        let arr = vec![json!({"image": "x"}), json!("scalar"), json!({"name": "other"})];
        let tuple = parse_key_token(r#"k:{"name":"app"}"#).unwrap();
        assert_eq!(find_index(&arr, &tuple, MatchMode::Partial), None);
        assert_eq!(find_index(&[], &tuple, MatchMode::Partial), None);
    }

    #[test]
    fn test_first_match_wins() {
        let arr = vec![json!({"name": "app", "n": 1}), json!({"name": "app", "n": 2})];
        let tuple = parse_key_token(r#"k:{"name":"app"}"#).unwrap();
        assert_eq!(find_index(&arr, &tuple, MatchMode::Partial), Some(0));
    }
}
