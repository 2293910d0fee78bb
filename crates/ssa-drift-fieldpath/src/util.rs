use serde_json::Value;

/// Characters a backslash may escape anywhere in a path.
pub(crate) const ESCAPABLE: &[char] = &['\\', '.', '[', ']', ',', '='];

/// Characters that must be escaped in a field key.
pub(crate) const KEY_SPECIALS: &[char] = &['\\', '.', '[', ']'];

/// Characters that must be escaped inside a merge-key selector.
pub(crate) const SELECTOR_SPECIALS: &[char] = &['\\', '[', ']', ',', '='];

/// Append `s` to `out`, backslash-escaping every char in `specials`.
pub(crate) fn push_escaped(out: &mut String, s: &str, specials: &[char]) {
    for c in s.chars() {
        if specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Check if a string represents a valid non-negative integer array index.
///
/// Leading zeros are rejected so every index has exactly one spelling.
pub(crate) fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Short name of a value's shape, used in error messages.
pub(crate) fn kind_name(val: &Value) -> &'static str {
    match val {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_index() {
        assert!(is_valid_index("0"));
        assert!(is_valid_index("123"));
        assert!(!is_valid_index("-1"));
        assert!(!is_valid_index("1.5"));
        assert!(!is_valid_index(""));
        assert!(!is_valid_index("01"));
    }

    #[test]
    fn test_push_escaped() {
        let mut out = String::new();
        push_escaped(&mut out, "app.kubernetes.io/name", KEY_SPECIALS);
        assert_eq!(out, r"app\.kubernetes\.io/name");

        let mut out = String::new();
        push_escaped(&mut out, "a,b=c", SELECTOR_SPECIALS);
        assert_eq!(out, r"a\,b\=c");
    }
}
