use serde_json::Value;

use crate::merge_key::find_index;
use crate::types::{FieldPath, MatchMode, Step};
use crate::util::kind_name;
use crate::FieldPathError;

pub(crate) fn mismatch(
    path: &FieldPath,
    depth: usize,
    expected: &'static str,
    found: &Value,
) -> FieldPathError {
    FieldPathError::ShapeMismatch {
        path: path.prefix(depth + 1).to_string(),
        expected,
        found: kind_name(found),
    }
}

/// Get a value from a tree by field path, using partial merge-key matching.
///
/// Returns `Ok(None)` if the value is absent (a missing key, an index past the
/// end, an unmatched selector, or a `null` on the way down).
///
/// # Errors
///
/// `ShapeMismatch` if a step does not fit the tree, such as an index into a
/// map or a key into a string.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift_fieldpath::get;
///
/// let doc = json!({"spec": {"containers": [{"name": "app", "image": "nginx"}]}});
/// let path = "spec.containers[name=app].image".parse().unwrap();
/// assert_eq!(get(&doc, &path).unwrap(), Some(&json!("nginx")));
///
/// let missing = "spec.containers[name=db].image".parse().unwrap();
/// assert_eq!(get(&doc, &missing).unwrap(), None);
///
/// let wrong = "spec.containers.image".parse().unwrap();
/// assert!(get(&doc, &wrong).is_err());
/// ```
pub fn get<'a>(val: &'a Value, path: &FieldPath) -> Result<Option<&'a Value>, FieldPathError> {
    get_with_mode(val, path, MatchMode::Partial)
}

/// Like [`get`], with an explicit merge-key match mode.
pub fn get_with_mode<'a>(
    val: &'a Value,
    path: &FieldPath,
    mode: MatchMode,
) -> Result<Option<&'a Value>, FieldPathError> {
    Ok(locate_with_mode(val, path, mode)?.map(|found| found.value))
}

/// A value found by [`locate_with_mode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Located<'a> {
    pub value: &'a Value,
    /// Array position resolved at each step; `0` for map steps.
    pub positions: Vec<usize>,
}

/// Resolve a path and report which array position every step landed on.
///
/// Positions let callers order selector paths by where their elements sit
/// in the source array.
///
/// ```
/// use serde_json::json;
/// use ssa_drift_fieldpath::get::locate_with_mode;
/// use ssa_drift_fieldpath::MatchMode;
///
/// let doc = json!({"c": [{"name": "b"}, {"name": "a"}]});
/// let found = locate_with_mode(&doc, &"c[name=a].name".parse().unwrap(), MatchMode::Partial)
///     .unwrap()
///     .unwrap();
/// assert_eq!(found.value, &json!("a"));
/// assert_eq!(found.positions, vec![0, 1, 0]);
/// ```
pub fn locate_with_mode<'a>(
    val: &'a Value,
    path: &FieldPath,
    mode: MatchMode,
) -> Result<Option<Located<'a>>, FieldPathError> {
    let mut current = val;
    let mut positions = Vec::with_capacity(path.len());
    for (depth, step) in path.steps().iter().enumerate() {
        if current.is_null() {
            return Ok(None);
        }
        let next = match (step, current) {
            (Step::Field(name), Value::Object(map)) => map.get(name).map(|v| (0, v)),
            (Step::Index(idx), Value::Array(arr)) => arr.get(*idx).map(|v| (*idx, v)),
            (Step::Select(tuple), Value::Array(arr)) => {
                find_index(arr, tuple, mode).and_then(|idx| arr.get(idx).map(|v| (idx, v)))
            }
            (Step::Field(_), other) => return Err(mismatch(path, depth, "map", other)),
            (Step::Index(_) | Step::Select(_), other) => {
                return Err(mismatch(path, depth, "array", other))
            }
        };
        match next {
            Some((position, v)) => {
                positions.push(position);
                current = v;
            }
            None => return Ok(None),
        }
    }
    Ok(Some(Located {
        value: current,
        positions,
    }))
}
