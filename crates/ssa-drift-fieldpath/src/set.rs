use serde_json::{Map, Value};

use crate::get::mismatch;
use crate::merge_key::find_index;
use crate::types::{FieldPath, MatchMode, Step};
use crate::FieldPathError;

/// Set a value in a tree by field path, creating whatever is missing.
///
/// Missing maps and arrays are created on the way down, and a `null` in the
/// way is replaced by the container the next step needs. Positional steps
/// past the end pad the array with `null`. A selector with no matching
/// element appends a new element seeded with the tuple's fields.
///
/// # Errors
///
/// `ShapeMismatch` if an existing non-null value does not fit a step.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift_fieldpath::set;
///
/// let mut doc = json!({});
/// set(&mut doc, &"spec.ports[containerPort=80].protocol".parse().unwrap(), json!("TCP")).unwrap();
/// set(&mut doc, &"spec.args[1]".parse().unwrap(), json!("--v")).unwrap();
/// assert_eq!(doc, json!({
///     "spec": {
///         "ports": [{"containerPort": 80, "protocol": "TCP"}],
///         "args": [null, "--v"]
///     }
/// }));
/// ```
pub fn set(root: &mut Value, path: &FieldPath, value: Value) -> Result<(), FieldPathError> {
    set_with_mode(root, path, value, MatchMode::Partial)
}

/// Like [`set`], with an explicit merge-key match mode.
pub fn set_with_mode(
    root: &mut Value,
    path: &FieldPath,
    value: Value,
    mode: MatchMode,
) -> Result<(), FieldPathError> {
    let mut current = root;
    for (depth, step) in path.steps().iter().enumerate() {
        current = child_mut(current, step, mode, path, depth)?;
    }
    *current = value;
    Ok(())
}

fn child_mut<'a>(
    current: &'a mut Value,
    step: &Step,
    mode: MatchMode,
    path: &FieldPath,
    depth: usize,
) -> Result<&'a mut Value, FieldPathError> {
    if current.is_null() {
        *current = match step {
            Step::Field(_) => Value::Object(Map::new()),
            Step::Index(_) | Step::Select(_) => Value::Array(Vec::new()),
        };
    }
    match (step, current) {
        (Step::Field(name), Value::Object(map)) => {
            Ok(map.entry(name.clone()).or_insert(Value::Null))
        }
        (Step::Index(idx), Value::Array(arr)) => {
            if arr.len() <= *idx {
                arr.resize(*idx + 1, Value::Null);
            }
            Ok(&mut arr[*idx])
        }
        (Step::Select(tuple), Value::Array(arr)) => {
            let idx = match find_index(arr, tuple, mode) {
                Some(idx) => idx,
                None => {
                    arr.push(Value::Object(tuple.to_object()));
                    arr.len() - 1
                }
            };
            Ok(&mut arr[idx])
        }
        (Step::Field(_), other) => Err(mismatch(path, depth, "map", other)),
        (Step::Index(_) | Step::Select(_), other) => Err(mismatch(path, depth, "array", other)),
    }
}
