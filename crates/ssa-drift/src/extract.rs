//! Path extraction over a desired tree.

use serde_json::{Map, Value};
use ssa_drift_fieldpath::{FieldPath, PathSet};

use crate::policy::{Addressing, ArrayPolicy};

/// Emit every leaf path reachable in `tree`.
///
/// Scalars, `null`, empty maps and opaque arrays are leaves. Keyed array
/// elements are addressed by identity and positional ones by index. A
/// non-map root yields an empty set.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift::extract::extract;
/// use ssa_drift::policy::ArrayPolicy;
///
/// let desired = json!({
///     "spec": {
///         "replicas": 2,
///         "containers": [{"name": "app", "args": ["--port", "80"]}],
///         "finalizers": ["a"]
///     }
/// });
/// let paths: Vec<String> = extract(&desired, &ArrayPolicy::default())
///     .iter()
///     .map(|p| p.to_string())
///     .collect();
/// assert_eq!(paths, vec![
///     "spec.containers[name=app].args[0]",
///     "spec.containers[name=app].args[1]",
///     "spec.containers[name=app].name",
///     "spec.finalizers",
///     "spec.replicas",
/// ]);
/// ```
pub fn extract(tree: &Value, policy: &ArrayPolicy) -> PathSet {
    let mut out = PathSet::new();
    if let Value::Object(map) = tree {
        walk_map(map, &FieldPath::root(), policy, &mut out);
    }
    out
}

fn walk_map(map: &Map<String, Value>, base: &FieldPath, policy: &ArrayPolicy, out: &mut PathSet) {
    for (key, child) in map {
        if key.is_empty() {
            tracing::debug!(path = %base, "skipping empty key");
            continue;
        }
        extract_field(key, child, &base.field(key.as_str()), policy, out);
    }
}

/// Emit the leaves of `value`, found under map key `field` at `path`.
pub(crate) fn extract_field(
    field: &str,
    value: &Value,
    path: &FieldPath,
    policy: &ArrayPolicy,
    out: &mut PathSet,
) {
    match value {
        Value::Object(inner) if !inner.is_empty() => walk_map(inner, path, policy, out),
        Value::Array(arr) => extract_array(field, arr, path, policy, out),
        _ => {
            out.insert(path.clone());
        }
    }
}

/// Emit the leaves of one array element at `path`. Nested arrays are leaves.
pub(crate) fn extract_element(
    element: &Value,
    path: &FieldPath,
    policy: &ArrayPolicy,
    out: &mut PathSet,
) {
    match element {
        Value::Object(inner) if !inner.is_empty() => walk_map(inner, path, policy, out),
        _ => {
            out.insert(path.clone());
        }
    }
}

pub(crate) fn extract_array(
    field: &str,
    arr: &[Value],
    base: &FieldPath,
    policy: &ArrayPolicy,
    out: &mut PathSet,
) {
    let addressing = policy.classify(field, arr);
    if addressing == Addressing::Opaque {
        out.insert(base.clone());
        return;
    }
    for (idx, element) in arr.iter().enumerate() {
        if let Some(step) = addressing.element_step(arr, idx) {
            extract_element(element, &base.child(step), policy, out);
        }
    }
}
