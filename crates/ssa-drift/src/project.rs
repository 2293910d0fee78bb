//! Projection of a tree onto a path set.

use serde_json::{Map, Value};
use ssa_drift_fieldpath::{locate_with_mode, set_with_mode, FieldPath, MatchMode, PathSet};

use crate::error::Result;

/// Build the minimal tree holding the values of `source` at `paths`.
///
/// Absent paths are skipped. Values are written in the order their elements
/// appear in `source`, so keyed and positional lists keep source order. When
/// an ancestor and a descendant are both requested the ancestor's value is
/// copied whole.
///
/// # Errors
///
/// `ShapeMismatch` if a path does not fit the shape of `source`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift::project::project;
/// use ssa_drift_fieldpath::PathSet;
///
/// let live = json!({
///     "metadata": {"name": "web", "uid": "1234"},
///     "spec": {"replicas": 3, "containers": [
///         {"name": "app", "image": "nginx", "imagePullPolicy": "Always"}
///     ]}
/// });
/// let paths: PathSet = ["metadata.name", "spec.containers[name=app].image", "spec.paused"]
///     .iter()
///     .map(|p| p.parse().unwrap())
///     .collect();
/// assert_eq!(project(&live, &paths).unwrap(), json!({
///     "metadata": {"name": "web"},
///     "spec": {"containers": [{"name": "app", "image": "nginx"}]}
/// }));
/// ```
pub fn project(source: &Value, paths: &PathSet) -> Result<Value> {
    project_with_mode(source, paths, MatchMode::Partial)
}

/// Like [`project`], with an explicit merge-key match mode.
pub fn project_with_mode(source: &Value, paths: &PathSet, mode: MatchMode) -> Result<Value> {
    let mut found: Vec<(Vec<usize>, &FieldPath, &Value)> = Vec::with_capacity(paths.len());
    for path in paths {
        match locate_with_mode(source, path, mode)? {
            Some(located) => found.push((located.positions, path, located.value)),
            None => tracing::trace!(path = %path, "path absent from source, skipping"),
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    // Ancestors sort first, so a covered path always finds its ancestor written.
    let mut out = Value::Object(Map::new());
    let mut written = PathSet::new();
    for (_, path, value) in found {
        if (0..path.len()).any(|len| written.contains(&path.prefix(len))) {
            continue;
        }
        set_with_mode(&mut out, path, value.clone(), mode)?;
        written.insert(path.clone());
    }
    Ok(out)
}
