use serde_json::Value;
use ssa_drift_fieldpath::PathSet;

use super::entry::{merge_claims, ManagedFieldsEntry};
use super::walk::ClaimWalker;
use crate::config::ReconcileConfig;
use crate::error::Result;
use crate::extract::extract;

/// Paths of `desired` currently attributable to `config.field_manager`.
///
/// With no claims for the manager at all, every extracted path of `desired`
/// is treated as owned. Otherwise the merged claims are walked against
/// `desired` and the configured always-owned paths are added.
///
/// # Errors
///
/// `MalformedKey` if a claim tree holds an unparsable merge-key token.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift::ownership::{owned_paths, ManagedFieldsEntry};
/// use ssa_drift::ReconcileConfig;
///
/// let desired = json!({
///     "kind": "Deployment",
///     "spec": {"replicas": 3, "paused": false}
/// });
/// let entries = vec![ManagedFieldsEntry::new("me", json!({"f:spec": {"f:paused": {}}}))];
/// let owned: Vec<String> = owned_paths(&entries, &desired, &ReconcileConfig::new("me"))
///     .unwrap()
///     .iter()
///     .map(|p| p.to_string())
///     .collect();
/// assert_eq!(owned, vec![
///     "apiVersion", "kind", "metadata.name", "metadata.namespace", "spec.paused",
/// ]);
/// ```
pub fn owned_paths(
    entries: &[ManagedFieldsEntry],
    desired: &Value,
    config: &ReconcileConfig,
) -> Result<PathSet> {
    let merged = merge_claims(entries, &config.field_manager);
    if merged.is_empty() {
        tracing::debug!(
            manager = %config.field_manager,
            "no ownership claims, treating every desired path as owned"
        );
        return Ok(extract(desired, &config.array_policy));
    }

    let mut walker = ClaimWalker::new(&config.array_policy, config.merge_key_match);
    let mut owned = walker.walk(&merged, desired)?;
    owned.extend(config.always_owned.iter().cloned());
    Ok(owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ssa_drift_fieldpath::FieldPath;

    fn texts(set: &PathSet) -> Vec<String> {
        set.iter().map(|p| p.to_string()).collect()
    }

    fn config() -> ReconcileConfig {
        ReconcileConfig::new("me").with_always_owned([])
    }

    #[test]
    fn test_fallback_without_claims() {
        let desired = json!({"spec": {"replicas": 1}, "metadata": {"name": "x"}});
        let entries = vec![ManagedFieldsEntry::new("other", json!({"f:spec": {}}))];
        assert_eq!(
            owned_paths(&entries, &desired, &config()).unwrap(),
            extract(&desired, &config().array_policy)
        );
        assert_eq!(owned_paths(&[], &desired, &config()).unwrap().len(), 2);
    }

    #[test]
    fn test_keyed_claims() {
        let desired = json!({"spec": {"containers": [
            {"name": "sidecar", "image": "envoy"},
            {"name": "app", "image": "nginx", "resources": {"limits": {"cpu": "1"}}}
        ]}});
        let entries = vec![ManagedFieldsEntry::new(
            "me",
            json!({"f:spec": {"f:containers": {
                r#"k:{"name":"app"}"#: {".": {}, "f:name": {}, "f:image": {}},
                r#"k:{"name":"gone"}"#: {".": {}, "f:image": {}}
            }}}),
        )];
        assert_eq!(
            texts(&owned_paths(&entries, &desired, &config()).unwrap()),
            vec!["spec.containers[name=app].image", "spec.containers[name=app].name"]
        );
    }

    #[test]
    fn test_positional_and_opaque_addressing() {
        let desired = json!({
            "args": ["a", "b"],
            "finalizers": ["x", "y"],
            "env": [{"name": "A"}, {"value": "no-name"}]
        });
        let entries = vec![ManagedFieldsEntry::new(
            "me",
            json!({
                "f:args": {"v:\"b\"": {}},
                "f:finalizers": {"v:\"y\"": {}},
                "f:env": {r#"k:{"name":"A"}"#: {".": {}}}
            }),
        )];
        assert_eq!(
            texts(&owned_paths(&entries, &desired, &config()).unwrap()),
            vec!["args[1]", "env", "finalizers"]
        );
    }

    #[test]
    fn test_leaf_claim_expands_and_mismatch_claims_whole() {
        let desired = json!({
            "metadata": {"labels": {"a": "1", "b": "2"}},
            "spec": {"replicas": 2}
        });
        let entries = vec![ManagedFieldsEntry::new(
            "me",
            json!({
                "f:metadata": {"f:labels": {".": {}}},
                "f:spec": {"f:replicas": {"f:nested": {}}},
                "f:absent": {}
            }),
        )];
        assert_eq!(
            texts(&owned_paths(&entries, &desired, &config()).unwrap()),
            vec!["metadata.labels.a", "metadata.labels.b", "spec.replicas"]
        );
    }

    #[test]
    fn test_malformed_key_fails() {
        let desired = json!({"env": [{"name": "A"}]});
        let entries = vec![ManagedFieldsEntry::new("me", json!({"f:env": {"k:{oops": {}}}))];
        assert!(owned_paths(&entries, &desired, &config()).is_err());
    }

    #[test]
    fn test_always_owned_union() {
        let desired = json!({"kind": "ConfigMap", "data": {"a": "1"}});
        let entries = vec![ManagedFieldsEntry::new("me", json!({"f:data": {"f:a": {}}}))];
        let owned = owned_paths(&entries, &desired, &ReconcileConfig::new("me")).unwrap();
        assert!(owned.contains(&"kind".parse::<FieldPath>().unwrap()));
        assert!(owned.contains(&"metadata.name".parse::<FieldPath>().unwrap()));
        assert!(owned.contains(&"data.a".parse::<FieldPath>().unwrap()));
    }
}
