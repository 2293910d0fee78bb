mod common;

use common::{desired_deployment, live_deployment, SELF};
use serde_json::json;
use ssa_drift::extract::extract;
use ssa_drift::ownership::{
    entries_from_live, merge_claims, owned_paths, ManagedFieldsEntry, OwnershipMap,
};
use ssa_drift::{FieldPath, MatchMode, PathSet, ReconcileConfig};

fn texts(set: &PathSet) -> Vec<String> {
    set.iter().map(|p| p.to_string()).collect()
}

#[test]
fn merged_claims_are_idempotent() {
    let entries = entries_from_live(&live_deployment()).unwrap();
    let desired = desired_deployment();
    let config = ReconcileConfig::new(SELF);

    let once = owned_paths(&entries, &desired, &config).unwrap();
    let repeated = [entries.clone(), entries.clone(), entries.clone()].concat();
    assert_eq!(owned_paths(&repeated, &desired, &config).unwrap(), once);
    assert_eq!(merge_claims(&repeated, SELF), merge_claims(&entries, SELF));
}

#[test]
fn claims_across_operations_are_merged() {
    let desired = json!({"metadata": {"labels": {"a": "1", "b": "2"}}, "data": {"x": "1"}});
    let entries = vec![
        ManagedFieldsEntry::new(SELF, json!({"f:metadata": {"f:labels": {"f:a": {}}}})),
        ManagedFieldsEntry::new("someone-else", json!({"f:data": {"f:x": {}}})),
        ManagedFieldsEntry::new(SELF, json!({"f:metadata": {"f:labels": {"f:b": {}}}})),
    ];
    let config = ReconcileConfig::new(SELF).with_always_owned([]);
    assert_eq!(
        texts(&owned_paths(&entries, &desired, &config).unwrap()),
        vec!["metadata.labels.a", "metadata.labels.b"]
    );
}

#[test]
fn no_claims_falls_back_to_every_desired_path() {
    let desired = desired_deployment();
    let config = ReconcileConfig::new(SELF);
    let expected = extract(&desired, &config.array_policy);
    assert_eq!(owned_paths(&[], &desired, &config).unwrap(), expected);

    let foreign_only = vec![ManagedFieldsEntry::new(
        "kubectl",
        json!({"f:spec": {"f:replicas": {}}}),
    )];
    assert_eq!(owned_paths(&foreign_only, &desired, &config).unwrap(), expected);
}

#[test]
fn strict_matching_drops_partially_covered_keys() {
    let entries = entries_from_live(&live_deployment()).unwrap();
    let desired = desired_deployment();
    let container = "spec.template.spec.containers[name=app]";
    let port: FieldPath = format!("{container}.ports[containerPort=80].containerPort")
        .parse()
        .unwrap();

    let partial = owned_paths(&entries, &desired, &ReconcileConfig::new(SELF)).unwrap();
    assert!(partial.contains(&port));

    let strict = ReconcileConfig::new(SELF).with_merge_key_match(MatchMode::Strict);
    let owned = owned_paths(&entries, &desired, &strict).unwrap();
    assert!(!owned.contains(&port));
    let image: FieldPath = format!("{container}.image").parse().unwrap();
    assert!(owned.contains(&image));
}

#[test]
fn ownership_map_attributes_every_manager() {
    let live = live_deployment();
    let entries = entries_from_live(&live).unwrap();
    let config = ReconcileConfig::new(SELF);
    let map = OwnershipMap::from_entries(&entries, &live, &config).unwrap();

    let owner = |path: &str| map.get(&path.parse().unwrap()).map(|c| c.manager.clone());
    assert_eq!(owner("spec.replicas").as_deref(), Some("hpa-controller"));
    assert_eq!(owner("status.readyReplicas").as_deref(), Some("kube-controller-manager"));
    assert_eq!(owner("metadata.annotations.team").as_deref(), Some(SELF));
    assert_eq!(owner("spec.template.spec.containers[name=app].imagePullPolicy"), None);

    let persisted = map.to_persisted(&config.bookkeeping_prefixes);
    assert!(!persisted.contains("status."));
    assert!(persisted.contains(r#""spec.replicas":"hpa-controller""#));
    let reread = OwnershipMap::from_persisted(&persisted).unwrap();
    assert_eq!(reread.len(), map.len() - 2);
    assert_eq!(reread.to_persisted(&[]), persisted);
}

#[test]
fn entries_from_real_json_text() {
    let text = r#"{
        "metadata": {"managedFields": [
            {"manager": "deployer", "operation": "Apply", "apiVersion": "v1",
             "fieldsType": "FieldsV1", "fieldsV1": {"f:data": {"f:key": {}}}}
        ]},
        "data": {"key": "value"}
    }"#;
    let live: serde_json::Value = serde_json::from_str(text).unwrap();
    let entries = entries_from_live(&live).unwrap();
    let config = ReconcileConfig::new("deployer").with_always_owned([]);
    let owned = owned_paths(&entries, &live, &config).unwrap();
    assert_eq!(texts(&owned), vec!["data.key"]);
}
