use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Bound;

use serde_json::{Map, Value};
use ssa_drift_fieldpath::FieldPath;
use ssa_drift_util::stringify;

use super::entry::ManagedFieldsEntry;
use super::walk::ClaimWalker;
use crate::config::ReconcileConfig;
use crate::error::{Error, Result};

/// Attribution of one path to a manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipClaim {
    pub manager: String,
    pub version: String,
}

/// Flat path → claim map across every manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipMap {
    claims: BTreeMap<FieldPath, OwnershipClaim>,
}

impl OwnershipMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk every entry's claims against `tree`.
    ///
    /// A path claimed by several managers goes to `config.field_manager` if it
    /// is among them, and otherwise to the first claimant in entry order.
    /// Elements of a keyed list that fails validation keep their identity
    /// where they have one.
    ///
    /// # Errors
    ///
    /// `MalformedKey` if any claim tree holds an unparsable merge-key token.
    pub fn from_entries(
        entries: &[ManagedFieldsEntry],
        tree: &Value,
        config: &ReconcileConfig,
    ) -> Result<Self> {
        let mut map = Self::new();
        let mut walker =
            ClaimWalker::new(&config.array_policy, config.merge_key_match).with_element_identity();
        for entry in entries {
            let Some(claims) = entry.claims() else {
                continue;
            };
            for path in walker.walk(claims, tree)? {
                let claim = OwnershipClaim {
                    manager: entry.manager.clone(),
                    version: entry.api_version.clone(),
                };
                match map.claims.entry(path) {
                    Entry::Vacant(slot) => {
                        slot.insert(claim);
                    }
                    Entry::Occupied(mut slot) => {
                        if claim.manager == config.field_manager
                            && slot.get().manager != config.field_manager
                        {
                            slot.insert(claim);
                        }
                    }
                }
            }
        }
        Ok(map)
    }

    /// Read a map persisted by [`OwnershipMap::to_persisted`].
    ///
    /// Versions are not persisted and read back empty.
    ///
    /// # Errors
    ///
    /// `MalformedBaseline` if the text is not a JSON object of path → manager.
    pub fn from_persisted(text: &str) -> Result<Self> {
        let raw: BTreeMap<FieldPath, String> =
            serde_json::from_str(text).map_err(|source| Error::MalformedBaseline {
                what: "ownership map",
                source,
            })?;
        let claims = raw
            .into_iter()
            .map(|(path, manager)| {
                (
                    path,
                    OwnershipClaim {
                        manager,
                        version: String::new(),
                    },
                )
            })
            .collect();
        Ok(Self { claims })
    }

    /// Canonical `{path: manager}` text, leaving out paths under `bookkeeping`.
    ///
    /// ```
    /// use ssa_drift::ownership::{OwnershipClaim, OwnershipMap};
    ///
    /// let mut map = OwnershipMap::new();
    /// for (path, manager) in [("status.replicas", "controller"), ("spec.replicas", "hpa")] {
    ///     let claim = OwnershipClaim { manager: manager.into(), version: "apps/v1".into() };
    ///     map.insert(path.parse().unwrap(), claim);
    /// }
    /// let text = map.to_persisted(&["status".parse::<ssa_drift::FieldPath>().unwrap()]);
    /// assert_eq!(text, r#"{"spec.replicas":"hpa"}"#);
    /// assert_eq!(OwnershipMap::from_persisted(&text).unwrap().len(), 1);
    /// ```
    pub fn to_persisted(&self, bookkeeping: &[FieldPath]) -> String {
        let obj: Map<String, Value> = self
            .claims
            .iter()
            .filter(|(path, _)| !bookkeeping.iter().any(|prefix| path.starts_with(prefix)))
            .map(|(path, claim)| (path.to_string(), Value::String(claim.manager.clone())))
            .collect();
        stringify(&Value::Object(obj))
    }

    pub fn get(&self, path: &FieldPath) -> Option<&OwnershipClaim> {
        self.claims.get(path)
    }

    pub fn insert(&mut self, path: FieldPath, claim: OwnershipClaim) -> Option<OwnershipClaim> {
        self.claims.insert(path, claim)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &OwnershipClaim)> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Index the map for [`OwnerLookup::owner_of`].
    ///
    /// Paths that collide once loosened go to `field_manager` if it holds
    /// one of them, and otherwise to the first in path order.
    pub fn lookup<'a>(&'a self, field_manager: &'a str) -> OwnerLookup<'a> {
        let mut claims: BTreeMap<FieldPath, &OwnershipClaim> = BTreeMap::new();
        for (path, claim) in &self.claims {
            match claims.entry(path.loosened()) {
                Entry::Vacant(slot) => {
                    slot.insert(claim);
                }
                Entry::Occupied(mut slot) => {
                    if claim.manager == field_manager {
                        slot.insert(claim);
                    }
                }
            }
        }
        OwnerLookup {
            claims,
            field_manager,
        }
    }
}

/// Ownership lookup that tolerates addressing differences between trees.
///
/// Merge-key values compare loosely, a claim on an ancestor covers the
/// whole subtree, and a foreign claim below a path covers that path.
#[derive(Debug)]
pub struct OwnerLookup<'a> {
    claims: BTreeMap<FieldPath, &'a OwnershipClaim>,
    field_manager: &'a str,
}

impl<'a> OwnerLookup<'a> {
    /// The claim a write to `path` would contend with.
    ///
    /// The deepest claim on `path` or one of its ancestors decides. If that
    /// belongs to the field manager, or there is none, the first foreign
    /// claim strictly below `path` is returned instead.
    ///
    /// ```
    /// use ssa_drift::ownership::{OwnershipClaim, OwnershipMap};
    /// use ssa_drift::FieldPath;
    ///
    /// let mut map = OwnershipMap::new();
    /// let claim = OwnershipClaim { manager: "other".into(), version: String::new() };
    /// map.insert("spec.ports[containerPort=8080].hostPort".parse().unwrap(), claim.clone());
    /// map.insert("spec.env".parse().unwrap(), claim);
    /// let lookup = map.lookup("me");
    ///
    /// let quoted: FieldPath = r#"spec.ports[containerPort="8080"].hostPort"#.parse().unwrap();
    /// assert_eq!(lookup.owner_of(&quoted).map(|c| c.manager.as_str()), Some("other"));
    /// let keyed: FieldPath = "spec.env[name=A].value".parse().unwrap();
    /// assert_eq!(lookup.owner_of(&keyed).map(|c| c.manager.as_str()), Some("other"));
    /// let whole: FieldPath = "spec.ports".parse().unwrap();
    /// assert_eq!(lookup.owner_of(&whole).map(|c| c.manager.as_str()), Some("other"));
    /// ```
    pub fn owner_of(&self, path: &FieldPath) -> Option<&'a OwnershipClaim> {
        let path = path.loosened();
        let covering = (0..=path.len())
            .rev()
            .find_map(|len| self.claims.get(&path.prefix(len)).copied());
        if let Some(claim) = covering {
            if claim.manager != self.field_manager {
                return Some(claim);
            }
        }
        self.claims
            .range::<FieldPath, _>((Bound::Excluded(&path), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&path))
            .map(|(_, claim)| *claim)
            .find(|claim| claim.manager != self.field_manager)
            .or(covering)
    }
}

impl FromIterator<(FieldPath, OwnershipClaim)> for OwnershipMap {
    fn from_iter<I: IntoIterator<Item = (FieldPath, OwnershipClaim)>>(iter: I) -> Self {
        Self {
            claims: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manager_of<'a>(map: &'a OwnershipMap, path: &str) -> Option<&'a str> {
        map.get(&path.parse().unwrap()).map(|c| c.manager.as_str())
    }

    fn claim(manager: &str) -> OwnershipClaim {
        OwnershipClaim {
            manager: manager.into(),
            version: String::new(),
        }
    }

    #[test]
    fn test_shared_ownership() {
        let live = json!({"spec": {"replicas": 3, "paused": false, "minReadySeconds": 5}});
        let entries = vec![
            ManagedFieldsEntry::new("hpa", json!({"f:spec": {"f:replicas": {}, "f:paused": {}}})),
            ManagedFieldsEntry::new(
                "kubectl",
                json!({"f:spec": {"f:paused": {}, "f:minReadySeconds": {}}}),
            ),
            ManagedFieldsEntry::new("me", json!({"f:spec": {"f:replicas": {}}}))
                .with_api_version("apps/v1"),
        ];
        let map = OwnershipMap::from_entries(&entries, &live, &ReconcileConfig::new("me")).unwrap();
        assert_eq!(manager_of(&map, "spec.replicas"), Some("me"));
        assert_eq!(manager_of(&map, "spec.paused"), Some("hpa"));
        assert_eq!(manager_of(&map, "spec.minReadySeconds"), Some("kubectl"));
        assert_eq!(map.get(&"spec.replicas".parse().unwrap()).unwrap().version, "apps/v1");
    }

    #[test]
    fn test_subresource_entries_count_for_others() {
        let live = json!({"status": {"readyReplicas": 1}});
        let entries = vec![ManagedFieldsEntry::new(
            "controller",
            json!({"f:status": {"f:readyReplicas": {}}}),
        )
        .with_subresource("status")];
        let map = OwnershipMap::from_entries(&entries, &live, &ReconcileConfig::new("me")).unwrap();
        assert_eq!(manager_of(&map, "status.readyReplicas"), Some("controller"));
        assert_eq!(map.to_persisted(&crate::config::default_bookkeeping_prefixes()), "{}");
    }

    #[test]
    fn test_elements_of_invalid_keyed_list_keep_identity() {
        let live = json!({"spec": {"env": [
            {"name": "A", "value": "1"},
            {"name": "A", "value": "2"},
            {"value": "orphan"}
        ]}});
        let entries = vec![
            ManagedFieldsEntry::new(
                "other",
                json!({"f:spec": {"f:env": {"k:{\"name\":\"A\"}": {"f:value": {}}}}}),
            ),
            ManagedFieldsEntry::new(
                "me",
                json!({"f:spec": {"f:env": {"k:{\"value\":\"orphan\"}": {}}}}),
            ),
        ];
        let map = OwnershipMap::from_entries(&entries, &live, &ReconcileConfig::new("me")).unwrap();
        assert_eq!(manager_of(&map, "spec.env[name=A].value"), Some("other"));
        assert_eq!(manager_of(&map, "spec.env"), Some("me"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_lookup_prefers_field_manager_on_loose_collisions() {
        let map: OwnershipMap = [
            ("spec.ports[containerPort=80].hostPort", "other"),
            (r#"spec.ports[containerPort="80"].hostPort"#, "me"),
        ]
        .into_iter()
        .map(|(p, m)| (p.parse().unwrap(), claim(m)))
        .collect();
        assert_eq!(map.len(), 2);
        let lookup = map.lookup("me");
        let path = "spec.ports[containerPort=80.0].hostPort".parse().unwrap();
        assert_eq!(lookup.owner_of(&path).map(|c| c.manager.as_str()), Some("me"));
        let other = map.lookup("someone");
        assert_eq!(other.owner_of(&path).map(|c| c.manager.as_str()), Some("other"));
    }

    #[test]
    fn test_lookup_deepest_claim_decides() {
        let map: OwnershipMap = [
            ("spec.template", "other"),
            ("spec.template.spec.paused", "me"),
            ("spec.template.spec.paused.x", "third"),
        ]
        .into_iter()
        .map(|(p, m)| (p.parse().unwrap(), claim(m)))
        .collect();
        let lookup = map.lookup("me");
        let owner = |p: &str| lookup.owner_of(&p.parse().unwrap()).map(|c| c.manager.clone());
        assert_eq!(owner("spec.template.spec.replicas").as_deref(), Some("other"));
        assert_eq!(owner("spec.template.spec.paused").as_deref(), Some("third"));
        assert_eq!(owner("spec.template.spec.paused.x").as_deref(), Some("third"));
        assert_eq!(owner("spec.replicas"), None);
        assert_eq!(owner("spec").as_deref(), Some("other"));
    }

    #[test]
    fn test_persisted_is_canonical() {
        let build = |pairs: [(&str, &str); 2]| -> OwnershipMap {
            pairs
                .into_iter()
                .map(|(p, m)| (p.parse().unwrap(), claim(m)))
                .collect()
        };
        let a = build([("b", "x"), ("a", "y")]);
        let b = build([("a", "y"), ("b", "x")]);
        assert_eq!(a.to_persisted(&[]), b.to_persisted(&[]));
        assert_eq!(a.to_persisted(&[]), r#"{"a":"y","b":"x"}"#);
        assert_eq!(OwnershipMap::from_persisted(&a.to_persisted(&[])).unwrap(), a);
    }

    #[test]
    fn test_from_persisted_errors() {
        for bad in ["[]", "{", r#"{"a..b":"x"}"#, r#"{"a":1}"#] {
            assert!(
                matches!(OwnershipMap::from_persisted(bad), Err(Error::MalformedBaseline { .. })),
                "{bad}"
            );
        }
        assert!(OwnershipMap::from_persisted("{}").unwrap().is_empty());
    }
}
