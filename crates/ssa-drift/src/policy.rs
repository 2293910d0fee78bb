//! Array classification table.
//!
//! Kubernetes lists come in three flavours: lists whose elements carry a
//! stable identity (`containers` by `name`), ordered lists (`args`), and
//! everything else, which is tracked as one atomic value. [`ArrayPolicy`] maps
//! field names to the first two; unlisted fields are opaque.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use ssa_drift_fieldpath::{MatchMode, MergeKeyTuple, Step};

/// How elements of an array field are addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrayKind {
    /// Elements are identified by these fields.
    Keyed(Vec<String>),
    /// Elements are identified by their index.
    Positional,
    /// The array is one atomic value.
    Opaque,
}

/// The addressing chosen for one concrete array after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing<'p> {
    Keyed(&'p [String]),
    Positional,
    Opaque,
}

impl Addressing<'_> {
    /// The path step that addresses `array[idx]`, or `None` for opaque arrays.
    pub fn element_step(&self, array: &[Value], idx: usize) -> Option<Step> {
        match self {
            Addressing::Keyed(fields) => {
                MergeKeyTuple::from_element(array.get(idx)?, fields).map(Step::Select)
            }
            Addressing::Positional => (idx < array.len()).then_some(Step::Index(idx)),
            Addressing::Opaque => None,
        }
    }
}

/// Field name → [`ArrayKind`] table.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift::policy::{Addressing, ArrayKind, ArrayPolicy};
///
/// let policy = ArrayPolicy::empty().with("rules", ArrayKind::Keyed(vec!["host".into()]));
/// let rules = json!([{"host": "a.example"}, {"host": "b.example"}]);
/// assert!(matches!(policy.classify("rules", rules.as_array().unwrap()), Addressing::Keyed(_)));
///
/// let broken = json!([{"host": "a.example"}, {"path": "/"}]);
/// assert_eq!(policy.classify("rules", broken.as_array().unwrap()), Addressing::Opaque);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArrayPolicy {
    kinds: BTreeMap<String, ArrayKind>,
}

impl Default for ArrayPolicy {
    /// Common Kubernetes list-map conventions.
    fn default() -> Self {
        let by = |field: &str| ArrayKind::Keyed(vec![field.to_string()]);
        let mut policy = Self::empty();
        for name in [
            "containers",
            "initContainers",
            "ephemeralContainers",
            "volumes",
            "env",
            "imagePullSecrets",
        ] {
            policy = policy.with(name, by("name"));
        }
        policy
            .with("hostAliases", by("ip"))
            .with("volumeMounts", by("mountPath"))
            .with("ports", by("containerPort"))
            .with("args", ArrayKind::Positional)
            .with("command", ArrayKind::Positional)
    }
}

impl ArrayPolicy {
    /// A table with no entries: every array is opaque.
    pub fn empty() -> Self {
        Self {
            kinds: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, kind: ArrayKind) -> Self {
        self.kinds.insert(field.into(), kind);
        self
    }

    pub fn kind_of(&self, field: &str) -> &ArrayKind {
        self.kinds.get(field).unwrap_or(&ArrayKind::Opaque)
    }

    /// Decide how `array`, found under `field`, is addressed.
    ///
    /// A keyed array falls back to opaque unless every element is a map
    /// carrying a non-empty identity and no two elements share one, compared
    /// loosely (`80` and `"80"` collide). Empty arrays are always opaque.
    pub fn classify<'p>(&'p self, field: &str, array: &[Value]) -> Addressing<'p> {
        if array.is_empty() {
            return Addressing::Opaque;
        }
        match self.kind_of(field) {
            ArrayKind::Opaque => Addressing::Opaque,
            ArrayKind::Positional => Addressing::Positional,
            ArrayKind::Keyed(fields) => {
                for (idx, element) in array.iter().enumerate() {
                    let Some(tuple) = MergeKeyTuple::from_element(element, fields) else {
                        tracing::debug!(
                            field,
                            idx,
                            "element lacks identity, tracking array as opaque"
                        );
                        return Addressing::Opaque;
                    };
                    if array[..idx].iter().any(|prev| tuple.matches(prev, MatchMode::Strict)) {
                        tracing::debug!(field, idx, "duplicate identity, tracking array as opaque");
                        return Addressing::Opaque;
                    }
                }
                Addressing::Keyed(fields)
            }
        }
    }

    /// Reorder every valid keyed array by element identity, recursively.
    ///
    /// Two trees that differ only in the order of keyed elements canonicalize
    /// to the same tree.
    pub fn canonicalize(&self, val: &Value) -> Value {
        match val {
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, child) in map {
                    let child = match child {
                        Value::Array(arr) => self.canonicalize_array(key, arr),
                        other => self.canonicalize(other),
                    };
                    out.insert(key.clone(), child);
                }
                Value::Object(out)
            }
            Value::Array(arr) => Value::Array(arr.iter().map(|v| self.canonicalize(v)).collect()),
            other => other.clone(),
        }
    }

    fn canonicalize_array(&self, field: &str, arr: &[Value]) -> Value {
        let items: Vec<Value> = arr.iter().map(|v| self.canonicalize(v)).collect();
        let Addressing::Keyed(fields) = self.classify(field, arr) else {
            return Value::Array(items);
        };
        let mut keyed: Vec<(MergeKeyTuple, Value)> = items
            .into_iter()
            .filter_map(|v| MergeKeyTuple::from_element(&v, fields).map(|t| (t.loosened(), v)))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Array(keyed.into_iter().map(|(_, v)| v).collect())
    }
}

impl<'de> Deserialize<'de> for ArrayPolicy {
    /// Entries read from config are layered over the defaults.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<String, ArrayKind>::deserialize(deserializer)?;
        let mut policy = ArrayPolicy::default();
        for (field, kind) in overrides {
            policy.kinds.insert(field, kind);
        }
        Ok(policy)
    }
}
