//! Type definitions for field paths.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use ssa_drift_util::{loose_scalar_eq, loose_scalar_key};

use crate::parse::{format_field_path, parse_field_path};
use crate::FieldPathError;

/// A set of field paths, ordered so that ancestors sort before descendants.
pub type PathSet = BTreeSet<FieldPath>;

/// How strictly a [`MergeKeyTuple`] must cover an element to match it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    /// Every tuple field the element carries must agree, and at least one
    /// must be present. Tolerates server-added or missing defaults.
    #[default]
    Partial,
    /// Every tuple field must be present in the element and agree.
    Strict,
}

/// A scalar value inside a merge-key tuple.
///
/// Numbers keep their canonical text so the type stays `Ord` and `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyScalar {
    Null,
    Bool(bool),
    Number(String),
    String(String),
}

impl KeyScalar {
    /// Convert a JSON scalar. Returns `None` for maps and arrays.
    pub fn from_value(val: &Value) -> Option<Self> {
        match val {
            Value::Null => Some(KeyScalar::Null),
            Value::Bool(b) => Some(KeyScalar::Bool(*b)),
            Value::Number(n) => Some(KeyScalar::Number(n.to_string())),
            Value::String(s) => Some(KeyScalar::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            KeyScalar::Null => Value::Null,
            KeyScalar::Bool(b) => Value::Bool(*b),
            KeyScalar::Number(s) => serde_json::from_str::<Number>(s)
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(s.clone())),
            KeyScalar::String(s) => Value::String(s.clone()),
        }
    }

    /// Loose comparison against a JSON value.
    pub fn matches(&self, val: &Value) -> bool {
        loose_scalar_eq(&self.to_value(), val)
    }

    /// The representative of this scalar's loose-equality class.
    pub fn loosened(&self) -> Self {
        match loose_scalar_key(&self.to_value()) {
            Some(key) => KeyScalar::String(key),
            None => KeyScalar::Null,
        }
    }
}

/// Field name → scalar mapping that identifies one array element.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift_fieldpath::{KeyScalar, MatchMode, MergeKeyTuple};
///
/// let tuple = MergeKeyTuple::new()
///     .with("containerPort", KeyScalar::Number("80".to_string()))
///     .with("protocol", KeyScalar::String("TCP".to_string()));
///
/// // The declared element has no protocol; the server filled it in.
/// assert!(tuple.matches(&json!({"containerPort": 80}), MatchMode::Partial));
/// assert!(!tuple.matches(&json!({"containerPort": 80}), MatchMode::Strict));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergeKeyTuple {
    fields: BTreeMap<String, KeyScalar>,
}

impl MergeKeyTuple {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: KeyScalar) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: KeyScalar) -> Option<KeyScalar> {
        self.fields.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&KeyScalar> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KeyScalar)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read the identity tuple of `element` for the given identity fields.
    ///
    /// Returns `None` unless the element is a map carrying every field as a
    /// non-null scalar, and no string identity is empty.
    pub fn from_element(element: &Value, names: &[String]) -> Option<Self> {
        let obj = element.as_object()?;
        let mut tuple = MergeKeyTuple::new();
        for name in names {
            let scalar = KeyScalar::from_value(obj.get(name)?)?;
            match &scalar {
                KeyScalar::Null => return None,
                KeyScalar::String(s) if s.is_empty() => return None,
                _ => {}
            }
            tuple.insert(name.clone(), scalar);
        }
        if tuple.is_empty() {
            return None;
        }
        Some(tuple)
    }

    /// The tuple as a JSON map with typed values, used to seed new elements.
    pub fn to_object(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect()
    }

    /// Every value replaced by [`KeyScalar::loosened`].
    pub fn loosened(&self) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.loosened()))
                .collect(),
        }
    }

    /// Subset-match this tuple against one array element.
    pub fn matches(&self, element: &Value, mode: MatchMode) -> bool {
        let Some(obj) = element.as_object() else {
            return false;
        };
        let mut verifiable = 0usize;
        for (name, expected) in &self.fields {
            match obj.get(name) {
                Some(actual) => {
                    if !expected.matches(actual) {
                        return false;
                    }
                    verifiable += 1;
                }
                None if mode == MatchMode::Strict => return false,
                None => {}
            }
        }
        verifiable > 0
    }
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Map key.
    Field(String),
    /// Positional array index.
    Index(usize),
    /// Array element selected by its merge key.
    Select(MergeKeyTuple),
}

/// An address into a tree.
///
/// The text form is dot-separated segments, where a segment is `key`,
/// `key[N]` or `key[k=v,...]`. See [`parse_field_path`] for the full grammar.
///
/// # Example
///
/// ```
/// use ssa_drift_fieldpath::{FieldPath, Step};
///
/// let path: FieldPath = "spec.containers[name=app].args[0]".parse().unwrap();
/// assert_eq!(path.len(), 5);
/// assert!(matches!(path.steps()[3], Step::Field(ref f) if f == "args"));
/// assert_eq!(path.to_string(), "spec.containers[name=app].args[0]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    steps: Vec<Step>,
}

impl FieldPath {
    /// The empty path, addressing the whole tree.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Builder-style append.
    pub fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// A new path one step below this one.
    pub fn child(&self, step: Step) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { steps }
    }

    pub fn field(&self, name: impl Into<String>) -> Self {
        self.child(Step::Field(name.into()))
    }

    pub fn index(&self, idx: usize) -> Self {
        self.child(Step::Index(idx))
    }

    pub fn select(&self, tuple: MergeKeyTuple) -> Self {
        self.child(Step::Select(tuple))
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.steps.split_last()?;
        Some(Self {
            steps: init.to_vec(),
        })
    }

    /// The path made of the first `len` steps.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            steps: self.steps[..len.min(self.steps.len())].to_vec(),
        }
    }

    /// True if `prefix` equals this path or is an ancestor of it, comparing
    /// whole steps only.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.steps.len() >= prefix.steps.len()
            && self.steps[..prefix.steps.len()] == prefix.steps[..]
    }

    /// True if this path is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &FieldPath) -> bool {
        other.steps.len() > self.steps.len() && other.starts_with(self)
    }

    /// A comparison key: two paths address the same elements under loose
    /// merge-key equality exactly when their loosened forms are equal.
    ///
    /// ```
    /// use ssa_drift_fieldpath::FieldPath;
    ///
    /// let typed: FieldPath = "ports[containerPort=8080].hostPort".parse().unwrap();
    /// let quoted: FieldPath = r#"ports[containerPort="8080"].hostPort"#.parse().unwrap();
    /// assert_ne!(typed, quoted);
    /// assert_eq!(typed.loosened(), quoted.loosened());
    /// ```
    pub fn loosened(&self) -> Self {
        Self {
            steps: self
                .steps
                .iter()
                .map(|step| match step {
                    Step::Select(tuple) => Step::Select(tuple.loosened()),
                    other => other.clone(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_field_path(self))
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_field_path(s)
    }
}

impl From<Vec<Step>> for FieldPath {
    fn from(steps: Vec<Step>) -> Self {
        Self::from_steps(steps)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_field_path(self))
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_field_path(&text).map_err(serde::de::Error::custom)
    }
}
