//! Per-cycle configuration.

use serde::{Deserialize, Serialize};
use ssa_drift_fieldpath::{FieldPath, MatchMode};

use crate::error::{Error, Result};
use crate::policy::ArrayPolicy;

/// Field manager name used when none is configured.
pub const DEFAULT_FIELD_MANAGER: &str = "ssa-drift";

fn dotted(parts: &[&str]) -> FieldPath {
    parts.iter().fold(FieldPath::root(), |path, part| path.field(*part))
}

/// Identity paths owned by whoever applies the object.
pub fn default_always_owned() -> Vec<FieldPath> {
    vec![
        dotted(&["kind"]),
        dotted(&["apiVersion"]),
        dotted(&["metadata", "name"]),
        dotted(&["metadata", "namespace"]),
    ]
}

/// Server-maintained paths that never belong in a persisted ownership map.
pub fn default_bookkeeping_prefixes() -> Vec<FieldPath> {
    vec![
        dotted(&["metadata", "managedFields"]),
        dotted(&["metadata", "resourceVersion"]),
        dotted(&["metadata", "generation"]),
        dotted(&["metadata", "uid"]),
        dotted(&["metadata", "creationTimestamp"]),
        dotted(&["status"]),
    ]
}

/// Settings for one reconcile cycle.
///
/// Loaded from camelCase JSON; every field is optional.
///
/// # Example
///
/// ```
/// use ssa_drift::ReconcileConfig;
///
/// let config = ReconcileConfig::from_json_str(r#"{
///     "fieldManager": "deployer",
///     "ignoreFields": ["spec.replicas"],
///     "arrayPolicy": {"rules": {"keyed": ["host"]}}
/// }"#).unwrap();
/// assert_eq!(config.field_manager, "deployer");
/// assert_eq!(config.ignore_fields[0].to_string(), "spec.replicas");
/// assert!(!config.force_conflicts);
///
/// assert!(ReconcileConfig::from_json_str(r#"{"ignoreFields": ["a..b"]}"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconcileConfig {
    pub field_manager: String,
    pub ignore_fields: Vec<FieldPath>,
    pub force_conflicts: bool,
    pub array_policy: ArrayPolicy,
    pub merge_key_match: MatchMode,
    pub always_owned: Vec<FieldPath>,
    pub bookkeeping_prefixes: Vec<FieldPath>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_MANAGER)
    }
}

impl ReconcileConfig {
    pub fn new(field_manager: impl Into<String>) -> Self {
        Self {
            field_manager: field_manager.into(),
            ignore_fields: Vec::new(),
            force_conflicts: false,
            array_policy: ArrayPolicy::default(),
            merge_key_match: MatchMode::default(),
            always_owned: default_always_owned(),
            bookkeeping_prefixes: default_bookkeeping_prefixes(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Error::Config)
    }

    pub fn with_ignore_fields(mut self, fields: impl IntoIterator<Item = FieldPath>) -> Self {
        self.ignore_fields = fields.into_iter().collect();
        self
    }

    pub fn with_force_conflicts(mut self, force: bool) -> Self {
        self.force_conflicts = force;
        self
    }

    pub fn with_array_policy(mut self, policy: ArrayPolicy) -> Self {
        self.array_policy = policy;
        self
    }

    pub fn with_merge_key_match(mut self, mode: MatchMode) -> Self {
        self.merge_key_match = mode;
        self
    }

    pub fn with_always_owned(mut self, paths: impl IntoIterator<Item = FieldPath>) -> Self {
        self.always_owned = paths.into_iter().collect();
        self
    }
}
