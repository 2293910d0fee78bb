//! Drift and conflict decisions.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ssa_drift_fieldpath::{FieldPath, PathSet};
use ssa_drift_util::loose_deep_equal;

use crate::ownership::OwnershipMap;
use crate::policy::ArrayPolicy;

/// What the caller should do with the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    NoAction,
    RequireUpdate,
    BlockOnConflict,
    ForceUpdate,
}

impl Action {
    /// The action table. Ownership drift dominates value drift.
    ///
    /// ```
    /// use ssa_drift::Action;
    ///
    /// assert_eq!(Action::decide(false, false, true), Action::NoAction);
    /// assert_eq!(Action::decide(true, false, false), Action::RequireUpdate);
    /// assert_eq!(Action::decide(false, true, false), Action::BlockOnConflict);
    /// assert_eq!(Action::decide(true, true, true), Action::ForceUpdate);
    /// ```
    pub fn decide(value_drift: bool, ownership_drift: bool, force: bool) -> Self {
        match (value_drift, ownership_drift, force) {
            (_, true, false) => Action::BlockOnConflict,
            (_, true, true) => Action::ForceUpdate,
            (true, false, _) => Action::RequireUpdate,
            (false, false, _) => Action::NoAction,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::NoAction => "NoAction",
            Action::RequireUpdate => "RequireUpdate",
            Action::BlockOnConflict => "BlockOnConflict",
            Action::ForceUpdate => "ForceUpdate",
        }
    }

    /// True if the caller should reapply.
    pub fn needs_apply(&self) -> bool {
        matches!(self, Action::RequireUpdate | Action::ForceUpdate)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A desired path owned by another manager.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Conflict {
    pub path: FieldPath,
    pub owner: String,
}

/// Inputs to [`analyze`].
#[derive(Debug, Clone, Copy)]
pub struct DriftInput<'a> {
    pub stored_projection: &'a Value,
    pub new_projection: &'a Value,
    pub ownership: &'a OwnershipMap,
    /// Desired paths after the ignore filter.
    pub desired_paths: &'a PathSet,
    pub field_manager: &'a str,
    pub force: bool,
    /// Used to compare keyed lists regardless of element order.
    pub policy: &'a ArrayPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub action: Action,
    pub value_drift: bool,
    /// Sorted by path.
    pub conflicts: Vec<Conflict>,
}

impl Analysis {
    pub fn ownership_drift(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Conflicting paths grouped by owner, owners in first-seen order.
    pub fn conflicts_by_manager(&self) -> IndexMap<String, Vec<FieldPath>> {
        let mut grouped: IndexMap<String, Vec<FieldPath>> = IndexMap::new();
        for conflict in &self.conflicts {
            grouped
                .entry(conflict.owner.clone())
                .or_default()
                .push(conflict.path.clone());
        }
        grouped
    }
}

/// Desired paths whose recorded owner is someone other than `field_manager`.
///
/// Ownership is looked up with [`OwnershipMap::lookup`], so a path conflicts
/// when its merge keys differ from the recorded ones only in scalar type, or
/// when a foreign manager holds an enclosing or enclosed node.
pub fn find_conflicts(
    desired_paths: &PathSet,
    ownership: &OwnershipMap,
    field_manager: &str,
) -> Vec<Conflict> {
    let lookup = ownership.lookup(field_manager);
    desired_paths
        .iter()
        .filter_map(|path| {
            let claim = lookup.owner_of(path)?;
            (claim.manager != field_manager).then(|| Conflict {
                path: path.clone(),
                owner: claim.manager.clone(),
            })
        })
        .collect()
}

/// True if the two projections hold different values.
///
/// Scalars compare loosely, map key order is ignored, and keyed lists are
/// compared by identity rather than position.
pub fn value_drift(stored: &Value, new: &Value, policy: &ArrayPolicy) -> bool {
    !loose_deep_equal(&policy.canonicalize(stored), &policy.canonicalize(new))
}

/// Reduce one cycle's observations to an [`Action`].
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift::analyze::{analyze, Action, DriftInput};
/// use ssa_drift::ownership::{OwnershipClaim, OwnershipMap};
/// use ssa_drift::policy::ArrayPolicy;
/// use ssa_drift_fieldpath::PathSet;
///
/// let mut ownership = OwnershipMap::new();
/// ownership.insert(
///     "spec.replicas".parse().unwrap(),
///     OwnershipClaim { manager: "hpa-controller".into(), version: String::new() },
/// );
/// let desired = PathSet::from(["spec.replicas".parse().unwrap()]);
/// let projection = json!({"spec": {"replicas": 3}});
///
/// let analysis = analyze(&DriftInput {
///     stored_projection: &projection,
///     new_projection: &projection,
///     ownership: &ownership,
///     desired_paths: &desired,
///     field_manager: "me",
///     force: false,
///     policy: &ArrayPolicy::default(),
/// });
/// assert_eq!(analysis.action, Action::BlockOnConflict);
/// assert_eq!(analysis.conflicts[0].owner, "hpa-controller");
/// ```
pub fn analyze(input: &DriftInput<'_>) -> Analysis {
    let value_drift = value_drift(input.stored_projection, input.new_projection, input.policy);
    let conflicts = find_conflicts(input.desired_paths, input.ownership, input.field_manager);
    let action = Action::decide(value_drift, !conflicts.is_empty(), input.force);
    tracing::debug!(%action, value_drift, conflicts = conflicts.len(), "analyzed drift");
    Analysis {
        action,
        value_drift,
        conflicts,
    }
}
