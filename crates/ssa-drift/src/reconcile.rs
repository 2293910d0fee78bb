//! One reconcile cycle, end to end.

use serde_json::{Map, Value};
use ssa_drift_fieldpath::PathSet;
use ssa_drift_util::stringify;

use crate::analyze::{analyze, Action, Conflict, DriftInput};
use crate::config::ReconcileConfig;
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::ignore::IgnoreFilter;
use crate::ownership::{entries_from_live, owned_paths, OwnershipMap};
use crate::project::project_with_mode;

/// What the caller supplies for one resource.
#[derive(Debug, Clone, Copy)]
pub struct CycleInput<'a> {
    pub desired: &'a Value,
    /// Live object, including `metadata.managedFields`.
    pub live: &'a Value,
    /// Projection persisted by the previous cycle, if any.
    pub stored_projection: Option<&'a str>,
    /// Ownership map persisted by the previous cycle, if any.
    pub stored_ownership: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub action: Action,
    pub value_drift: bool,
    pub conflicts: Vec<Conflict>,
    /// Canonical projection of the live object, to persist.
    pub projection: String,
    /// Canonical `{path: manager}` map of the live object, to persist.
    pub ownership: String,
    pub owned_paths: PathSet,
    pub desired_paths: PathSet,
}

fn parse_blob(text: Option<&str>, what: &'static str) -> Result<Value> {
    match text {
        None => Ok(Value::Object(Map::new())),
        Some(text) => {
            serde_json::from_str(text).map_err(|source| Error::MalformedBaseline { what, source })
        }
    }
}

/// Run one cycle for one resource.
///
/// The stored projection is re-projected through the current owned paths
/// before comparison, so neither a changed ignore list nor relinquished
/// fields register as drift. A missing stored projection reads as an empty
/// tree.
///
/// # Errors
///
/// Malformed ignore patterns, stored blobs, managed fields or merge keys, and
/// owned paths that do not fit the live object.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift::{reconcile, Action, CycleInput, ReconcileConfig};
///
/// let desired = json!({
///     "kind": "ConfigMap",
///     "metadata": {"name": "settings"},
///     "data": {"mode": "fast"}
/// });
/// let live = json!({
///     "kind": "ConfigMap",
///     "metadata": {"name": "settings", "uid": "42"},
///     "data": {"mode": "fast"}
/// });
/// let config = ReconcileConfig::new("deployer");
///
/// let first = reconcile(&config, &CycleInput {
///     desired: &desired,
///     live: &live,
///     stored_projection: None,
///     stored_ownership: None,
/// }).unwrap();
/// assert_eq!(first.action, Action::RequireUpdate);
/// assert_eq!(
///     first.projection,
///     r#"{"data":{"mode":"fast"},"kind":"ConfigMap","metadata":{"name":"settings"}}"#
/// );
///
/// let second = reconcile(&config, &CycleInput {
///     desired: &desired,
///     live: &live,
///     stored_projection: Some(&first.projection),
///     stored_ownership: Some(&first.ownership),
/// }).unwrap();
/// assert_eq!(second.action, Action::NoAction);
/// ```
pub fn reconcile(config: &ReconcileConfig, input: &CycleInput<'_>) -> Result<CycleOutcome> {
    let ignore = IgnoreFilter::from_paths(config.ignore_fields.iter().cloned());
    let mode = config.merge_key_match;

    let desired_paths = ignore.filter(&extract(input.desired, &config.array_policy));

    let entries = entries_from_live(input.live)?;
    let owned = ignore.filter(&owned_paths(&entries, input.desired, config)?);

    let new_projection = project_with_mode(input.live, &owned, mode)?;
    let stored_tree = parse_blob(input.stored_projection, "stored projection")?;
    let stored_projection = match project_with_mode(&stored_tree, &owned, mode) {
        Ok(projection) => projection,
        Err(Error::FieldPath(err)) => {
            // A baseline written under another shape cannot match the live one.
            tracing::debug!(error = %err, "stored projection does not fit owned paths");
            Value::Null
        }
        Err(err) => return Err(err),
    };

    let stored_ownership = match input.stored_ownership {
        Some(text) => OwnershipMap::from_persisted(text)?,
        None => OwnershipMap::new(),
    };

    let analysis = analyze(&DriftInput {
        stored_projection: &stored_projection,
        new_projection: &new_projection,
        ownership: &stored_ownership,
        desired_paths: &desired_paths,
        field_manager: &config.field_manager,
        force: config.force_conflicts,
        policy: &config.array_policy,
    });

    let live_ownership = OwnershipMap::from_entries(&entries, input.live, config)?;

    Ok(CycleOutcome {
        action: analysis.action,
        value_drift: analysis.value_drift,
        conflicts: analysis.conflicts,
        projection: stringify(&new_projection),
        ownership: live_ownership.to_persisted(&config.bookkeeping_prefixes),
        owned_paths: owned,
        desired_paths,
    })
}
