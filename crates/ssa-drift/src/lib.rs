//! Drift and ownership-conflict detection for server-side-apply managed
//! resources.
//!
//! Given a desired object, the live object with its `metadata.managedFields`,
//! and the projection persisted by the previous cycle, [`reconcile`] decides
//! whether the resource drifted and whether reapplying it would take fields
//! away from another field manager.
//!
//! The pieces are usable on their own:
//!
//! - [`extract`](extract::extract) lists the leaf paths of a tree,
//! - [`owned_paths`](ownership::owned_paths) resolves managed-field claims,
//! - [`project`](project::project) cuts a tree down to a path set,
//! - [`IgnoreFilter`] drops ignored subtrees,
//! - [`analyze`](analyze::analyze) reduces everything to an [`Action`].
//!
//! Paths and merge keys live in [`ssa_drift_fieldpath`].

pub mod analyze;
pub mod config;
pub mod error;
pub mod extract;
pub mod ignore;
pub mod ownership;
pub mod policy;
pub mod project;
pub mod reconcile;

pub use analyze::{Action, Analysis, Conflict, DriftInput};
pub use config::ReconcileConfig;
pub use error::{Error, Result};
pub use ignore::IgnoreFilter;
pub use ownership::{ManagedFieldsEntry, OwnershipClaim, OwnershipMap};
pub use policy::{ArrayKind, ArrayPolicy};
pub use reconcile::{reconcile, CycleInput, CycleOutcome};
pub use ssa_drift_fieldpath::{FieldPath, MatchMode, PathSet};
