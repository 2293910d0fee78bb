//! Field ownership from `metadata.managedFields`.
//!
//! [`owned_paths`] answers "which desired paths are mine", merging every
//! entry recorded for this field manager. [`OwnershipMap`] attributes every
//! claimed path to a single manager for conflict checks and persistence.

mod entry;
mod map;
mod resolve;
mod walk;

pub use entry::{entries_from_live, merge_claims, ManagedFieldsEntry, FIELDS_V1};
pub use map::{OwnerLookup, OwnershipClaim, OwnershipMap};
pub use resolve::owned_paths;
