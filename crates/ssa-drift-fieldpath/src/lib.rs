//! Field path algebra for server-side-apply style trees.
//!
//! A field path addresses a value inside nested maps and arrays. Arrays are
//! addressed positionally (`args[0]`) or by the merge key of their elements
//! (`containers[name=app]`), following Kubernetes list conventions.
//!
//! # Example
//!
//! ```
//! use ssa_drift_fieldpath::{get, set, FieldPath};
//! use serde_json::json;
//!
//! let doc = json!({"spec": {"containers": [{"name": "app", "image": "nginx:1.25"}]}});
//! let path: FieldPath = "spec.containers[name=app].image".parse().unwrap();
//! assert_eq!(get(&doc, &path).unwrap(), Some(&json!("nginx:1.25")));
//!
//! let mut out = json!({});
//! set(&mut out, &path, json!("nginx:1.25")).unwrap();
//! assert_eq!(out, json!({"spec": {"containers": [{"name": "app", "image": "nginx:1.25"}]}}));
//! ```

use thiserror::Error;

pub mod get;
pub mod merge_key;
pub mod parse;
pub mod set;
pub mod types;
pub mod validate;
mod util;

pub use get::{get, get_with_mode, locate_with_mode, Located};
pub use merge_key::{
    find_index, find_value_index, format_key_token, parse_key_token, parse_value_token,
    FIELD_PREFIX, KEY_PREFIX, LEAF_MARKER, VALUE_PREFIX,
};
pub use parse::{format_field_path, parse_field_path};
pub use set::{set, set_with_mode};
pub use types::{FieldPath, KeyScalar, MatchMode, MergeKeyTuple, PathSet, Step};
pub use validate::{MAX_PATH_DEPTH, MAX_PATH_LENGTH};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldPathError {
    #[error("malformed path {path:?}: {reason}")]
    MalformedPath { path: String, reason: String },
    #[error("malformed merge key {token:?}: {reason}")]
    MalformedKey { token: String, reason: String },
    #[error("path longer than {} bytes", MAX_PATH_LENGTH)]
    PathTooLong,
    #[error("path deeper than {} steps", MAX_PATH_DEPTH)]
    PathTooDeep,
    #[error("shape mismatch at {path}: expected {expected}, found {found}")]
    ShapeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}
