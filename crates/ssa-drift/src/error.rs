//! Error types.

use ssa_drift_fieldpath::FieldPathError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A path, merge-key token or tree shape could not be handled.
    #[error(transparent)]
    FieldPath(#[from] FieldPathError),
    /// A persisted projection or ownership map is not valid.
    #[error("malformed {what}: {source}")]
    MalformedBaseline {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// `metadata.managedFields` of the live object could not be read.
    #[error("malformed managedFields: {0}")]
    MalformedManagedFields(#[source] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
