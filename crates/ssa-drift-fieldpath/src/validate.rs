//! Size limits for field paths.
//!
//! Every walk in ssa-drift recurses at most once per path step, so capping the
//! step count caps recursion depth for paths that come from outside.

use crate::FieldPathError;

/// Maximum allowed path string length, in bytes.
pub const MAX_PATH_LENGTH: usize = 4096;

/// Maximum allowed number of steps in a path.
pub const MAX_PATH_DEPTH: usize = 256;

/// Validate the raw text of a path before parsing it.
///
/// # Example
///
/// ```
/// use ssa_drift_fieldpath::validate::validate_path_text;
///
/// validate_path_text("spec.replicas").unwrap();
/// validate_path_text(&"a".repeat(5000)).unwrap_err();
/// ```
pub fn validate_path_text(text: &str) -> Result<(), FieldPathError> {
    if text.len() > MAX_PATH_LENGTH {
        return Err(FieldPathError::PathTooLong);
    }
    Ok(())
}

/// Validate the step count of a parsed path.
pub fn validate_depth(depth: usize) -> Result<(), FieldPathError> {
    if depth > MAX_PATH_DEPTH {
        return Err(FieldPathError::PathTooDeep);
    }
    Ok(())
}
