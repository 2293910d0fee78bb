//! ssa-drift-util - Utility functions shared by the ssa-drift crates.
//!
//! Everything here is a pure function over borrowed [`serde_json::Value`]s.

pub mod loose_equal;
pub mod sort;
pub mod stable;
pub mod strings;

// Re-exports for convenience
pub use loose_equal::{loose_deep_equal, loose_scalar_eq, loose_scalar_key, scalar_string};
pub use sort::insertion_sort_by;
pub use stable::stringify;
pub use strings::escape;
