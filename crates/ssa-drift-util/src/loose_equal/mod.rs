//! Loose equality for JSON values.
//!
//! The remote API normalizes scalar representations (a quantity written as
//! `"1"` may come back as `1`), so every leaf comparison in ssa-drift goes
//! through [`loose_scalar_eq`].

mod deep_equal;
mod scalar;

pub use deep_equal::loose_deep_equal;
pub use scalar::{loose_scalar_eq, loose_scalar_key, scalar_string};
