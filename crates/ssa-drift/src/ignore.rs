use ssa_drift_fieldpath::{FieldPath, PathSet};

use crate::error::Result;

/// Removes ignored subtrees from path sets.
///
/// A path is ignored when a pattern equals it or is one of its ancestors,
/// compared step by step: `metadata.label` does not ignore `metadata.labels`.
///
/// # Example
///
/// ```
/// use ssa_drift::IgnoreFilter;
///
/// let filter = IgnoreFilter::new(["metadata.annotations"]).unwrap();
/// assert!(filter.is_ignored(&"metadata.annotations.app".parse().unwrap()));
/// assert!(!filter.is_ignored(&"metadata.annotationsX".parse().unwrap()));
///
/// assert!(IgnoreFilter::new(["spec["]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreFilter {
    patterns: Vec<FieldPath>,
}

impl IgnoreFilter {
    /// Parse every pattern up front.
    ///
    /// # Errors
    ///
    /// `MalformedPath` for the first pattern that does not parse.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().parse::<FieldPath>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn from_paths(patterns: impl IntoIterator<Item = FieldPath>) -> Self {
        Self {
            patterns: patterns.into_iter().collect(),
        }
    }

    pub fn is_ignored(&self, path: &FieldPath) -> bool {
        self.patterns.iter().any(|pattern| path.starts_with(pattern))
    }

    pub fn filter(&self, paths: &PathSet) -> PathSet {
        paths.iter().filter(|p| !self.is_ignored(p)).cloned().collect()
    }

    pub fn patterns(&self) -> &[FieldPath] {
        &self.patterns
    }
}

/// One-shot form of [`IgnoreFilter::filter`].
pub fn filter<S: AsRef<str>>(paths: &PathSet, patterns: &[S]) -> Result<PathSet> {
    Ok(IgnoreFilter::new(patterns)?.filter(paths))
}
