use std::cmp::Ordering;

/// Stable insertion sort with a custom comparator.
///
/// Sorts in place without allocating. Used for the short object key lists of
/// canonical serialization.
///
/// # Examples
///
/// ```
/// use ssa_drift_util::sort::insertion_sort_by;
///
/// let mut keys = vec!["spec", "kind", "metadata", "apiVersion"];
/// insertion_sort_by(&mut keys, |a, b| a.cmp(b));
/// assert_eq!(keys, vec!["apiVersion", "kind", "metadata", "spec"]);
/// ```
pub fn insertion_sort_by<T, F>(arr: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..arr.len() {
        let mut j = i;
        while j > 0 && compare(&arr[j - 1], &arr[j]) == Ordering::Greater {
            arr.swap(j - 1, j);
            j -= 1;
        }
    }
}
