//! Deterministic ordering helpers.
//!
//! Findings are reported in discovery order, so inputs are never sorted
//! behind the caller's back. These helpers only remove repeats while
//! keeping the first occurrence where it was.

use std::collections::HashSet;
use std::hash::Hash;

/// Drop repeated items, keeping each first occurrence in place.
pub fn dedup_preserving_order<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
