//! String ordering used by browse views and the track sort.

use std::cmp::Ordering;

/// Alphabetical order for display names.
///
/// Case-insensitive first; names that differ only by case fall back to byte
/// order so the result is total and deterministic.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold_cmp(a, b).then_with(|| a.cmp(b))
}

/// Case-insensitive comparison with no tie-break.
///
/// Used by the track sort, where equal keys must compare equal so a stable
/// sort keeps catalog order.
pub fn fold_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
