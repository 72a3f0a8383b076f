//! Category breakdowns with zero-filled missing categories

/// Merge observed counts onto the full `expected` category list.
///
/// The result has exactly one entry per expected category, in `expected`
/// order; categories absent from `observed` get 0 and duplicates are summed.
/// Observed categories outside `expected` are dropped.
pub fn zero_fill<K: Copy + PartialEq>(expected: &[K], observed: &[(K, i64)]) -> Vec<(K, i64)> {
    expected
        .iter()
        .map(|category| {
            let count = observed
                .iter()
                .filter(|(k, _)| k == category)
                .map(|(_, c)| c)
                .sum();
            (*category, count)
        })
        .collect()
}
