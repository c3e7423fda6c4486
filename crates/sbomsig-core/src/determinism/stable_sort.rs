//! Stable sorting utilities.
//!
//! Canonical output must never depend on map iteration order (serde_json's map
//! type changes with the `preserve_order` feature). These helpers make the
//! ordering rule explicit.

/// Sort (K, V) pairs by key. Keys are unique in a JSON object, so stability is moot.
///
/// `str` ordering compares UTF-8 bytes, which is ordering by Unicode code point.
pub fn stable_sort_pairs<K, V>(items: &mut [(K, V)])
where
    K: Ord,
{
    items.sort_by(|a, b| a.0.cmp(&b.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_sort_by_code_point() {
        let mut v = vec![("b", 1), ("B", 2), ("\u{e9}", 3), ("a", 4)];
        stable_sort_pairs(&mut v);
        let keys: Vec<&str> = v.iter().map(|p| p.0).collect();
        assert_eq!(keys, vec!["B", "a", "b", "\u{e9}"]);
    }
}
