use std::cmp::Ordering;

/// Packs up to the first eight key bytes big-endian into a `u64`.
///
/// Ordering by score agrees with lexicographic ordering of the keys except
/// when two keys share their first eight bytes (or one is a zero-padded
/// prefix of the other); those ties go to [`compare`]'s full key comparison.
#[inline]
pub fn score(key: &[u8]) -> u64 {
    let mut prefix = [0u8; 8];
    let n = key.len().min(prefix.len());
    prefix[..n].copy_from_slice(&key[..n]);
    u64::from_be_bytes(prefix)
}

/// Orders a candidate `(score, key)` against a node's `(score, key)`.
///
/// Returns `Equal` only for byte-identical keys.
#[inline]
pub fn compare(score: u64, key: &[u8], node_score: u64, node_key: &[u8]) -> Ordering {
    match score.cmp(&node_score) {
        Ordering::Equal => key.cmp(node_key),
        ord => ord,
    }
}
