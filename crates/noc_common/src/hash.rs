//! Stable hashing over entity IDs.
//!
//! Used wherever a reproducible pseudo-random choice must be derived from
//! IDs alone (for example turn-model tie-breaking), so identical inputs pick
//! the same option on every run and every platform.

/// Hashes a sequence of raw IDs with XXH3-64.
///
/// The IDs are encoded little-endian before hashing, so the result does not
/// depend on host byte order.
pub fn stable_id_hash(ids: &[u32]) -> u64 {
    let mut bytes = Vec::with_capacity(ids.len() * 4);
    for id in ids {
        bytes.extend_from_slice(&id.to_le_bytes());
    }
    xxhash_rust::xxh3::xxh3_64(&bytes)
}
