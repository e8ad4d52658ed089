//! Keyed hashing for filter construction and queries
//!
//! Every element is hashed with SipHash-2-4 under the filter key, then
//! mapped onto `[0, N * M)` with a multiply-high reduction. Builder and
//! querier must agree bit-for-bit, so this module is the single home for
//! both steps.

use std::hash::Hasher;

use siphasher::sip::SipHasher24;

use super::params::{BlockHash, SipKey};

/// Hash `data` with SipHash-2-4 under `key`
///
/// The key is split little-endian: bytes 0..8 become k0, bytes 8..16
/// become k1.
pub fn siphash(key: &SipKey, data: &[u8]) -> u64 {
    let mut k0 = [0u8; 8];
    let mut k1 = [0u8; 8];
    k0.copy_from_slice(&key[0..8]);
    k1.copy_from_slice(&key[8..16]);

    let mut hasher = SipHasher24::new_with_keys(u64::from_le_bytes(k0), u64::from_le_bytes(k1));
    hasher.write(data);
    hasher.finish()
}

/// Map a 64-bit hash uniformly onto `[0, range)`
///
/// Multiply-high reduction: `(hash * range) >> 64` in 128-bit arithmetic.
/// Unlike a modulo this preserves uniformity without bias and costs one
/// widening multiply.
pub fn map_to_range(hash: u64, range: u64) -> u64 {
    ((u128::from(hash) * u128::from(range)) >> 64) as u64
}

/// Hash an element straight into a filter's value range
pub fn hash_to_range(key: &SipKey, element: &[u8], range: u64) -> u64 {
    map_to_range(siphash(key, element), range)
}

/// Derive the per-block SipHash key: the first 16 bytes of the block hash
pub fn key_from_block_hash(block_hash: &BlockHash) -> SipKey {
    let mut key = [0u8; 16];
    key.copy_from_slice(&block_hash[0..16]);
    key
}
