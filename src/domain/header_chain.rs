//! # Filter Header Chain
//!
//! Every filter commits to its whole history: a filter header is the
//! double-SHA256 of the filter's content hash concatenated with the
//! previous header. A light client that trusts one header can verify a
//! batch of filters by refolding the chain and comparing tips; any
//! substituted filter changes every header after it.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content hash of a filter's canonical wire encoding
pub type FilterHash = [u8; 32];

/// Chained commitment over a filter and all of its predecessors
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterHeader([u8; 32]);

impl FilterHeader {
    /// All-zero predecessor used for the first filter in a chain.
    pub const fn genesis() -> Self {
        Self([0u8; 32])
    }

    /// Wrap raw header bytes, e.g. a checkpoint from trusted storage.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Header for the filter that follows this one.
    pub fn next(&self, filter_hash: &FilterHash) -> Self {
        combine(filter_hash, self)
    }

    /// Raw header bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for FilterHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for FilterHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilterHeader({})", hex::encode(self.0))
    }
}

/// Fold one filter hash into the chain: `dsha256(filter_hash || previous)`
pub fn combine(filter_hash: &FilterHash, previous: &FilterHeader) -> FilterHeader {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(filter_hash);
    data[32..].copy_from_slice(previous.as_bytes());
    FilterHeader(double_sha256(&data))
}

/// Double SHA-256, the hash used throughout the header chain
pub(crate) fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// Rolling tip of a filter header chain
///
/// Holds the latest verified header and how many filters were folded into
/// it. Extending is infallible; verification against claimed headers is a
/// separate batch check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterHeaderChain {
    tip: FilterHeader,
    filters_committed: u64,
}

impl FilterHeaderChain {
    /// Start a chain from a trusted header, e.g. a checkpoint.
    pub fn new(trusted_tip: FilterHeader) -> Self {
        Self {
            tip: trusted_tip,
            filters_committed: 0,
        }
    }

    /// Start a chain from the all-zero genesis predecessor.
    pub fn genesis() -> Self {
        Self::new(FilterHeader::genesis())
    }

    /// Latest header in the chain.
    pub fn tip(&self) -> &FilterHeader {
        &self.tip
    }

    /// Number of filters folded in since the trusted starting point.
    pub fn filters_committed(&self) -> u64 {
        self.filters_committed
    }

    /// Fold the next filter hash into the chain and return the new tip.
    pub fn extend(&mut self, filter_hash: &FilterHash) -> FilterHeader {
        self.tip = self.tip.next(filter_hash);
        self.filters_committed += 1;
        self.tip
    }
}

/// Check a peer's claimed header sequence against the filter hashes
///
/// Refolds the chain from `previous` over `filter_hashes` and compares each
/// step with the claimed headers. Returns false on any mismatch, including
/// a length mismatch.
pub fn verify_header_sequence(
    previous: &FilterHeader,
    filter_hashes: &[FilterHash],
    claimed: &[FilterHeader],
) -> bool {
    if filter_hashes.len() != claimed.len() {
        return false;
    }

    let mut current = *previous;
    for (filter_hash, claimed_header) in filter_hashes.iter().zip(claimed) {
        current = current.next(filter_hash);
        if current != *claimed_header {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(n: u8) -> FilterHash {
        [n; 32]
    }

    #[test]
    fn test_genesis_is_all_zero() {
        assert_eq!(FilterHeader::genesis().as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_combine_is_deterministic() {
        let header1 = combine(&make_hash(1), &FilterHeader::genesis());
        let header2 = combine(&make_hash(1), &FilterHeader::genesis());
        assert_eq!(header1, header2);
    }

    #[test]
    fn test_combine_depends_on_filter_hash() {
        let previous = FilterHeader::genesis();
        let header1 = combine(&make_hash(1), &previous);
        let header2 = combine(&make_hash(2), &previous);
        assert_ne!(header1, header2, "Different filters must produce different headers");
    }

    #[test]
    fn test_combine_depends_on_previous_header() {
        let previous1 = FilterHeader::from_bytes([0xAA; 32]);
        let previous2 = FilterHeader::from_bytes([0xBB; 32]);
        let header1 = combine(&make_hash(1), &previous1);
        let header2 = combine(&make_hash(1), &previous2);
        assert_ne!(header1, header2, "History must flow into every header");
    }

    #[test]
    fn test_chain_extend_tracks_count_and_tip() {
        let mut chain = FilterHeaderChain::genesis();

        let tip1 = chain.extend(&make_hash(1));
        let tip2 = chain.extend(&make_hash(2));

        assert_eq!(chain.filters_committed(), 2);
        assert_eq!(*chain.tip(), tip2);
        assert_ne!(tip1, tip2);

        // Same folds, same tip
        let mut replay = FilterHeaderChain::genesis();
        replay.extend(&make_hash(1));
        replay.extend(&make_hash(2));
        assert_eq!(replay.tip(), chain.tip());
    }

    #[test]
    fn test_verify_accepts_honest_sequence() {
        let hashes = vec![make_hash(1), make_hash(2), make_hash(3)];
        let mut chain = FilterHeaderChain::genesis();
        let claimed: Vec<FilterHeader> = hashes.iter().map(|h| chain.extend(h)).collect();

        assert!(verify_header_sequence(
            &FilterHeader::genesis(),
            &hashes,
            &claimed
        ));
    }

    #[test]
    fn test_verify_rejects_substituted_filter() {
        let hashes = vec![make_hash(1), make_hash(2), make_hash(3)];
        let mut chain = FilterHeaderChain::genesis();
        let claimed: Vec<FilterHeader> = hashes.iter().map(|h| chain.extend(h)).collect();

        let mut tampered = hashes.clone();
        tampered[1] = make_hash(99);

        assert!(
            !verify_header_sequence(&FilterHeader::genesis(), &tampered, &claimed),
            "A substituted filter hash must break verification"
        );
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let hashes = vec![make_hash(1), make_hash(2)];
        let claimed = vec![FilterHeader::genesis()];
        assert!(!verify_header_sequence(
            &FilterHeader::genesis(),
            &hashes,
            &claimed
        ));
    }

    #[test]
    fn test_display_renders_hex() {
        let header = FilterHeader::from_bytes([0xAB; 32]);
        let rendered = header.to_string();
        assert_eq!(rendered.len(), 64);
        assert!(rendered.starts_with("abab"));
    }
}
