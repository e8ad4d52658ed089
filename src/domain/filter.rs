//! # Compact Block Filters (Golomb-Coded Sets)
//!
//! Privacy-preserving per-block digests in the BIP 158 mold.
//!
//! ## Problem
//!
//! Client-side filtering (BIP 37 style) makes light clients upload their
//! watch lists, which leaks every address they own.
//!
//! ## Solution: Node-Side Filters
//!
//! 1. The node builds one deterministic filter per block
//! 2. Every client downloads the identical filter
//! 3. Membership checks run locally, so the watch list never leaves the client
//!
//! The filter is a Golomb-coded set: elements are SipHashed into a sparse
//! range and the sorted values are delta-compressed. A false-positive rate
//! of roughly `1/M` costs about `P + 2` bits per element.
//!
//! ## Immutability
//!
//! `GcsFilter` never changes after construction. The only mutable-looking
//! state is a write-once memo holding the decoded value set; it is derived,
//! never serialized, and excluded from equality.

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::error::FilterError;

use super::golomb;
use super::hashed_set;
use super::hashing;
use super::params::{BlockHash, FilterKind, FilterParams, SipKey, FILTER_VERSION};

/// Immutable Golomb-coded set filter for one block
#[derive(Clone, Debug)]
pub struct GcsFilter {
    /// Schema version for forward compatibility
    version: u8,
    /// Hashing and encoding parameters
    params: FilterParams,
    /// Number of hashed values in the compressed stream
    n: u32,
    /// Golomb-Rice encoded deltas
    compressed: Vec<u8>,
    /// Write-once memo of the decoded value set
    decompressed: OnceCell<Vec<u64>>,
}

impl GcsFilter {
    /// Build a filter from raw candidate elements.
    ///
    /// Empty elements are dropped and duplicates count once, so the same
    /// logical set always produces byte-identical output regardless of
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters or an element count that
    /// does not fit in u32.
    pub fn from_elements<I, A>(params: FilterParams, elements: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        params.validate()?;

        let values = hashed_set::build(&params.key, params.m, elements)?;
        let n = values.len() as u32;
        let compressed = golomb::encode(params.p, &values);

        Ok(Self {
            version: FILTER_VERSION,
            params,
            n,
            compressed,
            decompressed: OnceCell::new(),
        })
    }

    /// Reassemble a filter from previously-serialized parts.
    ///
    /// The stream is not decoded here; validation happens on first use.
    /// Wire and storage decoding wrap this and force that first decode, so
    /// externally-sourced bytes never skip validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn from_parts(
        params: FilterParams,
        n: u32,
        compressed: Vec<u8>,
    ) -> Result<Self, FilterError> {
        params.validate()?;

        Ok(Self {
            version: FILTER_VERSION,
            params,
            n,
            compressed,
            decompressed: OnceCell::new(),
        })
    }

    /// Build a standard filter for a block: parameters come from the kind
    /// table and the key is derived from the block hash.
    pub fn for_block<I, A>(
        kind: FilterKind,
        block_hash: &BlockHash,
        elements: I,
    ) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        let key = hashing::key_from_block_hash(block_hash);
        Self::from_elements(kind.params(key), elements)
    }

    /// Schema version of this filter.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Hashing and encoding parameters.
    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// SipHash key the elements were hashed under.
    pub fn key(&self) -> &SipKey {
        &self.params.key
    }

    /// Rice parameter of the compressed stream.
    pub fn golomb_p(&self) -> u8 {
        self.params.p
    }

    /// False-positive divisor.
    pub fn fp_divisor(&self) -> u32 {
        self.params.m
    }

    /// Number of elements committed to the filter.
    pub fn element_count(&self) -> u32 {
        self.n
    }

    /// True if no elements were committed.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Raw compressed stream.
    pub fn compressed_bytes(&self) -> &[u8] {
        &self.compressed
    }

    /// Size of the compressed stream in bytes.
    pub fn size_bytes(&self) -> usize {
        self.compressed.len()
    }

    /// Upper bound (exclusive) of the hashed value space: `N * M`.
    pub fn value_range(&self) -> u64 {
        u64::from(self.n) * u64::from(self.params.m)
    }

    /// The decoded, sorted hashed value set.
    ///
    /// The first successful decode is memoized, so repeated queries pay the
    /// Golomb-Rice cost once. A failed decode is returned every time and
    /// never cached, which keeps corrupt streams observable on retry.
    ///
    /// # Errors
    ///
    /// Returns `TruncatedStream` or `ValueOverflow` when the stream does
    /// not contain exactly `element_count()` well-formed codes.
    pub fn decompressed(&self) -> Result<&[u64], FilterError> {
        if self.n == 0 {
            // Empty filters carry no stream and never decode
            return Ok(&[]);
        }

        self.decompressed
            .get_or_try_init(|| {
                golomb::decode(self.params.p, &self.compressed, self.n).map_err(|err| {
                    warn!(
                        n = self.n,
                        p = self.params.p,
                        stream_len = self.compressed.len(),
                        error = %err,
                        "filter stream failed to decode"
                    );
                    err
                })
            })
            .map(Vec::as_slice)
    }

    /// Hash a query target into this filter's value range.
    pub(crate) fn target_value(&self, target: &[u8]) -> u64 {
        hashing::hash_to_range(&self.params.key, target, self.value_range())
    }
}

/// Identity covers the serialized fields only; the memo is derived state.
impl PartialEq for GcsFilter {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.params == other.params
            && self.n == other.n
            && self.compressed == other.compressed
    }
}

impl Eq for GcsFilter {}
