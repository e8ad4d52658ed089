//! # Wire and Storage Serialization
//!
//! Two byte-level shapes for the same filter:
//!
//! The **peer-wire record** is the compact form exchanged with peers. The
//! SipHash key travels out of band (it is derived from the block hash both
//! sides already know):
//!
//! ```text
//! P       : u8           Rice parameter
//! M       : u32 LE       false-positive divisor
//! N       : CompactSize  element count
//! stream  : [u8]         Golomb-Rice coded deltas, zero-padded
//! ```
//!
//! The **storage record** ([`FilterRecord`]) is self-contained: it carries
//! the key as well and serializes through bincode for the local store.
//!
//! Decoding either shape forces one full stream decode before the filter is
//! handed out, so a count/stream mismatch surfaces here instead of at first
//! query time. The successful decode primes the filter's memo, meaning
//! wire-sourced filters answer their first query without re-decoding.
//!
//! The content hash lives here too: `filter_hash()` is the double-SHA256 of
//! the peer-wire record, which is exactly what a peer computes over the raw
//! payload it received.

pub mod varint;

use serde::{Deserialize, Serialize};

use crate::domain::filter::GcsFilter;
use crate::domain::header_chain::{combine, double_sha256, FilterHash, FilterHeader};
use crate::domain::params::{FilterParams, SipKey};
use crate::error::FilterError;

use self::varint::{read_varint, write_varint};

/// Self-contained storage form of a filter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRecord {
    /// Rice parameter
    pub bits: u8,
    /// False-positive divisor
    pub fp_rate: u32,
    /// Element count
    pub count: u32,
    /// SipHash key
    pub key: [u8; 16],
    /// Golomb-Rice coded stream
    pub filter: Vec<u8>,
}

impl GcsFilter {
    /// Canonical peer-wire encoding of this filter.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        let stream = self.compressed_bytes();
        let mut out = Vec::with_capacity(1 + 4 + 9 + stream.len());
        out.push(self.golomb_p());
        out.extend_from_slice(&self.fp_divisor().to_le_bytes());
        write_varint(&mut out, u64::from(self.element_count()));
        out.extend_from_slice(stream);
        out
    }

    /// Decode a peer-wire record under the given key.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` for structural problems, parameter errors
    /// for an unusable `P`/`M`, and `TruncatedStream`/`ValueOverflow` when
    /// the declared count disagrees with the stream.
    pub fn from_wire_bytes(key: SipKey, data: &[u8]) -> Result<Self, FilterError> {
        if data.len() < 5 {
            return Err(FilterError::MalformedRecord(format!(
                "wire record too short: {} bytes",
                data.len()
            )));
        }
        let p = data[0];
        let mut m_bytes = [0u8; 4];
        m_bytes.copy_from_slice(&data[1..5]);
        let m = u32::from_le_bytes(m_bytes);

        let (count, consumed) = read_varint(&data[5..])?;
        let n = u32::try_from(count).map_err(|_| FilterError::TooManyElements { count })?;
        let compressed = data[5 + consumed..].to_vec();

        if n == 0 && !compressed.is_empty() {
            return Err(FilterError::MalformedRecord(
                "empty filter carries stream bytes".into(),
            ));
        }

        let params = FilterParams::new(p, m, key)?;
        validated(GcsFilter::from_parts(params, n, compressed)?)
    }

    /// Storage form of this filter, key included.
    pub fn to_record(&self) -> FilterRecord {
        FilterRecord {
            bits: self.golomb_p(),
            fp_rate: self.fp_divisor(),
            count: self.element_count(),
            key: *self.key(),
            filter: self.compressed_bytes().to_vec(),
        }
    }

    /// Rebuild a filter from its storage form.
    ///
    /// # Errors
    ///
    /// Same validation as [`GcsFilter::from_wire_bytes`].
    pub fn from_record(record: FilterRecord) -> Result<Self, FilterError> {
        if record.count == 0 && !record.filter.is_empty() {
            return Err(FilterError::MalformedRecord(
                "empty filter carries stream bytes".into(),
            ));
        }
        let params = FilterParams::new(record.bits, record.fp_rate, record.key)?;
        validated(GcsFilter::from_parts(params, record.count, record.filter)?)
    }

    /// Bincode bytes of the storage record.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if bincode fails.
    pub fn to_storage_bytes(&self) -> Result<Vec<u8>, FilterError> {
        bincode::serialize(&self.to_record())
            .map_err(|e| FilterError::SerializationError(e.to_string()))
    }

    /// Rebuild a filter from bincode storage bytes.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` for undecodable bytes, then the same
    /// validation as [`GcsFilter::from_record`].
    pub fn from_storage_bytes(bytes: &[u8]) -> Result<Self, FilterError> {
        let record: FilterRecord = bincode::deserialize(bytes)
            .map_err(|e| FilterError::SerializationError(e.to_string()))?;
        Self::from_record(record)
    }

    /// Content hash: double-SHA256 over the peer-wire record.
    ///
    /// The key is not part of the hash; peers recover it from the block
    /// hash and verify against headers computed over the raw payload.
    pub fn filter_hash(&self) -> FilterHash {
        double_sha256(&self.to_wire_bytes())
    }

    /// Chained header committing to this filter and all predecessors.
    pub fn header(&self, previous: &FilterHeader) -> FilterHeader {
        combine(&self.filter_hash(), previous)
    }
}

/// Force one decode so externally-sourced streams are checked against their
/// declared count before the filter escapes. Success primes the memo.
fn validated(filter: GcsFilter) -> Result<GcsFilter, FilterError> {
    if let Err(err) = filter.decompressed() {
        return Err(err);
    }
    Ok(filter)
}
