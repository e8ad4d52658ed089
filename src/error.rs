//! Error types for the compact filter engine

use thiserror::Error;

use crate::domain::header_chain::FilterHeader;

/// Errors that can occur while building, decoding, or serializing filters
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid Golomb-Rice parameter: p = {p} (must be between 1 and 31)")]
    InvalidGolombParameter { p: u8 },

    #[error("Invalid false-positive divisor: m must be non-zero")]
    InvalidFalsePositiveDivisor,

    #[error("Too many elements: {count} exceeds the u32 element-count limit")]
    TooManyElements { count: u64 },

    #[error("Truncated filter stream: decoded {decoded} of {expected} elements")]
    TruncatedStream { expected: u32, decoded: u32 },

    #[error("Filter stream overflowed the value range after {decoded} elements")]
    ValueOverflow { decoded: u32 },

    #[error("Malformed filter record: {0}")]
    MalformedRecord(String),

    #[error("Unknown filter kind: {code:#04x}")]
    UnknownFilterKind { code: u8 },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Filter header mismatch: computed {computed}, claimed {claimed}")]
    HeaderMismatch {
        computed: FilterHeader,
        claimed: FilterHeader,
    },

    #[error("Element provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Errors from block element providers
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Block not found: {}", hex::encode(.block_hash))]
    BlockNotFound { block_hash: [u8; 32] },

    #[error("Element extraction failed: {0}")]
    Extraction(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout")]
    Timeout,
}
