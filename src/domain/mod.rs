//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Filter parameters and the standard kind table
//! - SipHash-2-4 keyed hashing with multiply-high range reduction
//! - Hashed-set construction (dedup, hash, sort)
//! - Golomb-Rice bitstream codec
//! - The immutable filter entity with its memoized decode
//! - Match engine (single probe and merge-based batch matching)
//! - Filter header chain
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod filter;
pub mod golomb;
pub mod hashed_set;
pub mod hashing;
pub mod header_chain;
pub mod matcher;
pub mod params;

pub use filter::GcsFilter;
pub use header_chain::{
    combine, verify_header_sequence, FilterHash, FilterHeader, FilterHeaderChain,
};
pub use params::{
    BlockHash, FilterKind, FilterParams, SipKey, FILTER_VERSION, STANDARD_FP_DIVISOR,
    STANDARD_GOLOMB_P,
};
