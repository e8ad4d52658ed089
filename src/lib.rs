//! # Compact Filters
//!
//! Compact block filter engine (Golomb-coded sets) for light client
//! support, in the BIP 157/158 mold: the node builds one deterministic
//! filter per block, every client downloads the identical bytes, and
//! watch-list matching happens locally.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure filter logic, no I/O
//!   - `FilterParams` / `FilterKind`: parameters and the standard kind table
//!   - `hashing`: SipHash-2-4 plus multiply-high range reduction
//!   - `hashed_set`: dedup, hash, sort
//!   - `golomb`: the Golomb-Rice bitstream codec
//!   - `GcsFilter`: immutable filter entity with a memoized decode
//!   - match engine: `contains`, `match_any`, `match_targets`,
//!     `match_prehashed`
//!   - `FilterHeader` / `FilterHeaderChain`: chained commitments
//!
//! - **Wire Layer** (`wire/`): byte-exact codecs
//!   - the peer-wire record and the bincode storage record
//!
//! - **Ports Layer** (`ports/`): trait seams
//!   - `BlockElementProvider`: where block data comes from
//!
//! - **Service Layer** (`service/`): orchestration
//!   - `FilterService`: builds, caches, ingests, and queries filters
//!
//! ## Invariants
//!
//! - **No false negatives**: every committed element tests positive
//! - **Determinism**: same elements, same parameters, same bytes
//! - **Immutability**: a filter never changes after construction; the
//!   decode memo is derived state, filled at most once
//!
//! ## Usage Example
//!
//! ```ignore
//! use compact_filters::{FilterKind, FilterService};
//! use std::sync::Arc;
//!
//! // The provider is implemented by the embedding node
//! let service = FilterService::new(Arc::new(provider));
//!
//! // Serving side: wire bytes and chained header for a block
//! let wire = service.wire_filter_for_block(FilterKind::Basic, &block_hash)?;
//! let header = service.header_for_block(FilterKind::Basic, &block_hash, &previous)?;
//!
//! // Client side: ingest and query locally
//! service.ingest_verified_wire_filter(
//!     FilterKind::Basic, &block_hash, &wire, &previous, &header,
//! )?;
//! let relevant = service.block_matches(FilterKind::Basic, &block_hash, &watch_list)?;
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod wire;

// Re-exports for convenience
pub use config::FilterServiceConfig;
pub use domain::{
    combine, verify_header_sequence, BlockHash, FilterHash, FilterHeader, FilterHeaderChain,
    FilterKind, FilterParams, GcsFilter, SipKey, STANDARD_FP_DIVISOR, STANDARD_GOLOMB_P,
};
pub use domain::hashing::key_from_block_hash;
pub use error::{FilterError, ProviderError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::BlockElementProvider;
pub use service::FilterService;
pub use wire::FilterRecord;
