//! Outbound Ports (Driven Ports)
//!
//! These traits define what the filter engine needs from the embedding
//! node (e.g., the block store or transaction index).

use crate::domain::params::{BlockHash, FilterKind};
use crate::error::ProviderError;

/// Block element provider (Driven Port)
///
/// Supplies the candidate byte strings a block contributes to a filter of
/// the given kind: for basic filters the created output scripts plus the
/// scripts being spent, for extended filters the auxiliary data set.
///
/// The provider returns raw bytes only; the engine owns deduplication, so
/// repeated or empty entries are fine.
pub trait BlockElementProvider: Send + Sync {
    /// Get all candidate elements for `block_hash` under `kind`
    ///
    /// # Errors
    ///
    /// Returns `BlockNotFound` for unknown hashes, or an extraction error
    /// when the block exists but its data cannot be read.
    fn block_elements(
        &self,
        kind: FilterKind,
        block_hash: &BlockHash,
    ) -> Result<Vec<Vec<u8>>, ProviderError>;
}
