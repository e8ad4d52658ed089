//! Filter Service
//!
//! Orchestrates the domain logic behind two roles:
//!
//! - **Serving node**: pull a block's elements through the provider port,
//!   build the deterministic filter, serve its wire bytes and chained
//!   header. Filters are immutable, so one build serves every client.
//! - **Light client**: ingest wire filters from peers (optionally checked
//!   against a claimed header) and answer watch-list queries locally.
//!
//! Built and ingested filters land in one LRU cache keyed by
//! `(kind, block_hash)`, shared behind `&self` so callers can query
//! concurrently.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use lru::LruCache;

use crate::config::FilterServiceConfig;
use crate::domain::hashing::key_from_block_hash;
use crate::domain::header_chain::FilterHeader;
use crate::domain::params::{BlockHash, FilterKind};
use crate::domain::GcsFilter;
use crate::error::FilterError;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::ports::BlockElementProvider;

/// Application service for building, caching, and querying block filters
pub struct FilterService<P: BlockElementProvider> {
    /// Block element provider (driven port)
    provider: Arc<P>,
    /// Operational configuration
    config: FilterServiceConfig,
    /// Decoded filters by (kind, block hash)
    cache: Mutex<LruCache<(FilterKind, BlockHash), Arc<GcsFilter>>>,
    /// Engine metrics
    metrics: Arc<Metrics>,
}

impl<P: BlockElementProvider> FilterService<P> {
    /// Create a new service with the given element provider
    pub fn new(provider: Arc<P>) -> Self {
        Self::with_config(provider, FilterServiceConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(provider: Arc<P>, config: FilterServiceConfig) -> Self {
        let cache_size = NonZeroUsize::new(config.filter_cache_size)
            .unwrap_or(NonZeroUsize::new(crate::config::DEFAULT_FILTER_CACHE_SIZE).unwrap());
        Self {
            provider,
            config,
            cache: Mutex::new(LruCache::new(cache_size)),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Get or build the filter for a block.
    ///
    /// Cache hits return the shared instance; a miss pulls the block's
    /// elements through the provider and builds deterministically.
    ///
    /// # Errors
    ///
    /// Propagates provider failures and construction errors.
    pub fn filter_for_block(
        &self,
        kind: FilterKind,
        block_hash: &BlockHash,
    ) -> Result<Arc<GcsFilter>, FilterError> {
        if let Some(filter) = self.cache_get(kind, block_hash) {
            self.metrics.record_cache_lookup(true);
            return Ok(filter);
        }
        self.metrics.record_cache_lookup(false);

        let elements = self.provider.block_elements(kind, block_hash)?;
        let filter = Arc::new(GcsFilter::for_block(kind, block_hash, &elements)?);
        self.metrics.record_filter_built(
            u64::from(filter.element_count()),
            filter.size_bytes() as u64,
        );
        tracing::debug!(
            "Built {} filter for block {}: {} elements, {} bytes",
            kind,
            short_hash(block_hash),
            filter.element_count(),
            filter.size_bytes()
        );

        self.cache_put(kind, block_hash, Arc::clone(&filter));
        Ok(filter)
    }

    /// Peer-wire bytes of a block's filter, for serving
    ///
    /// # Errors
    ///
    /// Same failure modes as [`FilterService::filter_for_block`].
    pub fn wire_filter_for_block(
        &self,
        kind: FilterKind,
        block_hash: &BlockHash,
    ) -> Result<Vec<u8>, FilterError> {
        Ok(self.filter_for_block(kind, block_hash)?.to_wire_bytes())
    }

    /// Chained header for a block's filter
    ///
    /// # Errors
    ///
    /// Same failure modes as [`FilterService::filter_for_block`].
    pub fn header_for_block(
        &self,
        kind: FilterKind,
        block_hash: &BlockHash,
        previous: &FilterHeader,
    ) -> Result<FilterHeader, FilterError> {
        Ok(self.filter_for_block(kind, block_hash)?.header(previous))
    }

    /// Decode a peer's wire filter and cache it for queries.
    ///
    /// The SipHash key is derived from the block hash; the stream is
    /// validated against its declared element count before caching.
    ///
    /// # Errors
    ///
    /// Returns decode and validation errors; nothing is cached on failure.
    pub fn ingest_wire_filter(
        &self,
        kind: FilterKind,
        block_hash: &BlockHash,
        data: &[u8],
    ) -> Result<Arc<GcsFilter>, FilterError> {
        let key = key_from_block_hash(block_hash);
        let filter = match GcsFilter::from_wire_bytes(key, data) {
            Ok(filter) => {
                self.metrics.record_decode(true);
                Arc::new(filter)
            }
            Err(err) => {
                self.metrics.record_decode(false);
                tracing::warn!(
                    "Rejected wire filter for block {}: {}",
                    short_hash(block_hash),
                    err
                );
                return Err(err);
            }
        };

        self.cache_put(kind, block_hash, Arc::clone(&filter));
        Ok(filter)
    }

    /// Decode a peer's wire filter and verify it extends the header chain.
    ///
    /// The filter is only cached if `dsha256(filter_hash || previous)`
    /// equals the header claimed for it, so an altered filter cannot enter
    /// the cache.
    ///
    /// # Errors
    ///
    /// Returns `HeaderMismatch` when the claimed header does not commit to
    /// this filter, plus the decode errors of
    /// [`FilterService::ingest_wire_filter`].
    pub fn ingest_verified_wire_filter(
        &self,
        kind: FilterKind,
        block_hash: &BlockHash,
        data: &[u8],
        previous: &FilterHeader,
        claimed: &FilterHeader,
    ) -> Result<Arc<GcsFilter>, FilterError> {
        let key = key_from_block_hash(block_hash);
        let filter = match GcsFilter::from_wire_bytes(key, data) {
            Ok(filter) => filter,
            Err(err) => {
                self.metrics.record_decode(false);
                return Err(err);
            }
        };
        self.metrics.record_decode(true);

        let computed = filter.header(previous);
        if computed != *claimed {
            tracing::warn!(
                "Filter for block {} does not match claimed header (computed {}, claimed {})",
                short_hash(block_hash),
                computed,
                claimed
            );
            return Err(FilterError::HeaderMismatch {
                computed,
                claimed: *claimed,
            });
        }

        let filter = Arc::new(filter);
        self.cache_put(kind, block_hash, Arc::clone(&filter));
        Ok(filter)
    }

    /// Test a watch list against a block, short-circuiting on the first hit.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`FilterService::filter_for_block`].
    pub fn block_matches(
        &self,
        kind: FilterKind,
        block_hash: &BlockHash,
        watch_list: &[Vec<u8>],
    ) -> Result<bool, FilterError> {
        let filter = self.filter_for_block(kind, block_hash)?;

        let start = Instant::now();
        let matched = filter.match_any(watch_list);
        self.metrics.record_query(start.elapsed(), matched);

        if self.config.trace_queries {
            tracing::debug!(
                "Queried {} targets against block {}: matched={}",
                watch_list.len(),
                short_hash(block_hash),
                matched
            );
        }
        Ok(matched)
    }

    /// Which watch-list targets a block possibly contains.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`FilterService::filter_for_block`].
    pub fn matching_targets<'t>(
        &self,
        kind: FilterKind,
        block_hash: &BlockHash,
        targets: &'t [Vec<u8>],
    ) -> Result<Vec<&'t [u8]>, FilterError> {
        let filter = self.filter_for_block(kind, block_hash)?;

        let start = Instant::now();
        let matched = filter.match_targets(targets);
        self.metrics.record_query(start.elapsed(), !matched.is_empty());

        if self.config.trace_queries {
            tracing::debug!(
                "Matched {}/{} targets against block {}",
                matched.len(),
                targets.len(),
                short_hash(block_hash)
            );
        }
        Ok(matched)
    }

    /// Point-in-time metrics snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Shared handle to the live metrics, e.g. for an exporter
    pub fn metrics_handle(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    fn cache_get(&self, kind: FilterKind, block_hash: &BlockHash) -> Option<Arc<GcsFilter>> {
        let mut cache = self.cache.lock().unwrap();
        cache.get(&(kind, *block_hash)).map(Arc::clone)
    }

    fn cache_put(&self, kind: FilterKind, block_hash: &BlockHash, filter: Arc<GcsFilter>) {
        let mut cache = self.cache.lock().unwrap();
        cache.put((kind, *block_hash), filter);
    }
}

fn short_hash(block_hash: &BlockHash) -> String {
    hex::encode(&block_hash[..8])
}
