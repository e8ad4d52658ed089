//! Metrics hooks for filter engine operations
//!
//! Thread-safe counters for monitoring build throughput, decode health,
//! cache behavior, and query latencies.
//!
//! ## Usage
//!
//! ```ignore
//! use compact_filters::metrics::Metrics;
//!
//! let metrics = Metrics::new();
//!
//! // Record a filter build
//! metrics.record_filter_built(1500, 3200);
//!
//! // Record a query
//! let start = std::time::Instant::now();
//! let matched = filter.match_any(&watch_list);
//! metrics.record_query(start.elapsed(), matched);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for filter engine operations
#[derive(Default)]
pub struct Metrics {
    /// Total filters built from elements
    pub filters_built: AtomicU64,
    /// Total elements committed across all built filters
    pub elements_committed: AtomicU64,
    /// Total compressed bytes produced
    pub compressed_bytes: AtomicU64,
    /// Total filter streams decoded successfully
    pub streams_decoded: AtomicU64,
    /// Total decode failures (truncated or overflowing streams)
    pub decode_failures: AtomicU64,
    /// Cache hits in the service filter cache
    pub cache_hits: AtomicU64,
    /// Cache misses in the service filter cache
    pub cache_misses: AtomicU64,
    /// Total membership queries answered
    pub queries_answered: AtomicU64,
    /// Queries that reported a (possible) match
    pub queries_positive: AtomicU64,
    /// Cumulative query time in nanoseconds
    pub query_time_ns: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a filter build
    ///
    /// # Arguments
    /// * `element_count` - Number of elements committed
    /// * `compressed_len` - Size of the compressed stream in bytes
    pub fn record_filter_built(&self, element_count: u64, compressed_len: u64) {
        self.filters_built.fetch_add(1, Ordering::Relaxed);
        self.elements_committed
            .fetch_add(element_count, Ordering::Relaxed);
        self.compressed_bytes
            .fetch_add(compressed_len, Ordering::Relaxed);
    }

    /// Record a stream decode attempt
    pub fn record_decode(&self, success: bool) {
        if success {
            self.streams_decoded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.decode_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a filter-cache lookup
    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a membership query
    ///
    /// # Arguments
    /// * `duration` - Time spent answering
    /// * `matched` - Whether anything (possibly falsely) matched
    pub fn record_query(&self, duration: Duration, matched: bool) {
        self.queries_answered.fetch_add(1, Ordering::Relaxed);
        self.query_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if matched {
            self.queries_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_built: self.filters_built.load(Ordering::Relaxed),
            elements_committed: self.elements_committed.load(Ordering::Relaxed),
            compressed_bytes: self.compressed_bytes.load(Ordering::Relaxed),
            streams_decoded: self.streams_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            queries_answered: self.queries_answered.load(Ordering::Relaxed),
            queries_positive: self.queries_positive.load(Ordering::Relaxed),
            avg_query_ns: self.avg_query_time_ns(),
        }
    }

    /// Calculate average query time in nanoseconds
    pub fn avg_query_time_ns(&self) -> u64 {
        let total = self.query_time_ns.load(Ordering::Relaxed);
        let count = self.queries_answered.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Ratio of positive queries to all queries
    ///
    /// Includes true positives, so this only approximates the false
    /// positive rate when the probed targets are known non-members.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.queries_answered.load(Ordering::Relaxed);
        let positive = self.queries_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Cache hit ratio over all cache lookups
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.filters_built.store(0, Ordering::Relaxed);
        self.elements_committed.store(0, Ordering::Relaxed);
        self.compressed_bytes.store(0, Ordering::Relaxed);
        self.streams_decoded.store(0, Ordering::Relaxed);
        self.decode_failures.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.queries_answered.store(0, Ordering::Relaxed);
        self.queries_positive.store(0, Ordering::Relaxed);
        self.query_time_ns.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    pub filters_built: u64,
    pub elements_committed: u64,
    pub compressed_bytes: u64,
    pub streams_decoded: u64,
    pub decode_failures: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub queries_answered: u64,
    pub queries_positive: u64,
    pub avg_query_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus, StatsD, or OpenTelemetry.
pub trait MetricsRecorder: Send + Sync {
    /// Record a filter build
    fn record_filter_built(&self, element_count: u64, compressed_len: u64);

    /// Record a stream decode attempt
    fn record_decode(&self, success: bool);

    /// Record a filter-cache lookup
    fn record_cache_lookup(&self, hit: bool);

    /// Record a membership query
    fn record_query(&self, duration: Duration, matched: bool);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_filter_built(&self, _: u64, _: u64) {}
    fn record_decode(&self, _: bool) {}
    fn record_cache_lookup(&self, _: bool) {}
    fn record_query(&self, _: Duration, _: bool) {}
}

impl MetricsRecorder for Metrics {
    fn record_filter_built(&self, element_count: u64, compressed_len: u64) {
        Metrics::record_filter_built(self, element_count, compressed_len);
    }

    fn record_decode(&self, success: bool) {
        Metrics::record_decode(self, success);
    }

    fn record_cache_lookup(&self, hit: bool) {
        Metrics::record_cache_lookup(self, hit);
    }

    fn record_query(&self, duration: Duration, matched: bool) {
        Metrics::record_query(self, duration, matched);
    }
}
