//! # Filter Service Configuration
//!
//! Operational knobs for the service layer. Filter semantics are never
//! configurable here; parameters that change filter bytes live in
//! [`crate::domain::params`].

use serde::{Deserialize, Serialize};

/// Default number of decoded filters kept in the LRU cache
pub const DEFAULT_FILTER_CACHE_SIZE: usize = 256;

/// Filter service configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterServiceConfig {
    /// Number of filters held in the per-service LRU cache.
    /// A zero falls back to the default.
    pub filter_cache_size: usize,

    /// Emit a debug trace line per answered query.
    pub trace_queries: bool,
}

impl Default for FilterServiceConfig {
    fn default() -> Self {
        Self {
            filter_cache_size: DEFAULT_FILTER_CACHE_SIZE,
            trace_queries: false,
        }
    }
}

impl FilterServiceConfig {
    /// Create a config for testing (small cache, chatty).
    pub fn for_testing() -> Self {
        Self {
            filter_cache_size: 8,
            trace_queries: true,
        }
    }
}
