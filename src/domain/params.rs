//! # Filter Parameters
//!
//! The three numbers that pin down a Golomb-coded set filter: the Rice
//! parameter `P` (bits per remainder), the false-positive divisor `M`
//! (target rate roughly `1/M`), and the 128-bit SipHash key. Two filters
//! built with the same parameters over the same elements are byte-identical.
//!
//! The well-known filter kinds (BIP 157/158 style) fix `P` and `M`; only
//! the key varies per block.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// 128-bit SipHash key, usually derived from a block hash
pub type SipKey = [u8; 16];

/// 32-byte block identifier
pub type BlockHash = [u8; 32];

/// Rice parameter shared by the standard filter kinds
pub const STANDARD_GOLOMB_P: u8 = 19;

/// False-positive divisor shared by the standard filter kinds
pub const STANDARD_FP_DIVISOR: u32 = 784_931;

/// Schema version stamped on in-memory filters
pub const FILTER_VERSION: u8 = 1;

/// Largest accepted Rice parameter for a filter entity
const MAX_GOLOMB_P: u8 = 31;

/// Parameters that define a filter's hashed value space and encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Golomb-Rice remainder width in bits
    pub p: u8,
    /// False-positive divisor: the hashed range is `N * m`
    pub m: u32,
    /// SipHash-2-4 key
    pub key: SipKey,
}

impl FilterParams {
    /// Create validated parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGolombParameter` if `p` is outside `1..=31`, or
    /// `InvalidFalsePositiveDivisor` if `m` is zero.
    pub fn new(p: u8, m: u32, key: SipKey) -> Result<Self, FilterError> {
        let params = Self { p, m, key };
        params.validate()?;
        Ok(params)
    }

    /// Check that the parameters describe a usable filter.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.p == 0 || self.p > MAX_GOLOMB_P {
            return Err(FilterError::InvalidGolombParameter { p: self.p });
        }
        if self.m == 0 {
            return Err(FilterError::InvalidFalsePositiveDivisor);
        }
        Ok(())
    }

    /// Approximate probability that a non-member tests positive.
    pub fn false_positive_rate(&self) -> f64 {
        1.0 / f64::from(self.m)
    }
}

/// The well-known filter kinds and their wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Output scripts created by the block plus scripts spent by it
    Basic,
    /// Auxiliary per-block data beyond the basic script set
    Extended,
}

impl FilterKind {
    /// Wire code identifying this kind in filter requests
    pub const fn code(self) -> u8 {
        match self {
            FilterKind::Basic => 0x00,
            FilterKind::Extended => 0x01,
        }
    }

    /// Rice parameter this kind is defined with
    pub const fn golomb_p(self) -> u8 {
        match self {
            FilterKind::Basic | FilterKind::Extended => STANDARD_GOLOMB_P,
        }
    }

    /// False-positive divisor this kind is defined with
    pub const fn fp_divisor(self) -> u32 {
        match self {
            FilterKind::Basic | FilterKind::Extended => STANDARD_FP_DIVISOR,
        }
    }

    /// Full parameter set for this kind under the given key.
    pub fn params(self, key: SipKey) -> FilterParams {
        FilterParams {
            p: self.golomb_p(),
            m: self.fp_divisor(),
            key,
        }
    }
}

impl TryFrom<u8> for FilterKind {
    type Error = FilterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x00 => Ok(FilterKind::Basic),
            0x01 => Ok(FilterKind::Extended),
            other => Err(FilterError::UnknownFilterKind { code: other }),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Basic => write!(f, "basic"),
            FilterKind::Extended => write!(f, "extended"),
        }
    }
}
