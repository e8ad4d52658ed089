//! Hashed-set construction
//!
//! Turns a block's raw candidate elements into the sorted hashed set the
//! Golomb-Rice coder compresses: drop empty strings, deduplicate bytewise,
//! hash every survivor into `[0, N * M)`, sort ascending. `N` is fixed
//! before hashing because it sizes the range.

use std::collections::BTreeSet;

use crate::error::FilterError;

use super::hashing;
use super::params::SipKey;

/// Build the sorted hashed set for a filter
///
/// Duplicate values are legal in the output: two distinct elements may hash
/// to the same point, and the delta coder handles the zero gap.
///
/// # Errors
///
/// Returns `TooManyElements` if the deduplicated count does not fit in u32.
pub fn build<I, A>(key: &SipKey, m: u32, elements: I) -> Result<Vec<u64>, FilterError>
where
    I: IntoIterator<Item = A>,
    A: AsRef<[u8]>,
{
    let mut distinct: BTreeSet<Vec<u8>> = BTreeSet::new();
    for element in elements {
        let bytes = element.as_ref();
        if bytes.is_empty() {
            continue;
        }
        if !distinct.contains(bytes) {
            distinct.insert(bytes.to_vec());
        }
    }

    let count = distinct.len();
    let n = u32::try_from(count).map_err(|_| FilterError::TooManyElements {
        count: count as u64,
    })?;
    if n == 0 {
        return Ok(Vec::new());
    }

    let range = u64::from(n) * u64::from(m);
    let mut values: Vec<u64> = distinct
        .iter()
        .map(|element| hashing::hash_to_range(key, element, range))
        .collect();
    values.sort_unstable();

    Ok(values)
}
