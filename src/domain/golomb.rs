//! # Golomb-Rice Bitstream Codec
//!
//! Delta-compresses the sorted hashed set. Each gap between consecutive
//! values is split by the Rice parameter `P`: the quotient `delta >> P` is
//! written in unary (that many `1` bits, then a `0`), the low `P` bits
//! follow most-significant-first. The final byte is zero-padded.
//!
//! The stream does not encode its own element count; callers carry `N`
//! beside the bytes and the decoder reads exactly that many codes.
//!
//! `P = 0` degenerates to pure unary and is handled here, although filter
//! entities restrict themselves to `1..=31`.

use bitvec::prelude::*;

use crate::error::FilterError;

/// Encode sorted values as a Golomb-Rice delta stream
///
/// `sorted_values` must be ascending (duplicates allowed); construction
/// always hands us the output of the hashed-set builder, which sorts.
pub fn encode(p: u8, sorted_values: &[u64]) -> Vec<u8> {
    debug_assert!(p < 64, "Rice parameter must leave room for the quotient");

    let mut stream = BitVec::<u8, Msb0>::new();
    let mut previous = 0u64;

    for &value in sorted_values {
        debug_assert!(value >= previous, "values must be sorted ascending");
        let delta = value - previous;
        encode_one(&mut stream, delta, p);
        previous = value;
    }

    stream.into_vec()
}

fn encode_one(stream: &mut BitVec<u8, Msb0>, delta: u64, p: u8) {
    let quotient = delta >> p;
    for _ in 0..quotient {
        stream.push(true);
    }
    stream.push(false);

    // Remainder, most significant bit first
    for i in (0..p).rev() {
        stream.push((delta >> i) & 1 == 1);
    }
}

/// Decode exactly `count` Golomb-Rice codes back into absolute values
///
/// Deltas are re-accumulated into prefix sums, so the output is
/// non-decreasing and matches what `encode` was given.
///
/// # Errors
///
/// Returns `TruncatedStream` when the bits run out before `count` codes
/// are read, and `ValueOverflow` if the prefix sum leaves u64.
pub fn decode(p: u8, data: &[u8], count: u32) -> Result<Vec<u64>, FilterError> {
    debug_assert!(p < 64, "Rice parameter must leave room for the quotient");

    let bits = data.view_bits::<Msb0>();

    // Every code spends at least p + 1 bits, so an undersized stream can be
    // rejected before any bit work.
    let minimum_bits = u64::from(count) * (u64::from(p) + 1);
    if minimum_bits > bits.len() as u64 {
        return Err(FilterError::TruncatedStream {
            expected: count,
            decoded: 0,
        });
    }

    let mut values = Vec::with_capacity(count as usize);
    let mut cursor = 0usize;
    let mut previous = 0u64;

    for decoded in 0..count {
        let mut quotient = 0u64;
        loop {
            match bits.get(cursor) {
                Some(bit) => {
                    cursor += 1;
                    if *bit {
                        quotient += 1;
                    } else {
                        break;
                    }
                }
                None => {
                    return Err(FilterError::TruncatedStream {
                        expected: count,
                        decoded,
                    })
                }
            }
        }

        let mut remainder = 0u64;
        for _ in 0..p {
            match bits.get(cursor) {
                Some(bit) => {
                    cursor += 1;
                    remainder = (remainder << 1) | u64::from(*bit);
                }
                None => {
                    return Err(FilterError::TruncatedStream {
                        expected: count,
                        decoded,
                    })
                }
            }
        }

        let delta = (quotient << p) | remainder;
        previous = previous
            .checked_add(delta)
            .ok_or(FilterError::ValueOverflow { decoded })?;
        values.push(previous);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_bit_layout() {
        // Values [0, 4, 10] with p = 2 give deltas [0, 4, 6]:
        //   0 -> q=0 r=00      -> 000
        //   4 -> q=1 r=00      -> 1000
        //   6 -> q=1 r=10      -> 1010
        // Concatenated and zero-padded: 00010001 01000000.
        let encoded = encode(2, &[0, 4, 10]);
        assert_eq!(encoded, vec![0x11, 0x40]);
    }

    #[test]
    fn test_known_bit_layout_decodes() {
        let values = decode(2, &[0x11, 0x40], 3).unwrap();
        assert_eq!(values, vec![0, 4, 10]);
    }

    #[test]
    fn test_pure_unary_when_p_is_zero() {
        // Deltas [0, 1, 1] in unary: 0, 10, 10 -> 01010000.
        let encoded = encode(0, &[0, 1, 2]);
        assert_eq!(encoded, vec![0x50]);

        let values = decode(0, &[0x50], 3).unwrap();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_values_encode_zero_delta() {
        // Deltas [5, 0] with p = 2: 10 01, 0 00 -> 10010000.
        let encoded = encode(2, &[5, 5]);
        assert_eq!(encoded, vec![0x90]);

        let values = decode(2, &[0x90], 2).unwrap();
        assert_eq!(values, vec![5, 5]);
    }

    #[test]
    fn test_empty_set_is_empty_stream() {
        assert!(encode(19, &[]).is_empty());
        assert_eq!(decode(19, &[], 0).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn test_undersized_stream_rejected_up_front() {
        // Three codes at p = 2 need at least 9 bits; one byte cannot hold them.
        let result = decode(2, &[0x11], 3);
        assert!(matches!(
            result,
            Err(FilterError::TruncatedStream {
                expected: 3,
                decoded: 0
            })
        ));
    }

    #[test]
    fn test_truncation_after_partial_decode() {
        // 0x3F = 00111111: first code reads fine (value 1), the second runs
        // off the end inside its unary quotient.
        let result = decode(2, &[0x3F], 2);
        assert!(matches!(
            result,
            Err(FilterError::TruncatedStream {
                expected: 2,
                decoded: 1
            })
        ));
    }

    #[test]
    fn test_unary_run_hitting_stream_end() {
        let result = decode(2, &[0xFF], 2);
        assert!(matches!(
            result,
            Err(FilterError::TruncatedStream {
                expected: 2,
                decoded: 0
            })
        ));
    }

    #[test]
    fn test_prefix_sum_overflow_detected() {
        // At p = 63 each 64-bit code carries delta 2^63 - 1. Two fit in u64,
        // the third overflows the prefix sum.
        let code = {
            let mut bytes = vec![0x7Fu8];
            bytes.extend_from_slice(&[0xFF; 7]);
            bytes
        };
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend_from_slice(&code);
        }

        let result = decode(63, &data, 3);
        assert!(matches!(
            result,
            Err(FilterError::ValueOverflow { decoded: 2 })
        ));
    }

    #[test]
    fn test_large_values_round_trip() {
        let values = vec![281_408, 5_000_000, 5_000_000, 123_456_789];
        let encoded = encode(19, &values);
        assert_eq!(decode(19, &encoded, values.len() as u32).unwrap(), values);
    }

    proptest! {
        #[test]
        fn prop_round_trip_preserves_sorted_sets(
            deltas in proptest::collection::vec(0u64..100_000, 0..200),
            p in 1u8..=24,
        ) {
            let mut values = Vec::with_capacity(deltas.len());
            let mut acc = 0u64;
            for delta in deltas {
                acc += delta;
                values.push(acc);
            }

            let encoded = encode(p, &values);
            let decoded = decode(p, &encoded, values.len() as u32).unwrap();
            prop_assert_eq!(decoded, values);
        }

        #[test]
        fn prop_stream_length_matches_bit_cost(
            deltas in proptest::collection::vec(0u64..10_000, 1..100),
            p in 4u8..=20,
        ) {
            let mut values = Vec::with_capacity(deltas.len());
            let mut acc = 0u64;
            for delta in &deltas {
                acc += delta;
                values.push(acc);
            }

            let bit_cost: u64 = deltas
                .iter()
                .map(|d| (d >> p) + 1 + u64::from(p))
                .sum();
            let encoded = encode(p, &values);
            prop_assert_eq!(encoded.len() as u64, (bit_cost + 7) / 8);
        }
    }
}
