//! # Match Engine
//!
//! Query operations over a decoded filter. Single probes binary-search the
//! sorted value set; batched matching hashes every target up front, sorts,
//! and walks both sorted sequences in one merge pass, so a watch list of
//! `T` targets costs `O(T log T + N)` instead of `T` binary searches.
//!
//! A corrupt stream answers conservatively: every query returns a benign
//! negative, and the underlying error stays observable through
//! [`GcsFilter::decompressed`].

use std::cmp::Ordering;

use super::filter::GcsFilter;

impl GcsFilter {
    /// Test a single element. True means *possibly* present (rate ~ `1/M`),
    /// false means definitely absent.
    pub fn contains(&self, target: &[u8]) -> bool {
        if self.is_empty() {
            return false;
        }
        let values = match self.decompressed() {
            Ok(values) => values,
            Err(_) => return false,
        };
        values.binary_search(&self.target_value(target)).is_ok()
    }

    /// Test whether any target is possibly present, short-circuiting on the
    /// first hit. Equivalent to probing each target with [`contains`].
    ///
    /// [`contains`]: GcsFilter::contains
    pub fn match_any<I, A>(&self, targets: I) -> bool
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        if self.is_empty() {
            return false;
        }
        targets.into_iter().any(|target| self.contains(target.as_ref()))
    }

    /// Return which targets are possibly present.
    ///
    /// Byte-identical duplicates in `targets` are reported once. Distinct
    /// targets that collide onto the same hashed value are each reported.
    /// Output is ordered by (hashed value, target bytes), not input order.
    pub fn match_targets<'t, A>(&self, targets: &'t [A]) -> Vec<&'t [u8]>
    where
        A: AsRef<[u8]>,
    {
        if self.is_empty() || targets.is_empty() {
            return Vec::new();
        }
        let values = match self.decompressed() {
            Ok(values) => values,
            Err(_) => return Vec::new(),
        };

        let mut queries: Vec<(u64, &'t [u8])> = targets
            .iter()
            .map(|target| {
                let bytes = target.as_ref();
                (self.target_value(bytes), bytes)
            })
            .collect();
        queries.sort_unstable();
        queries.dedup();

        let mut matched = Vec::new();
        let mut query_index = 0;
        let mut value_index = 0;
        while query_index < queries.len() && value_index < values.len() {
            match queries[query_index].0.cmp(&values[value_index]) {
                // Keep the filter cursor: the next query may share this value
                Ordering::Equal => {
                    matched.push(queries[query_index].1);
                    query_index += 1;
                }
                Ordering::Less => query_index += 1,
                Ordering::Greater => value_index += 1,
            }
        }
        matched
    }

    /// Merge-match against already-hashed values.
    ///
    /// For callers that hashed their watch list once and probe many filters
    /// with it. Input order does not matter; the returned matches are
    /// sorted ascending and deduplicated.
    pub fn match_prehashed(&self, hashed_targets: &[u64]) -> Vec<u64> {
        if self.is_empty() || hashed_targets.is_empty() {
            return Vec::new();
        }
        let values = match self.decompressed() {
            Ok(values) => values,
            Err(_) => return Vec::new(),
        };

        let mut queries = hashed_targets.to_vec();
        queries.sort_unstable();
        queries.dedup();

        let mut matched = Vec::new();
        let mut query_index = 0;
        let mut value_index = 0;
        while query_index < queries.len() && value_index < values.len() {
            match queries[query_index].cmp(&values[value_index]) {
                Ordering::Equal => {
                    matched.push(queries[query_index]);
                    query_index += 1;
                }
                Ordering::Less => query_index += 1,
                Ordering::Greater => value_index += 1,
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::domain::hashing;
    use crate::domain::params::FilterParams;

    use super::*;

    fn build_filter(count: usize) -> (GcsFilter, Vec<Vec<u8>>) {
        let params = FilterParams::new(19, 784_931, [0x33u8; 16]).unwrap();
        let elements: Vec<Vec<u8>> = (0..count)
            .map(|i| format!("member_script_{}", i).into_bytes())
            .collect();
        let filter = GcsFilter::from_elements(params, &elements).unwrap();
        (filter, elements)
    }

    #[test]
    fn test_no_false_negatives() {
        let (filter, elements) = build_filter(500);
        for element in &elements {
            assert!(
                filter.contains(element),
                "False negative for {:?}",
                String::from_utf8_lossy(element)
            );
        }
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let params = FilterParams::new(19, 784_931, [0u8; 16]).unwrap();
        let filter = GcsFilter::from_elements(params, Vec::<Vec<u8>>::new()).unwrap();

        assert!(!filter.contains(b"anything"));
        assert!(!filter.match_any(vec![b"anything".to_vec()]));
        assert!(filter.match_targets(&[b"anything".to_vec()]).is_empty());
        assert!(filter.match_prehashed(&[0, 1, 2]).is_empty());
    }

    #[test]
    fn test_match_any_detects_members() {
        let (filter, elements) = build_filter(50);
        let targets = vec![b"absent_0".to_vec(), elements[10].clone(), b"absent_1".to_vec()];
        assert!(filter.match_any(&targets));
        assert!(!filter.match_any(vec![b"absent_0".to_vec(), b"absent_1".to_vec()]));
    }

    #[test]
    fn test_match_any_stops_pulling_after_first_hit() {
        let (filter, elements) = build_filter(50);
        let member = elements[0].clone();
        let mut pulls = 0usize;
        let lazy_targets = std::iter::from_fn(move || {
            pulls += 1;
            assert!(pulls <= 1, "Iterator must not be pulled past the first match");
            Some(member.clone())
        });

        assert!(filter.match_any(lazy_targets.take(1000)));
    }

    #[test]
    fn test_match_targets_agrees_with_pointwise_probes() {
        let (filter, elements) = build_filter(200);

        let mut targets: Vec<Vec<u8>> = elements.iter().step_by(7).cloned().collect();
        targets.extend((0..100).map(|i| format!("non_member_{}", i).into_bytes()));

        let batched: std::collections::BTreeSet<Vec<u8>> = filter
            .match_targets(&targets)
            .into_iter()
            .map(|t| t.to_vec())
            .collect();
        let pointwise: std::collections::BTreeSet<Vec<u8>> = targets
            .iter()
            .filter(|t| filter.contains(t))
            .cloned()
            .collect();

        assert_eq!(batched, pointwise, "Merge must agree with binary search");
    }

    #[test]
    fn test_match_targets_reports_duplicates_once() {
        let (filter, elements) = build_filter(20);
        let targets = vec![elements[3].clone(), elements[3].clone(), elements[3].clone()];

        let matched = filter.match_targets(&targets);

        assert_eq!(matched.len(), 1, "Byte-identical targets collapse to one");
        assert_eq!(matched[0], elements[3].as_slice());
    }

    #[test]
    fn test_match_prehashed_agrees_with_targets() {
        let (filter, elements) = build_filter(100);
        let targets: Vec<Vec<u8>> = elements.iter().step_by(3).cloned().collect();

        let hashed: Vec<u64> = targets
            .iter()
            .map(|t| hashing::hash_to_range(filter.key(), t, filter.value_range()))
            .collect();

        let matched = filter.match_prehashed(&hashed);

        // Every member target's hashed value must come back
        for value in &hashed {
            assert!(matched.contains(value));
        }
        assert!(matched.windows(2).all(|pair| pair[0] < pair[1]), "Output sorted, deduplicated");
    }

    #[test]
    fn test_corrupt_stream_answers_negative() {
        let params = FilterParams::new(19, 784_931, [0x33u8; 16]).unwrap();
        let filter = GcsFilter::from_parts(params, 5, vec![0xFF, 0xFF]).unwrap();

        assert!(!filter.contains(b"anything"));
        assert!(filter.match_targets(&[b"anything".to_vec()]).is_empty());
        assert!(filter.match_prehashed(&[1, 2, 3]).is_empty());
        assert!(filter.decompressed().is_err(), "Error stays observable");
    }

    #[test]
    fn test_observed_false_positive_rate_within_band() {
        // Monte-Carlo probe of the advertised rate: with M = 784 the
        // observed rate over 100k non-members must land within
        // [0.5/M, 2/M]. Seeded, so the run is reproducible.
        let m = 784u32;
        let params = FilterParams::new(10, m, [0x77u8; 16]).unwrap();
        let elements: Vec<Vec<u8>> = (0..1000)
            .map(|i| format!("member_{}", i).into_bytes())
            .collect();
        let filter = GcsFilter::from_elements(params, &elements).unwrap();

        let mut rng = StdRng::seed_from_u64(0x5EED_CAFE);
        let probes = 100_000u32;
        let mut positives = 0u32;
        for _ in 0..probes {
            let mut probe = [0u8; 24];
            rng.fill(&mut probe[..]);
            if filter.contains(&probe) {
                positives += 1;
            }
        }

        let observed = f64::from(positives) / f64::from(probes);
        let advertised = 1.0 / f64::from(m);
        assert!(
            observed >= advertised * 0.5 && observed <= advertised * 2.0,
            "Observed FPR {} outside [{}, {}]",
            observed,
            advertised * 0.5,
            advertised * 2.0
        );
    }

    proptest! {
        #[test]
        fn prop_members_always_match(
            elements in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 1..40),
                1..60,
            ),
        ) {
            let params = FilterParams::new(19, 784_931, [0x11u8; 16]).unwrap();
            let filter = GcsFilter::from_elements(params, &elements).unwrap();

            for element in &elements {
                prop_assert!(filter.contains(element));
            }
            prop_assert!(filter.match_any(&elements));
        }
    }
}
