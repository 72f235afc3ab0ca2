// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-sectional statistics over per-contributor commit counts.

use std::collections::HashMap;

/// Summary of per-actor counts, each value rounded half-to-even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountStats {
    pub max: i64,
    pub min: i64,
    pub mean: i64,
    pub std: i64,
    pub median: i64,
}

impl CountStats {
    /// All zeros for an empty list. `std` is the population standard
    /// deviation and is 0 for fewer than two actors.
    pub fn from_counts(counts: &[u64]) -> Self {
        if counts.is_empty() {
            return Self::default();
        }
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() < 2 {
            0.0
        } else {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            variance.sqrt()
        };

        let mut sorted = counts.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        } else {
            sorted[mid] as f64
        };

        Self {
            max: sorted.last().copied().unwrap_or(0) as i64,
            min: sorted.first().copied().unwrap_or(0) as i64,
            mean: round(mean),
            std: round(std),
            median: round(median),
        }
    }

    /// Statistics over how many items each actor produced.
    pub fn per_actor<I>(actors: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let mut counts: HashMap<i64, u64> = HashMap::new();
        for actor in actors {
            *counts.entry(actor).or_default() += 1;
        }
        let counts: Vec<u64> = counts.into_values().collect();
        Self::from_counts(&counts)
    }
}

fn round(value: f64) -> i64 {
    value.round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_is_all_zero() {
        assert_eq!(CountStats::from_counts(&[]), CountStats::default());
    }

    #[test]
    fn single_actor_has_zero_std() {
        let stats = CountStats::from_counts(&[7]);
        assert_eq!(stats.max, 7);
        assert_eq!(stats.min, 7);
        assert_eq!(stats.mean, 7);
        assert_eq!(stats.median, 7);
        assert_eq!(stats.std, 0);
    }

    #[test]
    fn population_std_and_even_median() {
        // mean 5, population variance 4, std 2
        let stats = CountStats::from_counts(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(stats.mean, 5);
        assert_eq!(stats.std, 2);
        assert_eq!(stats.median, 5);
        assert_eq!(stats.max, 9);
        assert_eq!(stats.min, 2);
    }

    #[test]
    fn rounding_is_half_to_even() {
        // mean 2.5 rounds to 2, median 2.5 rounds to 2
        let stats = CountStats::from_counts(&[1, 4]);
        assert_eq!(stats.mean, 2);
        assert_eq!(stats.median, 2);
        // mean 3.5 rounds to 4
        let stats = CountStats::from_counts(&[3, 4]);
        assert_eq!(stats.mean, 4);
    }

    #[test]
    fn per_actor_groups_occurrences() {
        let stats = CountStats::per_actor([1, 1, 1, 2]);
        assert_eq!(stats.max, 3);
        assert_eq!(stats.min, 1);
        assert_eq!(stats.median, 2);
    }

    proptest! {
        #[test]
        fn min_le_mean_le_max(counts in proptest::collection::vec(1u64..1_000, 1..50)) {
            let stats = CountStats::from_counts(&counts);
            prop_assert!(stats.min <= stats.mean);
            prop_assert!(stats.mean <= stats.max);
            prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        }

        #[test]
        fn equal_counts_have_zero_std(value in 1u64..1_000, n in 1usize..30) {
            let stats = CountStats::from_counts(&vec![value; n]);
            prop_assert_eq!(stats.std, 0);
            prop_assert_eq!(stats.mean, value as i64);
        }
    }
}
