//! Support / resistance candidates from local price extrema.
//!
//! A lighter companion to the volume-weighted level detector in
//! `services::price_levels`: swing highs and lows are found with a
//! symmetric lookback, clustered by relative distance and ranked by how many
//! swings landed in each cluster.

use crate::utils::safe_div;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtremaLevels {
    /// Ascending distance below the current price
    pub supports: Vec<f64>,
    /// Ascending distance above the current price
    pub resistances: Vec<f64>,
}

/// Indices of bars whose high is the strict maximum of the `lookback` bars on each side
pub fn find_local_highs(highs: &[f64], lookback: usize) -> Vec<usize> {
    find_extrema(highs, lookback, |candidate, other| candidate > other)
}

/// Indices of bars whose low is the strict minimum of the `lookback` bars on each side
pub fn find_local_lows(lows: &[f64], lookback: usize) -> Vec<usize> {
    find_extrema(lows, lookback, |candidate, other| candidate < other)
}

fn find_extrema(values: &[f64], lookback: usize, beats: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    if lookback == 0 || values.len() < 2 * lookback + 1 {
        return Vec::new();
    }

    (lookback..values.len() - lookback)
        .filter(|&i| {
            let candidate = values[i];
            (i - lookback..=i + lookback)
                .filter(|&j| j != i)
                .all(|j| beats(candidate, values[j]))
        })
        .collect()
}

/// Group prices whose relative distance to the running cluster mean is within `threshold`.
///
/// Returns `(mean_price, member_count)` per cluster.
fn cluster_prices(mut prices: Vec<f64>, threshold: f64) -> Vec<(f64, usize)> {
    prices.retain(|p| p.is_finite());
    prices.sort_by(|a, b| a.total_cmp(b));

    let mut clusters: Vec<(f64, usize)> = Vec::new();
    for price in prices {
        match clusters.last_mut() {
            Some((mean, count)) if safe_div((price - *mean).abs(), *mean) <= threshold => {
                *mean = (*mean * *count as f64 + price) / (*count as f64 + 1.0);
                *count += 1;
            }
            _ => clusters.push((price, 1)),
        }
    }
    clusters
}

/// Swing-based support and resistance levels
///
/// # Arguments
/// * `highs`, `lows` - Bar highs and lows, oldest first
/// * `current_price` - Reference price separating supports from resistances
/// * `lookback` - Bars on each side a swing must dominate
/// * `cluster_threshold` - Relative distance for merging nearby swings (0.01 = 1%)
/// * `max_levels` - Maximum levels returned per side
pub fn find_extrema_levels(
    highs: &[f64],
    lows: &[f64],
    current_price: f64,
    lookback: usize,
    cluster_threshold: f64,
    max_levels: usize,
) -> ExtremaLevels {
    let mut swings: Vec<f64> = find_local_highs(highs, lookback).into_iter().map(|i| highs[i]).collect();
    swings.extend(find_local_lows(lows, lookback).into_iter().map(|i| lows[i]));

    let clusters = cluster_prices(swings, cluster_threshold);

    let rank = |mut side: Vec<(f64, usize)>| -> Vec<f64> {
        // most touched first, then closest to price
        side.sort_by(|a, b| {
            b.1.cmp(&a.1).then_with(|| {
                (a.0 - current_price)
                    .abs()
                    .total_cmp(&(b.0 - current_price).abs())
            })
        });
        let mut levels: Vec<f64> = side.into_iter().take(max_levels).map(|(p, _)| p).collect();
        levels.sort_by(|a, b| (a - current_price).abs().total_cmp(&(b - current_price).abs()));
        levels
    };

    let (below, above): (Vec<_>, Vec<_>) = clusters
        .into_iter()
        .filter(|(p, _)| *p != current_price)
        .partition(|(p, _)| *p < current_price);

    ExtremaLevels {
        supports: rank(below),
        resistances: rank(above),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Oscillates between ~90 and ~110 with a 20-bar cycle
    fn wave(n: usize) -> (Vec<f64>, Vec<f64>) {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + 10.0 * (i as f64 * std::f64::consts::PI / 10.0).sin())
            .collect();
        let highs = closes.iter().map(|c| c + 0.5).collect();
        let lows = closes.iter().map(|c| c - 0.5).collect();
        (highs, lows)
    }

    #[test]
    fn test_local_extrema_positions() {
        let values = [1.0, 2.0, 5.0, 2.0, 1.0, 0.5, 1.0];
        assert_eq!(find_local_highs(&values, 2), vec![2]);
        assert!(find_local_lows(&values, 2).is_empty());
        assert_eq!(find_local_lows(&values, 1), vec![5]);
        assert!(find_local_highs(&values, 4).is_empty());
    }

    #[test]
    fn test_extrema_levels_split_by_price() {
        let (highs, lows) = wave(100);
        let levels = find_extrema_levels(&highs, &lows, 100.0, 5, 0.01, 3);

        assert_eq!(levels.supports.len(), 1);
        assert_eq!(levels.resistances.len(), 1);
        assert!((levels.supports[0] - 89.5).abs() < 0.5);
        assert!((levels.resistances[0] - 110.5).abs() < 0.5);
    }

    #[test]
    fn test_extrema_levels_empty_input() {
        let levels = find_extrema_levels(&[], &[], 100.0, 5, 0.01, 3);
        assert!(levels.supports.is_empty());
        assert!(levels.resistances.is_empty());
    }
}
