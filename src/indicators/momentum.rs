//! Momentum oscillators: RSI, Stochastic RSI, Stochastic, Williams %R, CCI, MFI, ROC.
//!
//! Every function returns `None` (or an empty series) when the input is too
//! short for its period. Flat windows map to the oscillator's neutral value.

use super::series::{calculate_roc, calculate_sma, mean, rolling_max, rolling_min};
use crate::utils::{last_value, safe_div};
use serde::{Deserialize, Serialize};

/// Full RSI series using Wilder's smoothing of average gains and losses.
///
/// The first value corresponds to input index `period`; output length is
/// `closes.len() - period`. Values are always in [0, 100]; a window with no
/// movement at all is 50.
pub fn calculate_rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let p = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= p;
    avg_loss /= p;

    let mut result = Vec::with_capacity(closes.len() - period);
    result.push(rsi_from_averages(avg_gain, avg_loss));

    for i in (period + 1)..closes.len() {
        let change = closes[i] - closes[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        result.push(rsi_from_averages(avg_gain, avg_loss));
    }

    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// Latest RSI value
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    last_value(&calculate_rsi_series(closes, period))
}

/// Stochastic RSI %K / %D, both in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochRsiResult {
    pub k: f64,
    pub d: f64,
}

/// Stochastic RSI
///
/// Raw value is `(rsi - min(rsi, n)) / (max(rsi, n) - min(rsi, n)) * 100`,
/// %K is its SMA(`k_smooth`), %D is SMA(`d_smooth`) of %K. A flat RSI
/// window gives 50.
pub fn calculate_stoch_rsi(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> Option<StochRsiResult> {
    let rsi = calculate_rsi_series(closes, rsi_period);
    let highs = rolling_max(&rsi, stoch_period);
    let lows = rolling_min(&rsi, stoch_period);
    if highs.is_empty() {
        return None;
    }

    let offset = stoch_period - 1;
    let raw: Vec<f64> = highs
        .iter()
        .zip(lows.iter())
        .enumerate()
        .map(|(i, (&hi, &lo))| {
            let range = hi - lo;
            if range <= f64::EPSILON {
                50.0
            } else {
                (rsi[i + offset] - lo) / range * 100.0
            }
        })
        .collect();

    let k_line = calculate_sma(&raw, k_smooth);
    let d_line = calculate_sma(&k_line, d_smooth);

    Some(StochRsiResult {
        k: last_value(&k_line)?,
        d: last_value(&d_line)?,
    })
}

/// Stochastic oscillator %K (fast) and %D (SMA of %K)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticResult {
    pub k: f64,
    pub d: f64,
}

/// Raw %K series: `(close - lowest_low) / (highest_high - lowest_low) * 100`
fn stochastic_k_series(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(highs, period);
    let ll = rolling_min(lows, period);
    let offset = period.saturating_sub(1);

    hh.iter()
        .zip(ll.iter())
        .enumerate()
        .map(|(i, (&hi, &lo))| {
            let range = hi - lo;
            if range <= f64::EPSILON {
                50.0
            } else {
                (closes[i + offset] - lo) / range * 100.0
            }
        })
        .collect()
}

/// Stochastic oscillator
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Option<StochasticResult> {
    if !same_len(&[highs, lows, closes]) {
        return None;
    }
    let k_line = stochastic_k_series(highs, lows, closes, k_period);
    let d_line = calculate_sma(&k_line, d_period);

    Some(StochasticResult {
        k: last_value(&k_line)?,
        d: last_value(&d_line)?,
    })
}

/// Williams %R in [-100, 0]: `(highest_high - close) / (highest_high - lowest_low) * -100`
pub fn calculate_williams_r(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period || !same_len(&[highs, lows, closes]) {
        return None;
    }

    let start = closes.len() - period;
    let hh = highs[start..].iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let ll = lows[start..].iter().copied().fold(f64::INFINITY, f64::min);
    let range = hh - ll;
    if range <= f64::EPSILON {
        return Some(-50.0);
    }

    Some((hh - closes[closes.len() - 1]) / range * -100.0)
}

/// Commodity Channel Index: `(tp - sma(tp)) / (0.015 * mean_deviation)`
pub fn calculate_cci(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period || !same_len(&[highs, lows, closes]) {
        return None;
    }

    let typical = typical_prices(highs, lows, closes);
    let window = &typical[typical.len() - period..];
    let avg = mean(window);
    let mean_deviation = window.iter().map(|tp| (tp - avg).abs()).sum::<f64>() / period as f64;

    let current = typical[typical.len() - 1];
    Some(safe_div(current - avg, 0.015 * mean_deviation))
}

/// Money Flow Index in [0, 100]
///
/// Raw money flow is typical price * volume; it counts as positive when the
/// typical price rose from the previous bar and negative when it fell.
pub fn calculate_mfi(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
    period: usize,
) -> Option<f64> {
    if period == 0 || closes.len() <= period || !same_len(&[highs, lows, closes, volumes]) {
        return None;
    }

    let typical = typical_prices(highs, lows, closes);
    let start = typical.len() - period;

    let mut positive = 0.0;
    let mut negative = 0.0;
    for i in start..typical.len() {
        let flow = typical[i] * volumes[i];
        if typical[i] > typical[i - 1] {
            positive += flow;
        } else if typical[i] < typical[i - 1] {
            negative += flow;
        }
    }

    if negative == 0.0 {
        return Some(if positive == 0.0 { 50.0 } else { 100.0 });
    }

    let ratio = positive / negative;
    Some((100.0 - 100.0 / (1.0 + ratio)).clamp(0.0, 100.0))
}

/// Latest rate of change (%)
pub fn calculate_roc_value(closes: &[f64], period: usize) -> Option<f64> {
    last_value(&calculate_roc(closes, period))
}

fn typical_prices(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    highs
        .iter()
        .zip(lows.iter())
        .zip(closes.iter())
        .map(|((h, l), c)| (h + l + c) / 3.0)
        .collect()
}

fn same_len(series: &[&[f64]]) -> bool {
    series.windows(2).all(|w| w[0].len() == w[1].len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    fn falling(n: usize) -> Vec<f64> {
        (0..n).map(|i| 200.0 - i as f64).collect()
    }

    #[test]
    fn test_rsi_extremes() {
        assert_eq!(calculate_rsi(&rising(30), 14), Some(100.0));
        assert_eq!(calculate_rsi(&falling(30), 14), Some(0.0));
        assert_eq!(calculate_rsi(&[5.0; 30], 14), Some(50.0));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(calculate_rsi(&rising(14), 14).is_none());
        assert!(calculate_rsi_series(&[], 14).is_empty());
    }

    #[test]
    fn test_rsi_bounds_on_choppy_series() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + ((i * 7919) % 23) as f64 - 11.0 + (i as f64 * 0.1))
            .collect();
        for value in calculate_rsi_series(&closes, 14) {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_stoch_rsi_requires_enough_history() {
        assert!(calculate_stoch_rsi(&rising(20), 14, 14, 3, 3).is_none());

        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let result = calculate_stoch_rsi(&closes, 14, 14, 3, 3).unwrap();
        assert!((0.0..=100.0).contains(&result.k));
        assert!((0.0..=100.0).contains(&result.d));
    }

    #[test]
    fn test_stochastic_at_range_top() {
        let closes = rising(20);
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.5).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.5).collect();

        let result = calculate_stochastic(&highs, &lows, &closes, 14, 3).unwrap();
        // close sits 0.5 below the 14-bar high over a 13+1 = 14 wide range
        assert!((result.k - (13.5 / 14.0 * 100.0)).abs() < 1e-9);
        assert!(result.d > 90.0);
    }

    #[test]
    fn test_williams_r() {
        let highs = vec![10.0, 12.0, 11.0];
        let lows = vec![8.0, 9.0, 9.0];
        let closes = vec![9.0, 11.0, 12.0];
        assert_eq!(calculate_williams_r(&highs, &lows, &closes, 3), Some(-0.0));

        let closes = vec![9.0, 11.0, 8.0];
        assert_eq!(calculate_williams_r(&highs, &lows, &closes, 3), Some(-100.0));
        assert!(calculate_williams_r(&highs, &lows, &closes, 4).is_none());
    }

    #[test]
    fn test_cci_flat_is_zero() {
        let flat = vec![10.0; 25];
        assert_eq!(calculate_cci(&flat, &flat, &flat, 20), Some(0.0));

        let closes = rising(25);
        let cci = calculate_cci(&closes, &closes, &closes, 20).unwrap();
        assert!(cci > 100.0);
    }

    #[test]
    fn test_mfi() {
        let closes = rising(20);
        let volumes = vec![1000.0; 20];
        assert_eq!(calculate_mfi(&closes, &closes, &closes, &volumes, 14), Some(100.0));

        let closes = falling(20);
        assert_eq!(calculate_mfi(&closes, &closes, &closes, &volumes, 14), Some(0.0));

        let flat = vec![10.0; 20];
        assert_eq!(calculate_mfi(&flat, &flat, &flat, &volumes, 14), Some(50.0));
    }

    #[test]
    fn test_roc_value() {
        let closes = vec![100.0, 101.0, 110.0];
        assert!((calculate_roc_value(&closes, 2).unwrap() - 10.0).abs() < 1e-12);
        assert!(calculate_roc_value(&closes, 5).is_none());
    }
}
