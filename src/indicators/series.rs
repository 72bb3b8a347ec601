//! Generic numeric-sequence operations used by every indicator.
//!
//! # Output Convention
//! Windowed functions return only the fully-formed values: for an input of
//! length `n` and a period `p` the output holds `n - p + 1` values, the last
//! of which corresponds to the last input. Too-short input (or `p == 0`)
//! yields an empty vector, never a panic and never NaN padding.

use crate::utils::safe_div;

/// Calculate Simple Moving Average for a given period
///
/// # Arguments
/// * `values` - Input sequence, oldest first
/// * `period` - Window length (e.g., 7, 30, 50, 200)
///
/// # Returns
/// * Mean of each trailing window; empty if `values.len() < period`
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    let mut sum: f64 = values[..period].iter().sum();
    result.push(sum / period as f64);

    for i in period..values.len() {
        sum += values[i] - values[i - period];
        result.push(sum / period as f64);
    }

    result
}

/// Calculate Exponential Moving Average
///
/// Seeded with the SMA of the first `period` values, then
/// `ema[i] = value[i] * k + ema[i-1] * (1 - k)` with `k = 2 / (period + 1)`.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        prev = value * k + prev * (1.0 - k);
        result.push(prev);
    }

    result
}

/// Population standard deviation over each trailing window
pub fn calculate_std_dev(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    values
        .windows(period)
        .map(population_std_dev)
        .collect()
}

/// Rate of change: `(value[i] - value[i-p]) / value[i-p] * 100`
///
/// Output length is `n - p`; a zero base yields 0.0 for that point.
pub fn calculate_roc(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() <= period {
        return Vec::new();
    }

    (period..values.len())
        .map(|i| safe_div(values[i] - values[i - period], values[i - period]) * 100.0)
        .collect()
}

/// Wilder smoothing (RMA): seeded with the mean of the first `period`
/// values, then `prev + (value - prev) / period`.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let p = period as f64;
    let seed = values[..period].iter().sum::<f64>() / p;

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        prev = (prev * (p - 1.0) + value) / p;
        result.push(prev);
    }

    result
}

/// Highest value of each trailing window
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        .collect()
}

/// Lowest value of each trailing window
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().copied().fold(f64::INFINITY, f64::min))
        .collect()
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation of a whole slice; 0.0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Natural-log returns between consecutive values (non-positive prices are skipped)
pub fn log_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

/// Calculate MA score: ((close - ma) / ma) * 100
///
/// Returns the percentage difference between close price and moving average.
pub fn calculate_ma_score(close: f64, ma: f64) -> f64 {
    safe_div(close - ma, ma) * 100.0
}
