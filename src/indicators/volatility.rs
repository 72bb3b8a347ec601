//! Volatility indicators
//!
//! | Section               | Entry point                        | Minimum bars |
//! |-----------------------|------------------------------------|--------------|
//! | Bollinger Bands       | `calculate_bollinger_bands`        | period       |
//! | ATR                   | `calculate_atr`                    | period + 1   |
//! | Historical volatility | `calculate_annualized_volatility`  | 3            |

use super::series::{calculate_sma, calculate_std_dev, log_returns, population_std_dev, wilder_smooth};
use crate::constants::{BOLLINGER_STRONG_BANDWIDTH, INSUFFICIENT_DATA, TRADING_DAYS_PER_YEAR};
use crate::utils::{last_value, safe_div, safe_div_or};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BollingerSignal {
    #[serde(rename = "Strong Overbought")]
    StrongOverbought,
    #[serde(rename = "Overbought")]
    Overbought,
    #[serde(rename = "Strong Oversold")]
    StrongOversold,
    #[serde(rename = "Oversold")]
    Oversold,
    #[serde(rename = "Above Middle Band")]
    AboveMiddle,
    #[serde(rename = "Below Middle Band")]
    BelowMiddle,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl BollingerSignal {
    pub fn label(&self) -> &'static str {
        match self {
            BollingerSignal::StrongOverbought => "Strong Overbought",
            BollingerSignal::Overbought => "Overbought",
            BollingerSignal::StrongOversold => "Strong Oversold",
            BollingerSignal::Oversold => "Oversold",
            BollingerSignal::AboveMiddle => "Above Middle Band",
            BollingerSignal::BelowMiddle => "Below Middle Band",
            BollingerSignal::InsufficientData => INSUFFICIENT_DATA,
        }
    }
}

impl fmt::Display for BollingerSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Latest Bollinger Band reading.
///
/// `percent_b` is 0 at the lower band and 1 at the upper band; a flat
/// window (zero width) reports 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
    /// Band width as a percentage of the middle band
    pub bandwidth: Option<f64>,
    pub percent_b: f64,
    pub signal: BollingerSignal,
}

impl BollingerBands {
    pub fn insufficient() -> Self {
        Self {
            upper: None,
            middle: None,
            lower: None,
            bandwidth: None,
            percent_b: 0.5,
            signal: BollingerSignal::InsufficientData,
        }
    }

    /// True when the close sits above the upper band
    pub fn is_above_upper(&self, price: f64) -> bool {
        self.upper.map_or(false, |upper| price > upper)
    }

    pub fn is_below_lower(&self, price: f64) -> bool {
        self.lower.map_or(false, |lower| price < lower)
    }
}

/// Bollinger Bands: SMA(period) +/- `std_dev` population standard deviations
///
/// # Arguments
/// * `closes` - Close prices, oldest first
/// * `period` - Window length (20)
/// * `std_dev` - Band multiplier (2)
pub fn calculate_bollinger_bands(closes: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let (middle, sd) = match (
        last_value(&calculate_sma(closes, period)),
        last_value(&calculate_std_dev(closes, period)),
    ) {
        (Some(m), Some(s)) => (m, s),
        _ => return BollingerBands::insufficient(),
    };

    let upper = middle + std_dev * sd;
    let lower = middle - std_dev * sd;
    let width = upper - lower;
    let bandwidth = safe_div(width, middle) * 100.0;
    let price = closes[closes.len() - 1];
    let percent_b = safe_div_or(price - lower, width, 0.5);

    let strong = bandwidth > BOLLINGER_STRONG_BANDWIDTH;
    let signal = if price > upper {
        if strong {
            BollingerSignal::StrongOverbought
        } else {
            BollingerSignal::Overbought
        }
    } else if price < lower {
        if strong {
            BollingerSignal::StrongOversold
        } else {
            BollingerSignal::Oversold
        }
    } else if price >= middle {
        BollingerSignal::AboveMiddle
    } else {
        BollingerSignal::BelowMiddle
    };

    BollingerBands {
        upper: Some(upper),
        middle: Some(middle),
        lower: Some(lower),
        bandwidth: Some(bandwidth),
        percent_b,
        signal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl VolatilityLevel {
    /// Bucket a normalized ATR (percent of price)
    pub fn from_normalized_atr(normalized_atr: f64) -> Self {
        if normalized_atr < 0.5 {
            VolatilityLevel::VeryLow
        } else if normalized_atr < 1.0 {
            VolatilityLevel::Low
        } else if normalized_atr < 3.0 {
            VolatilityLevel::Medium
        } else if normalized_atr < 5.0 {
            VolatilityLevel::High
        } else {
            VolatilityLevel::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VolatilityLevel::VeryLow => "Very Low",
            VolatilityLevel::Low => "Low",
            VolatilityLevel::Medium => "Medium",
            VolatilityLevel::High => "High",
            VolatilityLevel::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtrResult {
    pub atr: Option<f64>,
    /// ATR as a percentage of the last close
    pub normalized_atr: Option<f64>,
    pub volatility: VolatilityLevel,
}

impl AtrResult {
    pub fn insufficient() -> Self {
        Self {
            atr: None,
            normalized_atr: None,
            volatility: VolatilityLevel::Medium,
        }
    }
}

/// True range for every bar after the first (`len - 1` values)
pub fn calculate_true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = closes.len().min(highs.len()).min(lows.len());
    (1..n)
        .map(|i| {
            let prev_close = closes[i - 1];
            (highs[i] - lows[i])
                .max((highs[i] - prev_close).abs())
                .max((lows[i] - prev_close).abs())
        })
        .collect()
}

/// Wilder-smoothed ATR series
pub fn calculate_atr_series(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    wilder_smooth(&calculate_true_range(highs, lows, closes), period)
}

/// Latest ATR with its volatility bucket
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> AtrResult {
    let atr = match last_value(&calculate_atr_series(highs, lows, closes, period)) {
        Some(atr) => atr,
        None => return AtrResult::insufficient(),
    };

    let price = closes[closes.len() - 1];
    let normalized = safe_div(atr, price) * 100.0;

    AtrResult {
        atr: Some(atr),
        normalized_atr: Some(normalized),
        volatility: VolatilityLevel::from_normalized_atr(normalized),
    }
}

/// Annualized volatility in percent: stdev of daily log returns * sqrt(252) * 100.
/// Returns 0 with fewer than two closes.
pub fn calculate_annualized_volatility(closes: &[f64]) -> f64 {
    let returns = log_returns(closes);
    if returns.len() < 2 {
        return 0.0;
    }
    population_std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
}

/// Standard deviation of simple daily returns, in percent
pub fn daily_return_std_dev(closes: &[f64]) -> f64 {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    population_std_dev(&returns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_flat_series() {
        let closes = vec![100.0; 25];
        let bands = calculate_bollinger_bands(&closes, 20, 2.0);
        assert_eq!(bands.upper, Some(100.0));
        assert_eq!(bands.lower, Some(100.0));
        assert_eq!(bands.bandwidth, Some(0.0));
        assert_eq!(bands.percent_b, 0.5);
        assert_eq!(bands.signal, BollingerSignal::AboveMiddle);
    }

    #[test]
    fn test_bollinger_insufficient() {
        let bands = calculate_bollinger_bands(&[1.0, 2.0, 3.0], 20, 2.0);
        assert!(bands.upper.is_none());
        assert_eq!(bands.percent_b, 0.5);
        assert_eq!(bands.signal, BollingerSignal::InsufficientData);
    }

    #[test]
    fn test_bollinger_breakout_above_upper() {
        let mut closes = vec![100.0; 19];
        closes.push(125.0);
        let bands = calculate_bollinger_bands(&closes, 20, 2.0);
        assert!(bands.is_above_upper(125.0));
        assert!(bands.percent_b > 1.0);
        assert!(matches!(
            bands.signal,
            BollingerSignal::Overbought | BollingerSignal::StrongOverbought
        ));
    }

    #[test]
    fn test_true_range_uses_previous_close() {
        let highs = [10.0, 12.0];
        let lows = [9.0, 11.0];
        let closes = [9.5, 11.5];
        assert_eq!(calculate_true_range(&highs, &lows, &closes), vec![2.5]);
    }

    #[test]
    fn test_atr_constant_range() {
        let closes = vec![100.0; 30];
        let highs = vec![101.0; 30];
        let lows = vec![99.0; 30];
        let result = calculate_atr(&highs, &lows, &closes, 14);
        assert!((result.atr.unwrap() - 2.0).abs() < 1e-9);
        assert!((result.normalized_atr.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(result.volatility, VolatilityLevel::Medium);
    }

    #[test]
    fn test_atr_insufficient_defaults_to_medium() {
        let result = calculate_atr(&[1.0; 5], &[1.0; 5], &[1.0; 5], 14);
        assert!(result.atr.is_none());
        assert_eq!(result.volatility, VolatilityLevel::Medium);
    }

    #[test]
    fn test_volatility_level_buckets() {
        assert_eq!(VolatilityLevel::from_normalized_atr(0.2), VolatilityLevel::VeryLow);
        assert_eq!(VolatilityLevel::from_normalized_atr(0.7), VolatilityLevel::Low);
        assert_eq!(VolatilityLevel::from_normalized_atr(4.0), VolatilityLevel::High);
        assert_eq!(VolatilityLevel::from_normalized_atr(9.0), VolatilityLevel::VeryHigh);
    }

    #[test]
    fn test_annualized_volatility() {
        assert_eq!(calculate_annualized_volatility(&[100.0; 10]), 0.0);
        assert_eq!(calculate_annualized_volatility(&[100.0]), 0.0);

        let choppy: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 100.0 } else { 102.0 }).collect();
        assert!(calculate_annualized_volatility(&choppy) > 10.0);
    }
}
