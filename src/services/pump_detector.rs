//! Pump / Dump Detector
//!
//! Scores the latest daily candle for abnormal volume + price moves.
//!
//! ## Point buckets (pump side; dump mirrors with the sign flipped)
//!
//! | Signal            | Max | Ladder                                        |
//! |-------------------|-----|-----------------------------------------------|
//! | Volume increase   | 20  | 500% 20, 300% 16, 200% 12, 100% 8, 50% 4      |
//! | Price change      | 35  | 20% 35, 15% 28, 10% 20, 5% 12, 3% 6           |
//! | Price velocity    | 10  | 5 10, 3 7, 1.5 4, >0 2                        |
//! | Intraday range    | 15  | 20% 15, 10% 10, 5% 5                          |
//! | RSI               | 10  | >80 10, >70 7, >60 3                          |
//! | Bollinger breakout| 7   | >= 5% beyond the band 7, otherwise 4          |
//! | MACD momentum     | 3   | rising with positive histogram 3, rising 1    |
//!
//! The sum is multiplied by the low-liquidity multiplier and capped at 100.

use crate::constants::{
    BOLLINGER_PERIOD, BOLLINGER_STD_DEV, PUMP_BASE_THRESHOLD, PUMP_MIN_CANDLES,
    PUMP_MIN_THRESHOLD, PUMP_VOLUME_BASELINE, RSI_PERIOD,
};
use crate::indicators::{
    calculate_bollinger_bands, calculate_macd, calculate_rsi, daily_return_std_dev, mean,
    BollingerBands, MacdResult,
};
use crate::models::{Candle, LiquidityType, PumpDumpSignal};
use crate::utils::{pct_change, safe_div};

/// Value-to-points ladder: first `(threshold, points)` with `value >= threshold` wins
fn ladder(value: f64, steps: &[(f64, f64)]) -> f64 {
    steps
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0.0, |(_, points)| *points)
}

fn volume_points(volume_increase: f64) -> f64 {
    ladder(volume_increase, &[(500.0, 20.0), (300.0, 16.0), (200.0, 12.0), (100.0, 8.0), (50.0, 4.0)])
}

fn price_points(change: f64) -> f64 {
    ladder(change, &[(20.0, 35.0), (15.0, 28.0), (10.0, 20.0), (5.0, 12.0), (3.0, 6.0)])
}

fn velocity_points(velocity: f64) -> f64 {
    if velocity <= 0.0 {
        return 0.0;
    }
    ladder(velocity, &[(5.0, 10.0), (3.0, 7.0), (1.5, 4.0)]).max(2.0)
}

fn intraday_points(range: f64) -> f64 {
    ladder(range, &[(20.0, 15.0), (10.0, 10.0), (5.0, 5.0)])
}

/// RSI points for the pump side; the dump side passes `100 - rsi`
fn rsi_points(rsi: Option<f64>) -> f64 {
    match rsi {
        Some(r) if r > 80.0 => 10.0,
        Some(r) if r > 70.0 => 7.0,
        Some(r) if r > 60.0 => 3.0,
        _ => 0.0,
    }
}

fn band_points(deviation: Option<f64>) -> f64 {
    match deviation {
        Some(d) if d >= 5.0 => 7.0,
        Some(_) => 4.0,
        None => 0.0,
    }
}

/// Score threshold lowered for calm assets (small moves are more unusual)
/// and for abnormal liquidity
pub fn pump_threshold(daily_volatility: f64, liquidity: LiquidityType) -> f64 {
    let volatility_adj = if daily_volatility < 2.0 {
        10.0
    } else if daily_volatility < 4.0 {
        5.0
    } else {
        0.0
    };
    let liquidity_adj = match liquidity {
        LiquidityType::Low => 10.0,
        LiquidityType::High => 5.0,
        LiquidityType::Normal => 0.0,
    };
    (PUMP_BASE_THRESHOLD - volatility_adj - liquidity_adj).max(PUMP_MIN_THRESHOLD)
}

fn macd_points(macd: &MacdResult, rising: bool) -> f64 {
    let (slope, histogram) = if rising {
        (macd.macd_slope, macd.histogram)
    } else {
        (-macd.macd_slope, -macd.histogram)
    };
    if slope > 0.0 && histogram > 0.0 {
        3.0
    } else if slope > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Detect pump / dump activity on the latest candle
///
/// # Arguments
/// * `candles` - Daily candles, oldest first; at least 30 are required
///
/// # Returns
/// A zeroed, non-flagged signal when fewer than 30 candles are available.
pub fn detect_pump_dump(candles: &[Candle]) -> PumpDumpSignal {
    let n = candles.len();
    if n < PUMP_MIN_CANDLES {
        return PumpDumpSignal::default();
    }
    let (current, previous) = match (candles.last(), candles.get(n - 2)) {
        (Some(current), Some(previous)) => (current, previous),
        _ => return PumpDumpSignal::default(),
    };

    let baseline: Vec<f64> = candles[n - 1 - PUMP_VOLUME_BASELINE..n - 1]
        .iter()
        .map(|c| c.volume)
        .collect();
    let avg_volume = mean(&baseline);

    let volume_ratio = safe_div(current.volume, avg_volume);
    let volume_increase = safe_div(current.volume - avg_volume, avg_volume) * 100.0;
    let price_change = pct_change(previous.close, current.close);
    let price_velocity = safe_div(price_change, volume_ratio);
    let intraday_pump = pct_change(current.low, current.close).max(0.0);
    let intraday_dump = (-pct_change(current.high, current.close)).max(0.0);

    let low_liquidity_multiplier = if avg_volume > 0.0 && volume_ratio < 1.0 {
        (2.0 - volume_ratio).clamp(1.0, 2.0)
    } else {
        1.0
    };

    let liquidity_type = if volume_increase > 200.0 {
        LiquidityType::High
    } else if avg_volume > 0.0 && current.volume < avg_volume * 0.5 {
        LiquidityType::Low
    } else {
        LiquidityType::Normal
    };

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let rsi = calculate_rsi(&closes, RSI_PERIOD);
    let bands = calculate_bollinger_bands(&closes, BOLLINGER_PERIOD, BOLLINGER_STD_DEV);
    let macd = calculate_macd(&closes);

    let (above_band, below_band) = band_deviations(&bands, current.close);

    let pump_raw = volume_points(volume_increase)
        + price_points(price_change)
        + velocity_points(price_velocity)
        + intraday_points(intraday_pump)
        + rsi_points(rsi)
        + band_points(above_band)
        + macd_points(&macd, true);

    let dump_raw = volume_points(volume_increase)
        + price_points(-price_change)
        + velocity_points(-price_velocity)
        + intraday_points(intraday_dump)
        + rsi_points(rsi.map(|r| 100.0 - r))
        + band_points(below_band)
        + macd_points(&macd, false);

    let pump_score = (pump_raw * low_liquidity_multiplier).min(100.0);
    let dump_score = (dump_raw * low_liquidity_multiplier).min(100.0);

    let recent = &closes[n.saturating_sub(PUMP_MIN_CANDLES)..];
    let threshold = pump_threshold(daily_return_std_dev(recent), liquidity_type);

    PumpDumpSignal {
        is_pumping: pump_score >= threshold && price_change > 0.0,
        is_dumping: dump_score >= threshold && price_change < 0.0,
        pump_score,
        dump_score,
        threshold,
        volume_increase,
        price_change,
        price_velocity,
        intraday_pump,
        intraday_dump,
        low_liquidity_multiplier,
        liquidity_type,
    }
}

/// Percent beyond the upper / lower band, when the close is outside it
fn band_deviations(bands: &BollingerBands, price: f64) -> (Option<f64>, Option<f64>) {
    let above = bands
        .upper
        .filter(|upper| price > *upper)
        .map(|upper| pct_change(upper, price));
    let below = bands
        .lower
        .filter(|lower| price < *lower)
        .map(|lower| -pct_change(lower, price));
    (above, below)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_candles(n: usize, price: f64, volume: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new("PUMP-USD", i as i64 * 86_400, price, price, price, price, volume))
            .collect()
    }

    #[test]
    fn test_short_history_is_neutral() {
        let signal = detect_pump_dump(&flat_candles(29, 100.0, 1_000.0));
        assert!(!signal.is_pumping);
        assert!(!signal.is_dumping);
        assert_eq!(signal.pump_score, 0.0);
        assert_eq!(signal.dump_score, 0.0);
    }

    #[test]
    fn test_spike_on_heavy_volume_is_a_pump() {
        let mut candles = flat_candles(60, 100.0, 1_000.0);
        candles.push(Candle::new("PUMP-USD", 60 * 86_400, 100.0, 126.0, 99.0, 125.0, 5_000.0));

        let signal = detect_pump_dump(&candles);
        assert!(signal.is_pumping);
        assert!(!signal.is_dumping);
        assert!(signal.pump_score >= 70.0);
        assert_eq!(signal.liquidity_type, LiquidityType::High);
        assert!((signal.volume_increase - 400.0).abs() < 1e-9);
        assert!((signal.price_velocity - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_crash_is_a_dump() {
        let mut candles = flat_candles(60, 100.0, 1_000.0);
        candles.push(Candle::new("PUMP-USD", 60 * 86_400, 100.0, 101.0, 74.0, 75.0, 5_000.0));

        let signal = detect_pump_dump(&candles);
        assert!(signal.is_dumping);
        assert!(!signal.is_pumping);
        assert!(signal.dump_score >= 70.0);
    }

    #[test]
    fn test_quiet_day_is_not_flagged() {
        let mut candles = flat_candles(60, 100.0, 1_000.0);
        candles.push(Candle::new("PUMP-USD", 60 * 86_400, 100.0, 101.0, 99.5, 100.5, 400.0));

        let signal = detect_pump_dump(&candles);
        assert!(!signal.is_pumping);
        assert_eq!(signal.liquidity_type, LiquidityType::Low);
        assert!((signal.low_liquidity_multiplier - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_adjustments() {
        assert_eq!(pump_threshold(1.0, LiquidityType::Low), 50.0);
        assert_eq!(pump_threshold(3.0, LiquidityType::High), 60.0);
        assert_eq!(pump_threshold(10.0, LiquidityType::Normal), 70.0);
    }
}
