//! Trend indicators
//!
//! | Section         | Entry point                  | Minimum bars        |
//! |-----------------|------------------------------|---------------------|
//! | Moving averages | `calculate_moving_averages`  | tier length         |
//! | MACD            | `calculate_macd`             | 35 (26 + 9)         |
//! | ADX / DI        | `calculate_adx`              | 2 x period          |
//! | Ichimoku Cloud  | `calculate_ichimoku`         | 52                  |

use super::series::{calculate_ema, calculate_sma, rolling_max, rolling_min, wilder_smooth};
use super::volatility::calculate_true_range;
use crate::constants::{
    ICHIMOKU_DISPLACEMENT, ICHIMOKU_KIJUN, ICHIMOKU_SENKOU_B, ICHIMOKU_TENKAN, INSUFFICIENT_DATA,
    MACD_FAST, MACD_MIN_POINTS, MACD_SIGNAL, MACD_SLOW, MA_LONG, MA_MEDIUM, MA_SHORT, MA_TREND,
};
use crate::utils::{last_value, safe_div};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latest SMA / EMA value per tier; `None` when the series is shorter than the tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma7: Option<f64>,
    pub sma30: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub ema7: Option<f64>,
    pub ema30: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
}

/// Calculate all moving-average tiers from one close series
pub fn calculate_moving_averages(closes: &[f64]) -> MovingAverages {
    let sma = |p| last_value(&calculate_sma(closes, p));
    let ema = |p| last_value(&calculate_ema(closes, p));

    MovingAverages {
        sma7: sma(MA_SHORT),
        sma30: sma(MA_MEDIUM),
        sma50: sma(MA_LONG),
        sma200: sma(MA_TREND),
        ema7: ema(MA_SHORT),
        ema30: ema(MA_MEDIUM),
        ema50: ema(MA_LONG),
        ema200: ema(MA_TREND),
    }
}

/// MACD trend label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacdTrend {
    #[serde(rename = "Strong Uptrend")]
    StrongUptrend,
    #[serde(rename = "Weak Uptrend")]
    WeakUptrend,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Weak Downtrend")]
    WeakDowntrend,
    #[serde(rename = "Strong Downtrend")]
    StrongDowntrend,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl MacdTrend {
    pub fn label(&self) -> &'static str {
        match self {
            MacdTrend::StrongUptrend => "Strong Uptrend",
            MacdTrend::WeakUptrend => "Weak Uptrend",
            MacdTrend::Neutral => "Neutral",
            MacdTrend::WeakDowntrend => "Weak Downtrend",
            MacdTrend::StrongDowntrend => "Strong Downtrend",
            MacdTrend::InsufficientData => INSUFFICIENT_DATA,
        }
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, MacdTrend::StrongUptrend | MacdTrend::StrongDowntrend)
    }

    pub fn is_weak(&self) -> bool {
        matches!(self, MacdTrend::WeakUptrend | MacdTrend::WeakDowntrend)
    }
}

impl fmt::Display for MacdTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sign change of `(MACD - signal)` between the last two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    Bullish,
    Bearish,
}

/// Latest MACD reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    /// Change of the MACD line over the last bar
    pub macd_slope: f64,
    pub trend: MacdTrend,
    pub crossover: Option<Crossover>,
}

impl MacdResult {
    /// Zero-filled placeholder used when the series is too short
    pub fn insufficient() -> Self {
        Self {
            macd: 0.0,
            signal: 0.0,
            histogram: 0.0,
            macd_slope: 0.0,
            trend: MacdTrend::InsufficientData,
            crossover: None,
        }
    }
}

/// Aligned MACD, signal and histogram lines (all the same length)
#[derive(Debug, Clone, Default)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Full MACD series; `None` if there are not enough closes for a signal line
pub fn calculate_macd_series(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdSeries> {
    if fast == 0 || fast >= slow || signal == 0 {
        return None;
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);
    if slow_ema.is_empty() {
        return None;
    }

    // fast_ema starts (slow - fast) bars earlier than slow_ema
    let shift = slow - fast;
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast_ema[i + shift] - slow_value)
        .collect();

    let signal_line = calculate_ema(&macd_line, signal);
    if signal_line.is_empty() {
        return None;
    }

    let offset = signal - 1;
    let macd: Vec<f64> = macd_line[offset..].to_vec();
    let histogram: Vec<f64> = macd
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect();

    Some(MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    })
}

/// MACD(12, 26, 9) with trend classification.
///
/// Needs at least 35 closes; shorter input returns [`MacdResult::insufficient`].
pub fn calculate_macd(closes: &[f64]) -> MacdResult {
    if closes.len() < MACD_MIN_POINTS {
        return MacdResult::insufficient();
    }

    let series = match calculate_macd_series(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL) {
        Some(series) if series.macd.len() >= 2 => series,
        _ => return MacdResult::insufficient(),
    };

    let n = series.macd.len();
    let (macd, prev_macd) = (series.macd[n - 1], series.macd[n - 2]);
    let (signal, prev_signal) = (series.signal[n - 1], series.signal[n - 2]);
    if !macd.is_finite() || !signal.is_finite() {
        return MacdResult::insufficient();
    }

    let crossover = detect_crossover(prev_macd - prev_signal, macd - signal);

    MacdResult {
        macd,
        signal,
        histogram: macd - signal,
        macd_slope: macd - prev_macd,
        trend: classify_macd_trend(prev_macd, macd, prev_signal, signal),
        crossover,
    }
}

fn detect_crossover(prev_diff: f64, diff: f64) -> Option<Crossover> {
    if prev_diff <= 0.0 && diff > 0.0 {
        Some(Crossover::Bullish)
    } else if prev_diff >= 0.0 && diff < 0.0 {
        Some(Crossover::Bearish)
    } else {
        None
    }
}

/// Deterministic MACD trend rule table.
///
/// | Label            | Condition                                                   |
/// |------------------|-------------------------------------------------------------|
/// | Strong Uptrend   | MACD > signal, histogram > 0, MACD rising, signal rising    |
/// | Strong Downtrend | MACD < signal, histogram < 0, MACD falling, signal falling  |
/// | Weak Uptrend     | bullish crossover, or MACD > signal with histogram > 0      |
/// | Weak Downtrend   | bearish crossover, or MACD < signal with histogram < 0      |
/// | Neutral          | otherwise                                                   |
pub fn classify_macd_trend(prev_macd: f64, macd: f64, prev_signal: f64, signal: f64) -> MacdTrend {
    let histogram = macd - signal;
    let macd_delta = macd - prev_macd;
    let signal_delta = signal - prev_signal;
    let crossover = detect_crossover(prev_macd - prev_signal, histogram);

    if macd > signal && histogram > 0.0 && macd_delta > 0.0 && signal_delta > 0.0 {
        MacdTrend::StrongUptrend
    } else if macd < signal && histogram < 0.0 && macd_delta < 0.0 && signal_delta < 0.0 {
        MacdTrend::StrongDowntrend
    } else if crossover == Some(Crossover::Bullish) || (macd > signal && histogram > 0.0) {
        MacdTrend::WeakUptrend
    } else if crossover == Some(Crossover::Bearish) || (macd < signal && histogram < 0.0) {
        MacdTrend::WeakDowntrend
    } else {
        MacdTrend::Neutral
    }
}

/// ADX trend-strength label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStrength {
    #[serde(rename = "Strong Uptrend")]
    StrongUptrend,
    #[serde(rename = "Moderate Uptrend")]
    ModerateUptrend,
    #[serde(rename = "Weak Uptrend")]
    WeakUptrend,
    #[serde(rename = "Strong Downtrend")]
    StrongDowntrend,
    #[serde(rename = "Moderate Downtrend")]
    ModerateDowntrend,
    #[serde(rename = "Weak Downtrend")]
    WeakDowntrend,
    #[serde(rename = "No Clear Trend")]
    NoClearTrend,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl TrendStrength {
    pub fn label(&self) -> &'static str {
        match self {
            TrendStrength::StrongUptrend => "Strong Uptrend",
            TrendStrength::ModerateUptrend => "Moderate Uptrend",
            TrendStrength::WeakUptrend => "Weak Uptrend",
            TrendStrength::StrongDowntrend => "Strong Downtrend",
            TrendStrength::ModerateDowntrend => "Moderate Downtrend",
            TrendStrength::WeakDowntrend => "Weak Downtrend",
            TrendStrength::NoClearTrend => "No Clear Trend",
            TrendStrength::InsufficientData => INSUFFICIENT_DATA,
        }
    }

    /// Classify from ADX and the dominant directional indicator
    pub fn classify(adx: f64, plus_di: f64, minus_di: f64) -> Self {
        let up = plus_di >= minus_di;
        if adx > 40.0 {
            if up {
                TrendStrength::StrongUptrend
            } else {
                TrendStrength::StrongDowntrend
            }
        } else if adx > 25.0 {
            if up {
                TrendStrength::ModerateUptrend
            } else {
                TrendStrength::ModerateDowntrend
            }
        } else if adx > 20.0 {
            if up {
                TrendStrength::WeakUptrend
            } else {
                TrendStrength::WeakDowntrend
            }
        } else {
            TrendStrength::NoClearTrend
        }
    }
}

impl fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Latest ADX reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxResult {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub trend_strength: TrendStrength,
}

impl AdxResult {
    pub fn insufficient() -> Self {
        Self {
            adx: 0.0,
            plus_di: 0.0,
            minus_di: 0.0,
            trend_strength: TrendStrength::InsufficientData,
        }
    }
}

/// ADX (Average Directional Index) with Wilder smoothing.
///
/// 1. +DM / -DM and True Range from consecutive bars
/// 2. Wilder-smooth all three over `period`
/// 3. +DI = smoothed +DM / smoothed TR * 100, -DI likewise
/// 4. DX = |+DI - -DI| / (+DI + -DI) * 100
/// 5. ADX = Wilder-smoothed DX over `period`
///
/// Needs `2 * period` bars.
pub fn calculate_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> AdxResult {
    let n = closes.len();
    if period == 0 || n < 2 * period || highs.len() != n || lows.len() != n {
        return AdxResult::insufficient();
    }

    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];
        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
    }
    let true_range = calculate_true_range(highs, lows, closes);

    let smoothed_plus = wilder_smooth(&plus_dm, period);
    let smoothed_minus = wilder_smooth(&minus_dm, period);
    let smoothed_tr = wilder_smooth(&true_range, period);

    let mut plus_di = Vec::with_capacity(smoothed_tr.len());
    let mut minus_di = Vec::with_capacity(smoothed_tr.len());
    let mut dx = Vec::with_capacity(smoothed_tr.len());
    for i in 0..smoothed_tr.len() {
        let p = safe_div(smoothed_plus[i], smoothed_tr[i]) * 100.0;
        let m = safe_div(smoothed_minus[i], smoothed_tr[i]) * 100.0;
        plus_di.push(p);
        minus_di.push(m);
        dx.push(safe_div((p - m).abs(), p + m) * 100.0);
    }

    let adx_line = wilder_smooth(&dx, period);
    let (adx, p, m) = match (last_value(&adx_line), last_value(&plus_di), last_value(&minus_di)) {
        (Some(adx), Some(p), Some(m)) => (adx, p, m),
        _ => return AdxResult::insufficient(),
    };

    AdxResult {
        adx,
        plus_di: p,
        minus_di: m,
        trend_strength: TrendStrength::classify(adx, p, m),
    }
}

/// Price position relative to the cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudSignal {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    #[serde(rename = "Bullish")]
    Bullish,
    #[serde(rename = "Bearish")]
    Bearish,
    #[serde(rename = "Strong Bearish")]
    StrongBearish,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl CloudSignal {
    pub fn label(&self) -> &'static str {
        match self {
            CloudSignal::StrongBullish => "Strong Bullish",
            CloudSignal::Bullish => "Bullish",
            CloudSignal::Bearish => "Bearish",
            CloudSignal::StrongBearish => "Strong Bearish",
            CloudSignal::InsufficientData => INSUFFICIENT_DATA,
        }
    }
}

/// Ichimoku Cloud reading.
///
/// `senkou_a` / `senkou_b` are the cloud values under the current bar (the
/// spans computed `displacement` bars ago). `projected_span_a` / `projected_span_b`
/// hold the spans computed over the last `displacement` bars, i.e. the cloud
/// drawn forward from today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IchimokuCloud {
    pub tenkan: Option<f64>,
    pub kijun: Option<f64>,
    pub senkou_a: Option<f64>,
    pub senkou_b: Option<f64>,
    pub chikou: Option<f64>,
    pub signal: CloudSignal,
    pub tk_cross: Option<Crossover>,
    pub projected_span_a: Vec<f64>,
    pub projected_span_b: Vec<f64>,
}

impl IchimokuCloud {
    pub fn insufficient() -> Self {
        Self {
            tenkan: None,
            kijun: None,
            senkou_a: None,
            senkou_b: None,
            chikou: None,
            signal: CloudSignal::InsufficientData,
            tk_cross: None,
            projected_span_a: Vec::new(),
            projected_span_b: Vec::new(),
        }
    }
}

/// Midpoint of the highest high and lowest low for each trailing window
fn donchian_mid(highs: &[f64], lows: &[f64], period: usize) -> Vec<f64> {
    rolling_max(highs, period)
        .iter()
        .zip(rolling_min(lows, period).iter())
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}

/// Ichimoku Cloud (9, 26, 52, displacement 26)
pub fn calculate_ichimoku(highs: &[f64], lows: &[f64], closes: &[f64]) -> IchimokuCloud {
    let n = closes.len();
    if n < ICHIMOKU_SENKOU_B || highs.len() != n || lows.len() != n {
        return IchimokuCloud::insufficient();
    }

    // Align every line on the senkou-B start (index ICHIMOKU_SENKOU_B - 1)
    let tenkan_line = donchian_mid(highs, lows, ICHIMOKU_TENKAN);
    let kijun_line = donchian_mid(highs, lows, ICHIMOKU_KIJUN);
    let span_b_line = donchian_mid(highs, lows, ICHIMOKU_SENKOU_B);

    let tenkan = &tenkan_line[ICHIMOKU_SENKOU_B - ICHIMOKU_TENKAN..];
    let kijun = &kijun_line[ICHIMOKU_SENKOU_B - ICHIMOKU_KIJUN..];
    let span_a_line: Vec<f64> = tenkan.iter().zip(kijun.iter()).map(|(t, k)| (t + k) / 2.0).collect();

    let len = span_b_line.len();
    let projected_start = len.saturating_sub(ICHIMOKU_DISPLACEMENT);
    let projected_span_a = span_a_line[projected_start..].to_vec();
    let projected_span_b = span_b_line[projected_start..].to_vec();

    // Cloud under today's bar was computed `displacement` bars ago; fall back
    // to the latest spans while that much history is not yet available.
    let cloud_idx = len.checked_sub(ICHIMOKU_DISPLACEMENT + 1).unwrap_or(len - 1);
    let senkou_a = span_a_line[cloud_idx];
    let senkou_b = span_b_line[cloud_idx];

    let price = closes[n - 1];
    let signal = if price > senkou_a && price > senkou_b {
        CloudSignal::StrongBullish
    } else if price < senkou_a && price < senkou_b {
        CloudSignal::StrongBearish
    } else if senkou_a >= senkou_b {
        CloudSignal::Bullish
    } else {
        CloudSignal::Bearish
    };

    let tk_cross = if tenkan.len() >= 2 {
        let last = tenkan.len() - 1;
        detect_crossover(tenkan[last - 1] - kijun[last - 1], tenkan[last] - kijun[last])
    } else {
        None
    };

    IchimokuCloud {
        tenkan: tenkan.last().copied(),
        kijun: kijun.last().copied(),
        senkou_a: Some(senkou_a),
        senkou_b: Some(senkou_b),
        chikou: n.checked_sub(ICHIMOKU_DISPLACEMENT + 1).map(|_| price),
        signal,
        tk_cross,
        projected_span_a,
        projected_span_b,
    }
}
