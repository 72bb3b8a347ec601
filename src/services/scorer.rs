//! Composite Scorer
//!
//! Deterministic 0..1 scores built from already-computed indicator values.
//! Each score starts from the neutral 0.5 and moves by fixed deltas per rule;
//! the result is always clamped into [0, 1].

use crate::constants::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::indicators::MacdTrend;
use crate::models::CompositeScores;
use crate::utils::{clamp_unit, finite_or, safe_div};

/// Indicator values consumed by the scorers
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreInputs {
    pub price: f64,
    pub rsi: Option<f64>,
    pub macd_histogram: f64,
    pub macd_trend: MacdTrend,
    pub stoch_rsi_k: Option<f64>,
    pub sma7: Option<f64>,
    pub sma30: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub daily_change: f64,
    pub weekly_change: f64,
    pub distance_from_high: f64,
    pub distance_from_low: f64,
    pub adx: f64,
    /// Annualized volatility, percent
    pub volatility: f64,
    /// ATR as percent of price
    pub normalized_atr: Option<f64>,
    pub volume_oscillator: Option<f64>,
}

impl Default for ScoreInputs {
    fn default() -> Self {
        Self {
            price: 0.0,
            rsi: None,
            macd_histogram: 0.0,
            macd_trend: MacdTrend::InsufficientData,
            stoch_rsi_k: None,
            sma7: None,
            sma30: None,
            sma50: None,
            sma200: None,
            daily_change: 0.0,
            weekly_change: 0.0,
            distance_from_high: 0.0,
            distance_from_low: 0.0,
            adx: 0.0,
            volatility: 0.0,
            normalized_atr: None,
            volume_oscillator: None,
        }
    }
}

/// +delta when `a > b`, -delta when `a < b`, 0 otherwise or when either is missing
fn ordered_delta(a: Option<f64>, b: Option<f64>, delta: f64) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a > b => delta,
        (Some(a), Some(b)) if a < b => -delta,
        _ => 0.0,
    }
}

/// Short-term score.
///
/// * RSI: +0.1 oversold, -0.1 overbought, proportional in between
/// * MACD histogram sign: +/-0.1
/// * SMA7 vs SMA30: +/-0.1
/// * Stochastic RSI %K below 20 / above 80: +/-0.1
/// * 7-day momentum scaled to a 10% move: up to +/-0.1
pub fn calculate_short_term_score(inputs: &ScoreInputs) -> f64 {
    let mut score = 0.5;

    if let Some(rsi) = inputs.rsi.filter(|r| r.is_finite()) {
        score += if rsi < RSI_OVERSOLD {
            0.1
        } else if rsi > RSI_OVERBOUGHT {
            -0.1
        } else {
            (50.0 - rsi) / 200.0
        };
    }

    if inputs.macd_histogram > 0.0 {
        score += 0.1;
    } else if inputs.macd_histogram < 0.0 {
        score -= 0.1;
    }

    score += ordered_delta(inputs.sma7, inputs.sma30, 0.1);

    if let Some(k) = inputs.stoch_rsi_k.filter(|k| k.is_finite()) {
        if k < 20.0 {
            score += 0.1;
        } else if k > 80.0 {
            score -= 0.1;
        }
    }

    let momentum = (finite_or(inputs.weekly_change, 0.0) / 10.0).clamp(-1.0, 1.0);
    score += momentum * 0.1;

    clamp_unit(score)
}

/// Long-term score.
///
/// * SMA50 vs SMA200: +/-0.15
/// * normalized distance from low vs distance from high: up to +/-0.2
/// * ADX: +0.15 above 50, +0.1 above 25, -0.1 below 20
pub fn calculate_long_term_score(inputs: &ScoreInputs) -> f64 {
    let mut score = 0.5;

    score += ordered_delta(inputs.sma50, inputs.sma200, 0.15);

    let from_high = finite_or(inputs.distance_from_high, 0.0).abs();
    let from_low = finite_or(inputs.distance_from_low, 0.0).abs();
    let total = from_high + from_low;
    score += (safe_div(from_low, total) - safe_div(from_high, total)) * 0.2;

    let adx = finite_or(inputs.adx, 0.0);
    if adx > 50.0 {
        score += 0.15;
    } else if adx > 25.0 {
        score += 0.1;
    } else if adx < 20.0 {
        score -= 0.1;
    }

    clamp_unit(score)
}

/// `mean(short, long) * mean(max(0, 1 - vol/100), max(0, 1 - atr/100))`
pub fn calculate_risk_adjusted_score(short_term: f64, long_term: f64, volatility: f64, normalized_atr: f64) -> f64 {
    let base = (short_term + long_term) / 2.0;
    let vol_factor = (1.0 - finite_or(volatility, 100.0) / 100.0).max(0.0);
    let atr_factor = (1.0 - finite_or(normalized_atr, 100.0) / 100.0).max(0.0);
    clamp_unit(base * (vol_factor + atr_factor) / 2.0)
}

fn rsi_subscore(rsi: Option<f64>) -> f64 {
    match rsi.filter(|r| r.is_finite()) {
        None => 0.5,
        Some(r) if r < 30.0 => 0.8,
        Some(r) if r < 45.0 => 0.6,
        Some(r) if r <= 55.0 => 0.5,
        Some(r) if r <= 70.0 => 0.4,
        Some(_) => 0.2,
    }
}

fn macd_subscore(trend: MacdTrend) -> f64 {
    match trend {
        MacdTrend::StrongUptrend => 1.0,
        MacdTrend::WeakUptrend => 0.7,
        MacdTrend::Neutral | MacdTrend::InsufficientData => 0.5,
        MacdTrend::WeakDowntrend => 0.3,
        MacdTrend::StrongDowntrend => 0.0,
    }
}

fn volume_subscore(oscillator: Option<f64>) -> f64 {
    match oscillator.filter(|v| v.is_finite()) {
        None => 0.5,
        Some(v) if v > 20.0 => 0.8,
        Some(v) if v > 0.0 => 0.6,
        Some(v) if v > -20.0 => 0.4,
        Some(_) => 0.2,
    }
}

fn change_subscore(change: f64) -> f64 {
    let change = finite_or(change, 0.0);
    if change > 5.0 {
        0.9
    } else if change > 2.0 {
        0.7
    } else if change > 0.0 {
        0.6
    } else if change > -2.0 {
        0.4
    } else if change > -5.0 {
        0.3
    } else {
        0.1
    }
}

/// Share of satisfied orderings in price > SMA7 > SMA30 > SMA50 > SMA200
fn ma_alignment_subscore(inputs: &ScoreInputs) -> f64 {
    let chain = [Some(inputs.price), inputs.sma7, inputs.sma30, inputs.sma50, inputs.sma200];
    let (aligned, compared) = chain
        .windows(2)
        .filter_map(|w| match (w[0], w[1]) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some(a > b),
            _ => None,
        })
        .fold((0usize, 0usize), |(aligned, compared), up| (aligned + up as usize, compared + 1));

    if compared == 0 {
        0.5
    } else {
        aligned as f64 / compared as f64
    }
}

fn atr_subscore(normalized_atr: Option<f64>) -> f64 {
    match normalized_atr.filter(|v| v.is_finite()) {
        None => 0.5,
        Some(v) if v < 1.0 => 0.8,
        Some(v) if v < 3.0 => 0.6,
        Some(v) if v < 5.0 => 0.4,
        Some(_) => 0.2,
    }
}

fn distance_subscore(distance_from_high: f64) -> f64 {
    let distance = finite_or(distance_from_high, 100.0).abs();
    if distance < 5.0 {
        0.8
    } else if distance < 15.0 {
        0.6
    } else if distance < 30.0 {
        0.4
    } else {
        0.2
    }
}

/// Seven-factor weighted blend
///
/// | Factor            | Weight |
/// |-------------------|--------|
/// | RSI               | 15%    |
/// | MACD trend label  | 20%    |
/// | Volume oscillator | 10%    |
/// | Daily change      | 15%    |
/// | MA alignment      | 20%    |
/// | ATR               | 10%    |
/// | Distance to high  | 10%    |
pub fn calculate_enhanced_score(inputs: &ScoreInputs) -> f64 {
    let score = rsi_subscore(inputs.rsi) * 0.15
        + macd_subscore(inputs.macd_trend) * 0.20
        + volume_subscore(inputs.volume_oscillator) * 0.10
        + change_subscore(inputs.daily_change) * 0.15
        + ma_alignment_subscore(inputs) * 0.20
        + atr_subscore(inputs.normalized_atr) * 0.10
        + distance_subscore(inputs.distance_from_high) * 0.10;
    clamp_unit(score)
}

/// All four composite scores
pub fn calculate_scores(inputs: &ScoreInputs) -> CompositeScores {
    let short_term = calculate_short_term_score(inputs);
    let long_term = calculate_long_term_score(inputs);
    let risk_adjusted = calculate_risk_adjusted_score(
        short_term,
        long_term,
        inputs.volatility,
        inputs.normalized_atr.unwrap_or(0.0),
    );

    CompositeScores {
        short_term,
        long_term,
        risk_adjusted,
        enhanced: calculate_enhanced_score(inputs),
    }
}
