//! Pair Analyzer
//!
//! Pulls the short (30d) and long (250d) candle windows for one pair, runs
//! the indicator library, the price-level analyzer, the composite scorer and
//! the pump/dump detector, and assembles one `PairAnalysis`.
//!
//! | Window | Indicators                                                        |
//! |--------|-------------------------------------------------------------------|
//! | short  | RSI, Bollinger, ATR, ADX, Stochastic, Williams %R, CCI, MFI, ROC, |
//! |        | volume oscillator, annualized volatility                          |
//! | long   | MACD, SMA/EMA tiers, Ichimoku, Stochastic RSI, OBV, high/low,     |
//! |        | weekly/monthly change, pump/dump detector                         |
//! | levels | last `level_window_days` of the long window: price levels,        |
//! |        | local extrema, Fibonacci                                          |

use super::candle_store::CandleStore;
use super::price_levels::{analyze_price_levels, calculate_fibonacci_levels};
use super::pump_detector::detect_pump_dump;
use super::scorer::{calculate_scores, ScoreInputs};
use crate::constants::{
    ADX_PERIOD, ATR_PERIOD, BOLLINGER_PERIOD, BOLLINGER_STD_DEV, CCI_PERIOD, EXTREMA_CLUSTER_THRESHOLD,
    EXTREMA_LOOKBACK, MAX_PRICE_LEVELS, MFI_PERIOD, RSI_PERIOD, ROC_PERIOD, SECONDS_PER_DAY,
    STOCHASTIC_D_PERIOD, STOCHASTIC_K_PERIOD, STOCH_RSI_D_SMOOTH, STOCH_RSI_K_SMOOTH,
    STOCH_RSI_PERIOD, VOLUME_OSC_FAST, VOLUME_OSC_SLOW, WILLIAMS_R_PERIOD,
};
use crate::error::{AppError, Result};
use crate::indicators::{
    calculate_adx, calculate_annualized_volatility, calculate_atr, calculate_bollinger_bands,
    calculate_cci, calculate_ichimoku, calculate_macd, calculate_mfi, calculate_moving_averages,
    calculate_obv, calculate_roc_value, calculate_rsi, calculate_stoch_rsi, calculate_stochastic,
    calculate_volume_oscillator, calculate_williams_r, find_extrema_levels, mean, MacdTrend,
};
use crate::models::{AnalysisConfig, CandleSeries, PairAnalysis};
use crate::utils::pct_change;
use chrono::Utc;
use tracing::debug;

/// Window end for a run: the pinned `as_of` or now
pub fn window_end(config: &AnalysisConfig) -> i64 {
    config.as_of.unwrap_or_else(|| Utc::now().timestamp())
}

/// Fetch one window `[end - days, end]` as a series
pub async fn fetch_window<S: CandleStore + ?Sized>(
    store: &S,
    pair: &str,
    end: i64,
    days: i64,
) -> Result<CandleSeries> {
    let start = end - days * SECONDS_PER_DAY;
    let candles = store
        .get_candles(pair, start, end)
        .await
        .map_err(|e| AppError::Upstream(format!("{}: {}", pair, e)))?;
    Ok(CandleSeries::new(pair, candles))
}

/// Fetch both windows for `pair` and analyze them
///
/// # Errors
/// `MissingPairData` when either window is empty, `Upstream` when the store fails.
pub async fn analyze_pair<S: CandleStore + ?Sized>(
    store: &S,
    pair: &str,
    config: &AnalysisConfig,
    end: i64,
) -> Result<PairAnalysis> {
    let short = fetch_window(store, pair, end, config.short_window_days).await?;
    let long = fetch_window(store, pair, end, config.long_window_days).await?;
    build_pair_analysis(&short, &long, config.level_window_days.max(1) as usize)
}

/// Percent change of the last close vs the close `days_back` bars earlier; 0 without history
fn change_over(series: &CandleSeries, days_back: usize, price: f64) -> f64 {
    series
        .close_days_back(days_back)
        .map_or(0.0, |past| pct_change(past, price))
}

/// Assemble a `PairAnalysis` from already-fetched windows
///
/// # Arguments
/// * `short` - Short window (about 30 daily candles)
/// * `long` - Long window (about 250 daily candles), ending at the same candle
/// * `level_window` - Candles from the end of `long` used for level detection
pub fn build_pair_analysis(short: &CandleSeries, long: &CandleSeries, level_window: usize) -> Result<PairAnalysis> {
    let pair = long.pair().to_string();
    let (last, last_short) = match (long.last(), short.last()) {
        (Some(last), Some(last_short)) => (last, last_short),
        _ => return Err(AppError::MissingPairData(pair)),
    };

    let price = last.close;
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::MissingPairData(format!("{}: no valid close price", pair)));
    }
    if last_short.timestamp != last.timestamp {
        debug!(pair = %pair, "Short and long windows end on different candles");
    }

    // Short window
    let s_highs = short.highs();
    let s_lows = short.lows();
    let s_closes = short.closes();
    let s_volumes = short.volumes();

    let rsi = calculate_rsi(&s_closes, RSI_PERIOD);
    let bollinger_bands = calculate_bollinger_bands(&s_closes, BOLLINGER_PERIOD, BOLLINGER_STD_DEV);
    let atr = calculate_atr(&s_highs, &s_lows, &s_closes, ATR_PERIOD);
    let adx = calculate_adx(&s_highs, &s_lows, &s_closes, ADX_PERIOD);
    let stochastic = calculate_stochastic(&s_highs, &s_lows, &s_closes, STOCHASTIC_K_PERIOD, STOCHASTIC_D_PERIOD);
    let williams_r = calculate_williams_r(&s_highs, &s_lows, &s_closes, WILLIAMS_R_PERIOD);
    let cci = calculate_cci(&s_highs, &s_lows, &s_closes, CCI_PERIOD);
    let mfi = calculate_mfi(&s_highs, &s_lows, &s_closes, &s_volumes, MFI_PERIOD);
    let roc = calculate_roc_value(&s_closes, ROC_PERIOD);
    let volume_oscillator = calculate_volume_oscillator(&s_volumes, VOLUME_OSC_FAST, VOLUME_OSC_SLOW);
    let volatility = calculate_annualized_volatility(&s_closes);

    // Long window
    let l_highs = long.highs();
    let l_lows = long.lows();
    let l_closes = long.closes();

    let macd = calculate_macd(&l_closes);
    let moving_averages = calculate_moving_averages(&l_closes);
    let ichimoku = calculate_ichimoku(&l_highs, &l_lows, &l_closes);
    let stoch_rsi = calculate_stoch_rsi(
        &l_closes,
        RSI_PERIOD,
        STOCH_RSI_PERIOD,
        STOCH_RSI_K_SMOOTH,
        STOCH_RSI_D_SMOOTH,
    );
    let obv = calculate_obv(&l_closes, &long.volumes());

    if macd.trend == MacdTrend::InsufficientData {
        debug!(pair = %pair, candles = long.len(), "MACD: insufficient data");
    }
    if rsi.is_none() {
        debug!(pair = %pair, candles = short.len(), "RSI: insufficient data");
    }

    let high = l_highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = l_lows.iter().copied().fold(f64::INFINITY, f64::min);
    let distance_from_high = if high.is_finite() {
        -pct_change(high, price)
    } else {
        0.0
    };
    let distance_from_low = if low.is_finite() {
        pct_change(low, price)
    } else {
        0.0
    };

    let daily_change = long.previous().map_or(0.0, |prev| pct_change(prev.close, price));
    let weekly_change = change_over(long, 7, price);
    let monthly_change = change_over(long, 30, price);

    let volume_usd = last.usd_volume();
    let usd_volumes = long.usd_volumes();
    let volume_ma7_usd = mean(&usd_volumes[usd_volumes.len().saturating_sub(7)..]);

    // Levels
    let level_series = long.tail(level_window);
    let price_levels = analyze_price_levels(level_series.candles(), price);
    let extrema_levels = find_extrema_levels(
        &level_series.highs(),
        &level_series.lows(),
        price,
        EXTREMA_LOOKBACK,
        EXTREMA_CLUSTER_THRESHOLD,
        MAX_PRICE_LEVELS,
    );
    let fibonacci = calculate_fibonacci_levels(high, low);

    let pump_dump = detect_pump_dump(long.candles());

    let scores = calculate_scores(&ScoreInputs {
        price,
        rsi,
        macd_histogram: macd.histogram,
        macd_trend: macd.trend,
        stoch_rsi_k: stoch_rsi.map(|s| s.k),
        sma7: moving_averages.sma7,
        sma30: moving_averages.sma30,
        sma50: moving_averages.sma50,
        sma200: moving_averages.sma200,
        daily_change,
        weekly_change,
        distance_from_high,
        distance_from_low,
        adx: adx.adx,
        volatility,
        normalized_atr: atr.normalized_atr,
        volume_oscillator,
    });

    Ok(PairAnalysis {
        pair,
        timestamp: last.timestamp,
        current_price: price,
        daily_change,
        weekly_change,
        monthly_change,
        volume_usd,
        volume_ma7_usd,
        high,
        low,
        distance_from_high,
        distance_from_low,
        volatility,
        rsi,
        stoch_rsi,
        stochastic,
        williams_r,
        cci,
        mfi,
        roc,
        macd,
        adx,
        moving_averages,
        ichimoku,
        bollinger_bands,
        atr,
        obv,
        volume_oscillator,
        price_levels,
        extrema_levels,
        fibonacci,
        scores,
        pump_dump,
    })
}
