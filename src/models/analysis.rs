use super::price_level::{FibonacciLevels, PriceLevels};
use crate::indicators::{
    AdxResult, AtrResult, BollingerBands, ExtremaLevels, IchimokuCloud, MacdResult,
    MovingAverages, StochRsiResult, StochasticResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite 0..1 scores (0.5 is neutral)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScores {
    pub short_term: f64,
    pub long_term: f64,
    pub risk_adjusted: f64,
    pub enhanced: f64,
}

impl Default for CompositeScores {
    fn default() -> Self {
        Self {
            short_term: 0.5,
            long_term: 0.5,
            risk_adjusted: 0.5,
            enhanced: 0.5,
        }
    }
}

/// Volume regime of the latest candle relative to its 20-day baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidityType {
    High,
    Normal,
    Low,
}

impl fmt::Display for LiquidityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiquidityType::High => write!(f, "High"),
            LiquidityType::Normal => write!(f, "Normal"),
            LiquidityType::Low => write!(f, "Low"),
        }
    }
}

/// Pump / dump detector output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpDumpSignal {
    pub is_pumping: bool,
    pub is_dumping: bool,
    /// 0..100
    pub pump_score: f64,
    /// 0..100
    pub dump_score: f64,
    /// Score needed to flag a pump or dump
    pub threshold: f64,
    /// Volume vs 20-day average, percent
    pub volume_increase: f64,
    /// Day-over-day close change, percent
    pub price_change: f64,
    /// Price change per unit of relative volume
    pub price_velocity: f64,
    /// Close above the day's low, percent
    pub intraday_pump: f64,
    /// Close below the day's high, percent
    pub intraday_dump: f64,
    /// Amplifier in [1, 2] for moves on thin volume
    pub low_liquidity_multiplier: f64,
    pub liquidity_type: LiquidityType,
}

impl Default for PumpDumpSignal {
    fn default() -> Self {
        Self {
            is_pumping: false,
            is_dumping: false,
            pump_score: 0.0,
            dump_score: 0.0,
            threshold: crate::constants::PUMP_BASE_THRESHOLD,
            volume_increase: 0.0,
            price_change: 0.0,
            price_velocity: 0.0,
            intraday_pump: 0.0,
            intraday_dump: 0.0,
            low_liquidity_multiplier: 1.0,
            liquidity_type: LiquidityType::Normal,
        }
    }
}

/// Full analysis record for one pair in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairAnalysis {
    pub pair: String,

    /// Timestamp of the latest candle (unix seconds)
    pub timestamp: i64,

    pub current_price: f64,

    // Price changes (percent)
    pub daily_change: f64,
    pub weekly_change: f64,
    pub monthly_change: f64,

    /// Latest candle volume in USD
    pub volume_usd: f64,
    /// 7-day average of USD volume
    pub volume_ma7_usd: f64,

    // Long-window extremes
    pub high: f64,
    pub low: f64,
    pub distance_from_high: f64,
    pub distance_from_low: f64,

    /// Annualized volatility of the short window, percent
    pub volatility: f64,

    // Oscillators
    pub rsi: Option<f64>,
    pub stoch_rsi: Option<StochRsiResult>,
    pub stochastic: Option<StochasticResult>,
    pub williams_r: Option<f64>,
    pub cci: Option<f64>,
    pub mfi: Option<f64>,
    pub roc: Option<f64>,

    // Trend
    pub macd: MacdResult,
    pub adx: AdxResult,
    pub moving_averages: MovingAverages,
    pub ichimoku: IchimokuCloud,

    // Volatility
    pub bollinger_bands: BollingerBands,
    pub atr: AtrResult,

    // Volume
    pub obv: Option<f64>,
    pub volume_oscillator: Option<f64>,

    // Levels
    pub price_levels: PriceLevels,
    pub extrema_levels: ExtremaLevels,
    pub fibonacci: Option<FibonacciLevels>,

    pub scores: CompositeScores,
    pub pump_dump: PumpDumpSignal,
}
