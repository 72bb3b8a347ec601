//! Indicator and Analysis Constants
//!
//! Fixed periods, thresholds and windows shared by the indicator library,
//! the scorers and the cross-pair aggregation.
//!
//! ## Default Periods
//!
//! | Indicator      | Period(s)              |
//! |----------------|------------------------|
//! | RSI            | 14                     |
//! | MACD           | 12 / 26 / 9            |
//! | SMA / EMA      | 7, 30, 50, 200         |
//! | Bollinger      | 20, 2 sigma            |
//! | ATR / ADX      | 14                     |
//! | Stochastic     | 14 / 3                 |
//! | CCI            | 20                     |
//! | MFI / ROC      | 14                     |
//! | Ichimoku       | 9 / 26 / 52, shift 26  |

pub const RSI_PERIOD: usize = 14;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Minimum number of closes for a meaningful MACD (slow + signal)
pub const MACD_MIN_POINTS: usize = MACD_SLOW + MACD_SIGNAL;

/// Moving average tiers used for both SMA and EMA
pub const MA_SHORT: usize = 7;
pub const MA_MEDIUM: usize = 30;
pub const MA_LONG: usize = 50;
pub const MA_TREND: usize = 200;

pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_DEV: f64 = 2.0;

/// Bandwidth (%) above which a band breach is labelled "Strong"
pub const BOLLINGER_STRONG_BANDWIDTH: f64 = 20.0;

pub const ATR_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;

pub const STOCHASTIC_K_PERIOD: usize = 14;
pub const STOCHASTIC_D_PERIOD: usize = 3;

pub const WILLIAMS_R_PERIOD: usize = 14;
pub const CCI_PERIOD: usize = 20;
pub const MFI_PERIOD: usize = 14;
pub const ROC_PERIOD: usize = 14;

pub const STOCH_RSI_PERIOD: usize = 14;
pub const STOCH_RSI_K_SMOOTH: usize = 3;
pub const STOCH_RSI_D_SMOOTH: usize = 3;

/// Volume oscillator: fast and slow volume EMAs
pub const VOLUME_OSC_FAST: usize = 5;
pub const VOLUME_OSC_SLOW: usize = 10;

pub const ICHIMOKU_TENKAN: usize = 9;
pub const ICHIMOKU_KIJUN: usize = 26;
pub const ICHIMOKU_SENKOU_B: usize = 52;
pub const ICHIMOKU_DISPLACEMENT: usize = 26;

/// Local-extrema support/resistance lookback and clustering threshold (fraction of last price)
pub const EXTREMA_LOOKBACK: usize = 5;
pub const EXTREMA_CLUSTER_THRESHOLD: f64 = 0.01;

/// Trading days per year used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Fibonacci retracement ratios
pub const FIBONACCI_RATIOS: &[f64] = &[0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

// Price-level analyzer

/// Maximum number of ranked supports / resistances returned
pub const MAX_PRICE_LEVELS: usize = 3;

/// Buckets at or below this strength (0..1) are discarded
pub const MIN_LEVEL_STRENGTH: f64 = 0.15;

/// Buckets need at least this many touches
pub const MIN_LEVEL_TOUCHES: usize = 2;

/// Candles inspected after a touch to classify rebound / rejection
pub const LEVEL_REACTION_CANDLES: usize = 5;

/// Prices below this are treated as sub-cent assets
pub const SUB_CENT_PRICE: f64 = 0.01;

/// Fallback nearest levels when no bucket exists on a side
pub const FALLBACK_SUPPORT_RATIO: f64 = 0.85;
pub const FALLBACK_RESISTANCE_RATIO: f64 = 1.15;

// Pump / dump detector

/// Minimum candles required by the pump/dump detector
pub const PUMP_MIN_CANDLES: usize = 30;

/// Volume baseline (SMA) period for the pump/dump detector
pub const PUMP_VOLUME_BASELINE: usize = 20;

/// Base and floor of the adaptive pump/dump threshold
pub const PUMP_BASE_THRESHOLD: f64 = 70.0;
pub const PUMP_MIN_THRESHOLD: f64 = 50.0;

// Correlation engine

/// Minimum overlapping days required to correlate two pairs
pub const MIN_CORRELATION_DAYS: usize = 7;

/// Minimum average daily USD volume for both legs of a correlation
pub const MIN_CORRELATION_VOLUME_USD: f64 = 300_000.0;

// Trend monitor

/// Absolute daily price move (%) that emits a price event
pub const PRICE_EVENT_THRESHOLD: f64 = 5.0;

/// Absolute daily price move (%) at which a price event is High significance
pub const PRICE_EVENT_HIGH_THRESHOLD: f64 = 10.0;

// Market aggregator

/// Number of gainers / losers reported
pub const TOP_MOVERS_LIMIT: usize = 5;

/// Seconds in one day (candles are daily)
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Default candle windows (days) used by the pair analyzer
pub const SHORT_WINDOW_DAYS: i64 = 30;
pub const LONG_WINDOW_DAYS: i64 = 250;
pub const LEVEL_WINDOW_DAYS: i64 = 180;

/// Label used by every indicator that cannot be computed on the given input
pub const INSUFFICIENT_DATA: &str = "Insufficient Data";
