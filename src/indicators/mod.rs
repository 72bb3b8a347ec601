//! Technical indicators over plain `f64` slices (oldest first).
//!
//! Every function is pure. Short inputs yield `None`, an empty series or an
//! `insufficient()` placeholder instead of an error.

pub mod levels;
pub mod momentum;
pub mod series;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use levels::{find_extrema_levels, find_local_highs, find_local_lows, ExtremaLevels};
pub use momentum::{
    calculate_cci, calculate_mfi, calculate_roc_value, calculate_rsi, calculate_rsi_series,
    calculate_stoch_rsi, calculate_stochastic, calculate_williams_r, StochRsiResult,
    StochasticResult,
};
pub use series::{
    calculate_ema, calculate_ma_score, calculate_sma, calculate_std_dev, log_returns, mean,
    population_std_dev, wilder_smooth,
};
pub use trend::{
    calculate_adx, calculate_ichimoku, calculate_macd, calculate_macd_series,
    calculate_moving_averages, classify_macd_trend, AdxResult, CloudSignal, Crossover,
    IchimokuCloud, MacdResult, MacdTrend, MovingAverages, TrendStrength,
};
pub use volatility::{
    calculate_annualized_volatility, calculate_atr, calculate_atr_series,
    calculate_bollinger_bands, calculate_true_range, daily_return_std_dev, AtrResult,
    BollingerBands, BollingerSignal, VolatilityLevel,
};
pub use volume::{calculate_obv, calculate_obv_series, calculate_volume_oscillator};
