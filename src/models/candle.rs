use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar for a trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Pair symbol (e.g. "BTC-USD")
    pub pair: String,

    /// Bar open time, unix seconds
    pub timestamp: i64,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Traded volume in base units
    pub volume: f64,
}

impl Candle {
    /// Create a new candle
    pub fn new(
        pair: impl Into<String>,
        timestamp: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            pair: pair.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Volume converted to quote (USD) units using the close
    pub fn usd_volume(&self) -> f64 {
        self.volume * self.close
    }

    /// Timestamp as a UTC datetime
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}
