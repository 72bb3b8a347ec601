use super::Significance;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field watched by the trend monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendIndicator {
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "Price")]
    Price,
    #[serde(rename = "EMA Cross")]
    EmaCross,
}

impl fmt::Display for TrendIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendIndicator::Macd => write!(f, "MACD"),
            TrendIndicator::Rsi => write!(f, "RSI"),
            TrendIndicator::Price => write!(f, "Price"),
            TrendIndicator::EmaCross => write!(f, "EMA Cross"),
        }
    }
}

/// A monitored field changed between two consecutive analyses of a pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChangeEvent {
    pub pair: String,
    pub indicator: TrendIndicator,
    pub previous_value: String,
    pub new_value: String,
    pub significance: Significance,
    pub description: String,
    /// Timestamp of the newer analysis
    pub timestamp: i64,
}
