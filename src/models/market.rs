use super::PairAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Market-wide sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "Strongly Bullish")]
    StronglyBullish,
    Bullish,
    Neutral,
    Bearish,
    #[serde(rename = "Strongly Bearish")]
    StronglyBearish,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::StronglyBullish => "Strongly Bullish",
            Sentiment::Bullish => "Bullish",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bearish => "Bearish",
            Sentiment::StronglyBearish => "Strongly Bearish",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pairs per RSI zone (pairs without an RSI are not counted)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsiDistribution {
    /// RSI < 30
    pub oversold: usize,
    pub neutral: usize,
    /// RSI > 70
    pub overbought: usize,
}

/// One entry of the top gainers / losers lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub pair: String,
    pub price: f64,
    pub daily_change: f64,
    pub volume_usd: f64,
}

/// Aggregate over every pair analyzed in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_pairs: usize,
    pub advances: usize,
    pub declines: usize,
    pub unchanged: usize,
    /// advances / max(declines, 1)
    pub advance_decline_ratio: f64,
    pub average_rsi: f64,
    pub average_macd: f64,
    /// Percent of pairs whose MACD label is "Strong Uptrend"
    pub strong_uptrend_pct: f64,
    /// Percent of pairs whose MACD label is "Strong Downtrend"
    pub strong_downtrend_pct: f64,
    pub sentiment: Sentiment,
    pub rsi_distribution: RsiDistribution,
    /// MACD label -> pair count
    pub trend_distribution: BTreeMap<String, usize>,
    pub top_gainers: Vec<Mover>,
    pub top_losers: Vec<Mover>,
    /// Sum of latest USD volume over all pairs
    pub total_volume_usd: f64,
    /// Total USD volume vs the sum of 7-day USD volume averages, percent
    pub volume_change: f64,
}

/// Result of one `analyze_pairs` run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBatch {
    pub pairs: Vec<PairAnalysis>,
    pub market_summary: MarketSummary,
}
