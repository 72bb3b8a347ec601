use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelType {
    Support,
    Resistance,
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelType::Support => write!(f, "support"),
            LevelType::Resistance => write!(f, "resistance"),
        }
    }
}

/// A support or resistance zone detected from clustered price touches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Volume-weighted center of the cluster
    pub price: f64,

    /// Strength score in [0, 100]
    pub strength: f64,

    #[serde(rename = "type")]
    pub level_type: LevelType,

    /// Number of highs/lows that landed in the cluster
    pub touches: usize,

    pub description: String,
}

/// Ranked levels around the current price.
///
/// `supports` / `resistances` are ordered strongest first and hold at most
/// three entries each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub supports: Vec<PriceLevel>,
    pub resistances: Vec<PriceLevel>,

    /// Closest support below price, or `price * 0.85` when none was found
    pub nearest_support: f64,

    /// Closest resistance above price, or `price * 1.15` when none was found
    pub nearest_resistance: f64,

    /// (nearest_resistance - nearest_support) / price * 100
    pub channel_width: f64,

    /// (price - nearest_support) / price * 100
    pub distance_to_support: f64,

    /// (nearest_resistance - price) / price * 100
    pub distance_to_resistance: f64,

    /// Tolerance used to group touches
    pub tolerance: f64,
}

/// One Fibonacci retracement level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    /// Retracement ratio (0.0 ..= 1.0)
    pub ratio: f64,
    pub price: f64,
}

/// Retracement levels between the window high and low.
///
/// Level prices are measured down from the high: ratio 0 is the high, ratio 1 the low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    pub levels: Vec<FibonacciLevel>,
}
