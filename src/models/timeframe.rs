use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookback window used by the correlation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    /// 7 days
    #[serde(rename = "7d")]
    Week,
    /// 30 days
    #[serde(rename = "30d")]
    Month,
    /// 90 days
    #[serde(rename = "90d")]
    Quarter,
}

impl Timeframe {
    /// Window length in days
    pub fn days(&self) -> usize {
        match self {
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Quarter => 90,
        }
    }

    /// Short label ("7d", "30d", "90d")
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Week => "7d",
            Timeframe::Month => "30d",
            Timeframe::Quarter => "90d",
        }
    }

    /// Exact match on the window length
    pub fn from_days(days: usize) -> Option<Self> {
        Self::all().into_iter().find(|tf| tf.days() == days)
    }

    /// All correlation windows, shortest first
    pub fn all() -> Vec<Timeframe> {
        vec![Timeframe::Week, Timeframe::Month, Timeframe::Quarter]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
