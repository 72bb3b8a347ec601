use super::Timeframe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Confidence bucket shared by correlation records and trend events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Significance {
    High,
    Medium,
    Low,
}

impl Significance {
    /// Bucket a two-tailed p-value
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value <= 0.01 {
            Significance::High
        } else if p_value <= 0.05 {
            Significance::Medium
        } else {
            Significance::Low
        }
    }

    /// Sort rank: High first
    pub fn rank(&self) -> u8 {
        match self {
            Significance::High => 0,
            Significance::Medium => 1,
            Significance::Low => 2,
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Significance::High => write!(f, "High"),
            Significance::Medium => write!(f, "Medium"),
            Significance::Low => write!(f, "Low"),
        }
    }
}

/// Correlation between one unordered pair of symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub pair_a: String,
    pub pair_b: String,

    /// Pearson r over the requested timeframe
    pub correlation: f64,

    /// Two-tailed p-value of `correlation`
    pub p_value: f64,

    pub significance: Significance,

    /// Overlapping days used for `correlation`
    pub sample_size: usize,

    /// r per window; windows without enough overlap are absent
    pub timeframe_correlations: BTreeMap<Timeframe, f64>,

    /// Mean annualized volatility of both legs (fraction, not percent)
    pub volatility: f64,

    /// r * (1 - min(volatility, 1))
    pub volatility_adjusted_correlation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_buckets() {
        assert_eq!(Significance::from_p_value(0.001), Significance::High);
        assert_eq!(Significance::from_p_value(0.01), Significance::High);
        assert_eq!(Significance::from_p_value(0.03), Significance::Medium);
        assert_eq!(Significance::from_p_value(0.2), Significance::Low);
        assert!(Significance::High.rank() < Significance::Low.rank());
    }
}
