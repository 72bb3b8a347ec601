use crate::constants::{
    LEVEL_WINDOW_DAYS, LONG_WINDOW_DAYS, MIN_CORRELATION_VOLUME_USD, SHORT_WINDOW_DAYS,
    TOP_MOVERS_LIMIT,
};
use crate::error::{AppError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default interval between worker iterations (5 minutes)
pub const DEFAULT_WORKER_INTERVAL_SECS: u64 = 300;

/// Runtime configuration for the analysis engine
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Root directory of the CSV candle store
    pub market_data_dir: PathBuf,

    /// Window for short-period indicators (days)
    pub short_window_days: i64,

    /// Window for MACD, SMA50/200, Ichimoku and all-time extremes (days)
    pub long_window_days: i64,

    /// Window for the price-level analyzer (days, taken from the long window)
    pub level_window_days: i64,

    /// Minimum average daily USD volume for both legs of a correlation
    pub min_correlation_volume_usd: f64,

    /// Weight correlation samples by sqrt(volume_a * volume_b)
    pub correlation_volume_weighted: bool,

    /// Gainers / losers reported in the market summary
    pub top_movers_limit: usize,

    pub worker_interval: Duration,

    /// Pin the window end (unix seconds); `None` means now
    pub as_of: Option<i64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            market_data_dir: PathBuf::from("market_data"),
            short_window_days: SHORT_WINDOW_DAYS,
            long_window_days: LONG_WINDOW_DAYS,
            level_window_days: LEVEL_WINDOW_DAYS,
            min_correlation_volume_usd: MIN_CORRELATION_VOLUME_USD,
            correlation_volume_weighted: false,
            top_movers_limit: TOP_MOVERS_LIMIT,
            worker_interval: Duration::from_secs(DEFAULT_WORKER_INTERVAL_SECS),
            as_of: None,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.trim().parse::<T>().ok()).unwrap_or(default)
}

impl AnalysisConfig {
    /// Build from environment variables, falling back to defaults for
    /// anything unset or unparsable
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            market_data_dir: lookup("MARKET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.market_data_dir),
            short_window_days: parse_or(lookup("SHORT_WINDOW_DAYS"), defaults.short_window_days),
            long_window_days: parse_or(lookup("LONG_WINDOW_DAYS"), defaults.long_window_days),
            level_window_days: parse_or(lookup("LEVEL_WINDOW_DAYS"), defaults.level_window_days),
            min_correlation_volume_usd: parse_or(
                lookup("MIN_CORRELATION_VOLUME_USD"),
                defaults.min_correlation_volume_usd,
            ),
            correlation_volume_weighted: parse_or(
                lookup("CORRELATION_VOLUME_WEIGHTED"),
                defaults.correlation_volume_weighted,
            ),
            top_movers_limit: parse_or(lookup("TOP_MOVERS_LIMIT"), defaults.top_movers_limit),
            worker_interval: Duration::from_secs(parse_or(
                lookup("WORKER_INTERVAL_SECS"),
                DEFAULT_WORKER_INTERVAL_SECS,
            )),
            as_of: None,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject windows that cannot produce any analysis
    pub fn validate(&self) -> Result<()> {
        if self.short_window_days <= 0 || self.long_window_days <= 0 || self.level_window_days <= 0 {
            return Err(AppError::Config(format!(
                "analysis windows must be positive (short={}, long={}, levels={})",
                self.short_window_days, self.long_window_days, self.level_window_days
            )));
        }
        if self.short_window_days > self.long_window_days {
            return Err(AppError::Config(format!(
                "short window ({}d) exceeds long window ({}d)",
                self.short_window_days, self.long_window_days
            )));
        }
        if self.worker_interval.is_zero() {
            return Err(AppError::Config("WORKER_INTERVAL_SECS must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn with_market_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.market_data_dir = dir.into();
        self
    }

    pub fn with_as_of(mut self, as_of: i64) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = AnalysisConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.short_window_days, 30);
        assert_eq!(config.long_window_days, 250);
        assert_eq!(config.min_correlation_volume_usd, 300_000.0);
        assert_eq!(config.worker_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[
            ("MARKET_DATA_DIR", "/tmp/candles"),
            ("TOP_MOVERS_LIMIT", "10"),
            ("CORRELATION_VOLUME_WEIGHTED", "true"),
            ("LONG_WINDOW_DAYS", "not-a-number"),
        ]))
        .unwrap();

        assert_eq!(config.market_data_dir, PathBuf::from("/tmp/candles"));
        assert_eq!(config.top_movers_limit, 10);
        assert!(config.correlation_volume_weighted);
        assert_eq!(config.long_window_days, 250);
    }

    #[test]
    fn test_invalid_windows_rejected() {
        let result = AnalysisConfig::from_lookup(lookup_from(&[("SHORT_WINDOW_DAYS", "0")]));
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = AnalysisConfig::from_lookup(lookup_from(&[("SHORT_WINDOW_DAYS", "400")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
