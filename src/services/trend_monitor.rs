//! Trend Monitor
//!
//! Diffs each pair's analysis against the previous one held in a
//! [`TrendStore`] and emits discrete change events. The first observation of
//! a pair only establishes its baseline.

use crate::constants::{PRICE_EVENT_HIGH_THRESHOLD, PRICE_EVENT_THRESHOLD, RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::models::{PairAnalysis, Significance, TrendChangeEvent, TrendIndicator};
use crate::utils::pct_change;
use std::collections::HashMap;

/// Last analysis per pair
#[derive(Debug, Default, Clone)]
pub struct TrendStore {
    last: HashMap<String, PairAnalysis>,
}

impl TrendStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pair: &str) -> Option<&PairAnalysis> {
        self.last.get(pair)
    }

    /// Replace the stored analysis, returning the previous one
    pub fn set(&mut self, pair: &str, analysis: PairAnalysis) -> Option<PairAnalysis> {
        self.last.insert(pair.to_string(), analysis)
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

fn event(
    current: &PairAnalysis,
    indicator: TrendIndicator,
    previous_value: String,
    new_value: String,
    significance: Significance,
    description: String,
) -> TrendChangeEvent {
    TrendChangeEvent {
        pair: current.pair.clone(),
        indicator,
        previous_value,
        new_value,
        significance,
        description,
        timestamp: current.timestamp,
    }
}

/// Significance of a MACD label change, judged on the new label
fn macd_significance(new_label: &str) -> Significance {
    if new_label.contains("Strong") {
        Significance::High
    } else if new_label.contains("Weak") {
        Significance::Medium
    } else {
        Significance::Low
    }
}

fn rsi_crossings(previous: f64, current: f64) -> Vec<(f64, &'static str)> {
    let mut crossings = Vec::new();
    for (level, zone) in [(RSI_OVERSOLD, "oversold"), (RSI_OVERBOUGHT, "overbought")] {
        if (previous < level) != (current < level) {
            crossings.push((level, zone));
        }
    }
    crossings
}

/// Events between two consecutive analyses of the same pair
pub fn detect_trend_changes(previous: &PairAnalysis, current: &PairAnalysis) -> Vec<TrendChangeEvent> {
    let mut events = Vec::new();

    // MACD trend label
    let (old_trend, new_trend) = (previous.macd.trend, current.macd.trend);
    if old_trend != new_trend {
        events.push(event(
            current,
            TrendIndicator::Macd,
            old_trend.label().to_string(),
            new_trend.label().to_string(),
            macd_significance(new_trend.label()),
            format!("MACD trend changed from {} to {}", old_trend, new_trend),
        ));
    }

    // RSI threshold crossings
    if let (Some(old_rsi), Some(new_rsi)) = (previous.rsi, current.rsi) {
        for (level, zone) in rsi_crossings(old_rsi, new_rsi) {
            let direction = if new_rsi > old_rsi { "above" } else { "below" };
            events.push(event(
                current,
                TrendIndicator::Rsi,
                format!("{:.2}", old_rsi),
                format!("{:.2}", new_rsi),
                Significance::Medium,
                format!("RSI crossed {} {} ({} threshold)", direction, level, zone),
            ));
        }
    }

    // Price move
    let change = pct_change(previous.current_price, current.current_price);
    if change.abs() > PRICE_EVENT_THRESHOLD {
        let significance = if change.abs() > PRICE_EVENT_HIGH_THRESHOLD {
            Significance::High
        } else {
            Significance::Medium
        };
        events.push(event(
            current,
            TrendIndicator::Price,
            format!("{}", previous.current_price),
            format!("{}", current.current_price),
            significance,
            format!("Price moved {:+.2}% since last analysis", change),
        ));
    }

    // EMA50 / EMA200 order
    let old_mas = &previous.moving_averages;
    let new_mas = &current.moving_averages;
    if let (Some(o50), Some(o200), Some(n50), Some(n200)) = (old_mas.ema50, old_mas.ema200, new_mas.ema50, new_mas.ema200) {
        let was_above = o50 > o200;
        let is_above = n50 > n200;
        if was_above != is_above && o50 != o200 && n50 != n200 {
            let (label, state) = if is_above {
                ("Golden Cross", "EMA50 above EMA200")
            } else {
                ("Death Cross", "EMA50 below EMA200")
            };
            events.push(event(
                current,
                TrendIndicator::EmaCross,
                if was_above { "EMA50 above EMA200" } else { "EMA50 below EMA200" }.to_string(),
                state.to_string(),
                Significance::High,
                format!("{}: {}", label, state),
            ));
        }
    }

    events
}

/// Diff every analysis against the store, then store it as the new baseline
pub fn monitor(store: &mut TrendStore, analyses: &[PairAnalysis]) -> Vec<TrendChangeEvent> {
    let mut events = Vec::new();
    for analysis in analyses {
        if let Some(previous) = store.get(&analysis.pair) {
            events.extend(detect_trend_changes(previous, analysis));
        }
        store.set(&analysis.pair, analysis.clone());
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::MacdTrend;
    use crate::models::{Candle, CandleSeries};
    use crate::services::pair_analyzer::build_pair_analysis;

    fn base(pair: &str) -> PairAnalysis {
        let candles: Vec<Candle> = (0..40)
            .map(|i| Candle::new(pair, i * 86_400, 100.0, 101.0, 99.0, 100.0, 1_000.0))
            .collect();
        let series = CandleSeries::new(pair, candles);
        build_pair_analysis(&series, &series, 180).unwrap()
    }

    #[test]
    fn test_first_observation_is_baseline() {
        let mut store = TrendStore::new();
        let events = monitor(&mut store, &[base("BTC-USD")]);
        assert!(events.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_identical_analysis_emits_nothing() {
        let mut store = TrendStore::new();
        let analysis = base("BTC-USD");
        monitor(&mut store, &[analysis.clone()]);
        assert!(monitor(&mut store, &[analysis]).is_empty());
    }

    #[test]
    fn test_macd_label_change() {
        let previous = base("BTC-USD");
        let mut current = previous.clone();
        current.macd.trend = MacdTrend::StrongUptrend;

        let events = detect_trend_changes(&previous, &current);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].indicator, TrendIndicator::Macd);
        assert_eq!(events[0].new_value, "Strong Uptrend");
        assert_eq!(events[0].significance, Significance::High);

        let mut weak = previous.clone();
        weak.macd.trend = MacdTrend::WeakDowntrend;
        assert_eq!(detect_trend_changes(&previous, &weak)[0].significance, Significance::Medium);

        let mut neutral = current.clone();
        neutral.macd.trend = MacdTrend::Neutral;
        assert_eq!(detect_trend_changes(&current, &neutral)[0].significance, Significance::Low);
    }

    #[test]
    fn test_rsi_crossings() {
        let mut previous = base("ETH-USD");
        previous.rsi = Some(65.0);
        let mut current = previous.clone();
        current.rsi = Some(72.0);

        let events = detect_trend_changes(&previous, &current);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].indicator, TrendIndicator::Rsi);
        assert_eq!(events[0].significance, Significance::Medium);

        // 25 -> 75 crosses both thresholds
        previous.rsi = Some(25.0);
        current.rsi = Some(75.0);
        assert_eq!(detect_trend_changes(&previous, &current).len(), 2);

        // no crossing inside the neutral zone
        previous.rsi = Some(40.0);
        current.rsi = Some(60.0);
        assert!(detect_trend_changes(&previous, &current).is_empty());
    }

    #[test]
    fn test_price_moves() {
        let previous = base("SOL-USD");
        let mut current = previous.clone();

        current.current_price = 104.0;
        assert!(detect_trend_changes(&previous, &current).is_empty());

        current.current_price = 107.0;
        assert_eq!(detect_trend_changes(&previous, &current)[0].significance, Significance::Medium);

        current.current_price = 85.0;
        let events = detect_trend_changes(&previous, &current);
        assert_eq!(events[0].indicator, TrendIndicator::Price);
        assert_eq!(events[0].significance, Significance::High);
    }

    #[test]
    fn test_golden_and_death_cross() {
        let mut previous = base("ADA-USD");
        previous.moving_averages.ema50 = Some(99.0);
        previous.moving_averages.ema200 = Some(100.0);
        let mut current = previous.clone();
        current.moving_averages.ema50 = Some(101.0);

        let events = detect_trend_changes(&previous, &current);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].indicator, TrendIndicator::EmaCross);
        assert_eq!(events[0].significance, Significance::High);
        assert!(events[0].description.starts_with("Golden Cross"));

        let events = detect_trend_changes(&current, &previous);
        assert!(events[0].description.starts_with("Death Cross"));
    }
}
