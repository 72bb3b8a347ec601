//! Analysis engine
//!
//! Composes the candle store, the pair analyzer, the market aggregator, the
//! correlation engine and the trend monitor behind the three batch entry
//! points consumed by the CLI and the worker.
//!
//! Failures are contained per pair: a batch of N pairs returns the M <= N
//! pairs that could be analyzed, and every skip is logged at `warn`.

use super::candle_store::CandleStore;
use super::correlation::{correlate_all, CorrelationSettings};
use super::market_aggregator::summarize_market;
use super::pair_analyzer::{analyze_pair, fetch_window, window_end};
use super::trend_monitor::{monitor, TrendStore};
use crate::error::Result;
use crate::models::{
    AnalysisBatch, AnalysisConfig, CorrelationRecord, PairAnalysis, Timeframe, TrendChangeEvent,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct AnalysisEngine<S: CandleStore> {
    store: S,
    config: AnalysisConfig,
    trends: Mutex<TrendStore>,
}

impl<S: CandleStore> AnalysisEngine<S> {
    /// Engine with a fresh, empty trend store
    pub fn new(store: S, config: AnalysisConfig) -> Self {
        Self::with_trend_store(store, config, TrendStore::new())
    }

    /// Engine with an injected trend store (baselines carried over)
    pub fn with_trend_store(store: S, config: AnalysisConfig, trends: TrendStore) -> Self {
        Self {
            store,
            config,
            trends: Mutex::new(trends),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every pair known to the store
    pub async fn all_pairs(&self) -> Result<Vec<String>> {
        self.store.get_all_pairs().await
    }

    /// The requested pairs, or every pair in the store when none are given
    async fn resolve_pairs(&self, pairs: &[String]) -> Result<Vec<String>> {
        if pairs.is_empty() {
            self.all_pairs().await
        } else {
            Ok(pairs.to_vec())
        }
    }

    async fn analyze_each(&self, pairs: &[String]) -> Vec<PairAnalysis> {
        let end = window_end(&self.config);
        let mut analyses = Vec::with_capacity(pairs.len());

        for pair in pairs {
            match analyze_pair(&self.store, pair, &self.config, end).await {
                Ok(analysis) => analyses.push(analysis),
                Err(e) if e.is_missing_data() => {
                    warn!(pair = %pair, error = %e, "Skipping pair");
                }
                Err(e) => {
                    warn!(pair = %pair, error = %e, "Pair analysis failed, skipping");
                }
            }
        }

        analyses
    }

    /// Analyze `pairs` (all pairs when empty) and summarize the market
    pub async fn analyze_pairs(&self, pairs: &[String]) -> Result<AnalysisBatch> {
        let pairs = self.resolve_pairs(pairs).await?;
        let analyses = self.analyze_each(&pairs).await;
        let market_summary = summarize_market(&analyses, self.config.top_movers_limit);

        info!(
            requested = pairs.len(),
            analyzed = analyses.len(),
            sentiment = %market_summary.sentiment,
            "Analysis batch complete"
        );

        Ok(AnalysisBatch {
            pairs: analyses,
            market_summary,
        })
    }

    /// Pairwise correlations of `pairs` (all pairs when empty)
    ///
    /// # Arguments
    /// * `timeframe_days` - Window of the canonical `correlation` (30 by default)
    pub async fn analyze_correlations(&self, pairs: &[String], timeframe_days: usize) -> Result<Vec<CorrelationRecord>> {
        let pairs = self.resolve_pairs(pairs).await?;
        let end = window_end(&self.config);
        let days = timeframe_days.max(Timeframe::Quarter.days()) as i64;

        let mut series = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            match fetch_window(&self.store, pair, end, days).await {
                Ok(s) if !s.is_empty() => series.push(s),
                Ok(_) => debug!(pair = %pair, "No candles in correlation window"),
                Err(e) => warn!(pair = %pair, error = %e, "Skipping pair in correlations"),
            }
        }

        let settings = CorrelationSettings {
            timeframe_days,
            min_volume_usd: self.config.min_correlation_volume_usd,
            volume_weighted: self.config.correlation_volume_weighted,
        };
        let records = correlate_all(&series, &settings);

        info!(
            pairs = series.len(),
            records = records.len(),
            timeframe_days,
            "Correlation run complete"
        );
        Ok(records)
    }

    /// Analyze `pairs` and diff them against the previous run
    pub async fn monitor_trends(&self, pairs: &[String]) -> Result<Vec<TrendChangeEvent>> {
        let (_, events) = self.analyze_and_monitor(pairs).await?;
        Ok(events)
    }

    /// Analysis batch plus trend events in one run.
    ///
    /// The trend store stays locked from the first candle read to the final
    /// baseline write, so overlapping runs complete one after the other.
    pub async fn analyze_and_monitor(&self, pairs: &[String]) -> Result<(AnalysisBatch, Vec<TrendChangeEvent>)> {
        let mut trends = self.trends.lock().await;

        let pairs = self.resolve_pairs(pairs).await?;
        let analyses = self.analyze_each(&pairs).await;
        let events = monitor(&mut trends, &analyses);
        if !events.is_empty() {
            info!(events = events.len(), tracked = trends.len(), "Trend changes detected");
        }

        let market_summary = summarize_market(&analyses, self.config.top_movers_limit);
        let batch = AnalysisBatch {
            pairs: analyses,
            market_summary,
        };
        Ok((batch, events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use crate::services::candle_store::InMemoryCandleStore;

    const DAY: i64 = 86_400;

    fn trending(pair: &str, days: i64, start: f64, step: f64, volume: f64) -> Vec<Candle> {
        (0..days)
            .map(|i| {
                let close = start * (1.0 + step).powi(i as i32);
                Candle::new(pair, i * DAY, close, close * 1.01, close * 0.99, close, volume)
            })
            .collect()
    }

    async fn engine_with(pairs: &[(&str, Vec<Candle>)], as_of: i64) -> AnalysisEngine<InMemoryCandleStore> {
        let store = InMemoryCandleStore::new();
        for (pair, candles) in pairs {
            store.insert_series(pair, candles.clone()).await;
        }
        AnalysisEngine::new(store, AnalysisConfig::default().with_as_of(as_of))
    }

    #[tokio::test]
    async fn test_analyze_pairs_skips_missing() {
        let engine = engine_with(&[("BTC-USD", trending("BTC-USD", 60, 100.0, 0.01, 10_000.0))], 59 * DAY).await;

        let batch = engine
            .analyze_pairs(&["BTC-USD".to_string(), "NOPE-USD".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.pairs.len(), 1);
        assert_eq!(batch.pairs[0].pair, "BTC-USD");
        assert_eq!(batch.market_summary.total_pairs, 1);
    }

    #[tokio::test]
    async fn test_empty_request_means_all_pairs() {
        let engine = engine_with(
            &[
                ("BTC-USD", trending("BTC-USD", 60, 100.0, 0.01, 10_000.0)),
                ("ETH-USD", trending("ETH-USD", 60, 50.0, -0.01, 10_000.0)),
            ],
            59 * DAY,
        )
        .await;

        let batch = engine.analyze_pairs(&[]).await.unwrap();
        assert_eq!(batch.pairs.len(), 2);
        assert_eq!(batch.market_summary.advances, 1);
        assert_eq!(batch.market_summary.declines, 1);
    }

    #[tokio::test]
    async fn test_correlations_between_pairs() {
        let engine = engine_with(
            &[
                ("BTC-USD", trending("BTC-USD", 90, 100.0, 0.01, 10_000.0)),
                ("ETH-USD", trending("ETH-USD", 90, 50.0, 0.01, 20_000.0)),
            ],
            89 * DAY,
        )
        .await;

        let records = engine.analyze_correlations(&[], 30).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].correlation - 1.0).abs() < 1e-9);
        assert_eq!(records[0].sample_size, 30);
    }

    #[tokio::test]
    async fn test_monitor_trends_baseline_then_quiet() {
        let engine = engine_with(&[("BTC-USD", trending("BTC-USD", 60, 100.0, 0.01, 10_000.0))], 59 * DAY).await;
        let pairs = vec!["BTC-USD".to_string()];

        assert!(engine.monitor_trends(&pairs).await.unwrap().is_empty());
        assert!(engine.monitor_trends(&pairs).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_monitor_runs_do_not_interleave() {
        let engine = engine_with(&[("BTC-USD", trending("BTC-USD", 60, 100.0, 0.0, 10_000.0))], 60 * DAY).await;
        let pairs = vec!["BTC-USD".to_string()];
        engine.monitor_trends(&pairs).await.unwrap();

        let (first, second) = tokio::join!(engine.monitor_trends(&pairs), async {
            engine
                .store()
                .upsert_candle(Candle::new("BTC-USD", 59 * DAY, 100.0, 121.0, 99.0, 120.0, 10_000.0))
                .await;
            engine.monitor_trends(&pairs).await
        });

        let price_events: Vec<TrendChangeEvent> = first
            .unwrap()
            .into_iter()
            .chain(second.unwrap())
            .filter(|e| e.indicator == crate::models::TrendIndicator::Price)
            .collect();

        // exactly one move, 100 -> 120, never the reverse
        assert_eq!(price_events.len(), 1);
        assert_eq!(price_events[0].previous_value, "100");
        assert_eq!(price_events[0].new_value, "120");

        // the stored baseline is the newest snapshot
        assert!(engine.monitor_trends(&pairs).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_monitor_trends_reports_price_move() {
        let engine = engine_with(&[("BTC-USD", trending("BTC-USD", 60, 100.0, 0.0, 10_000.0))], 60 * DAY).await;
        let pairs = vec!["BTC-USD".to_string()];
        engine.monitor_trends(&pairs).await.unwrap();

        // same-day live update: +20%
        engine
            .store()
            .upsert_candle(Candle::new("BTC-USD", 59 * DAY, 100.0, 121.0, 99.0, 120.0, 10_000.0))
            .await;

        let events = engine.monitor_trends(&pairs).await.unwrap();
        assert!(events
            .iter()
            .any(|e| e.indicator == crate::models::TrendIndicator::Price && e.significance == crate::models::Significance::High));
    }
}
