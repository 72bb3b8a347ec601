//! Candle store abstraction
//!
//! The analysis core never owns candle storage. It reads through this trait
//! so the backing store (CSV directory, in-memory map, a remote time-series
//! database) can be swapped without touching indicator code.

use crate::error::Result;
use crate::models::Candle;
use crate::utils::filter_duplicate_candles;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read access to daily candles, keyed by pair and timestamp
#[async_trait]
pub trait CandleStore: Send + Sync {
    /// Candles for `pair` with `start <= timestamp <= end`, sorted ascending
    /// and unique per timestamp. An unknown pair yields an empty list.
    async fn get_candles(&self, pair: &str, start: i64, end: i64) -> Result<Vec<Candle>>;

    /// Every pair the store knows about, sorted
    async fn get_all_pairs(&self) -> Result<Vec<String>>;

    /// Backend name for logging
    fn backend_type(&self) -> &'static str;
}

#[async_trait]
impl<T: CandleStore + ?Sized> CandleStore for Arc<T> {
    async fn get_candles(&self, pair: &str, start: i64, end: i64) -> Result<Vec<Candle>> {
        (**self).get_candles(pair, start, end).await
    }

    async fn get_all_pairs(&self) -> Result<Vec<String>> {
        (**self).get_all_pairs().await
    }

    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }
}

/// In-process candle store
#[derive(Debug, Default)]
pub struct InMemoryCandleStore {
    series: RwLock<HashMap<String, Vec<Candle>>>,
}

impl InMemoryCandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole series for `pair` (sorted and de-duplicated on insert)
    pub async fn insert_series(&self, pair: &str, candles: Vec<Candle>) {
        let candles = filter_duplicate_candles(candles);
        self.series.write().await.insert(pair.to_string(), candles);
    }

    /// Insert or replace one candle (same-timestamp live update)
    pub async fn upsert_candle(&self, candle: Candle) {
        let mut series = self.series.write().await;
        let candles = series.entry(candle.pair.clone()).or_default();

        match candles.binary_search_by_key(&candle.timestamp, |c| c.timestamp) {
            Ok(idx) => candles[idx] = candle,
            Err(idx) => candles.insert(idx, candle),
        }
    }

    /// Number of candles held for `pair`
    pub async fn candle_count(&self, pair: &str) -> usize {
        self.series.read().await.get(pair).map_or(0, Vec::len)
    }
}

#[async_trait]
impl CandleStore for InMemoryCandleStore {
    async fn get_candles(&self, pair: &str, start: i64, end: i64) -> Result<Vec<Candle>> {
        let series = self.series.read().await;
        Ok(series
            .get(pair)
            .map(|candles| {
                candles
                    .iter()
                    .filter(|c| c.timestamp >= start && c.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_all_pairs(&self) -> Result<Vec<String>> {
        let mut pairs: Vec<String> = self.series.read().await.keys().cloned().collect();
        pairs.sort();
        Ok(pairs)
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
