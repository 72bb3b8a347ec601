//! Candle Deduplication Utilities
//!
//! Candle series handed to the analysis core must be sorted ascending and
//! unique per timestamp. Stores that read raw files (where a live same-day
//! upsert may have appended a second row for the same timestamp) run their
//! output through here before returning it.

use crate::models::Candle;
use std::collections::HashSet;

/// Timestamp-keyed deduplication for candle series
pub struct CandleDeduplicator;

impl CandleDeduplicator {
    /// Filter duplicates, returning references to unique records.
    ///
    /// Use `keep_last=true` to keep the last occurrence of a timestamp
    /// (the most recent upsert), `false` to keep the first.
    pub fn filter_duplicates(candles: &[Candle], keep_last: bool) -> Vec<&Candle> {
        let mut seen = HashSet::new();
        let mut filtered = Vec::with_capacity(candles.len());

        let iter: Box<dyn Iterator<Item = &Candle>> = if keep_last {
            Box::new(candles.iter().rev())
        } else {
            Box::new(candles.iter())
        };

        for candle in iter {
            if seen.insert(candle.timestamp) {
                filtered.push(candle);
            }
        }

        // Restore original order if we processed in reverse
        if keep_last {
            filtered.reverse();
        }

        filtered
    }

    /// Count duplicate timestamps in a series
    pub fn count_duplicates(candles: &[Candle]) -> usize {
        let mut seen = HashSet::new();
        candles.iter().filter(|c| !seen.insert(c.timestamp)).count()
    }
}

/// Sort ascending by timestamp and drop duplicates, keeping the last occurrence
pub fn filter_duplicate_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    // Stable sort keeps file order among equal timestamps, so "last" stays the latest upsert
    candles.sort_by_key(|c| c.timestamp);
    CandleDeduplicator::filter_duplicates(&candles, true)
        .into_iter()
        .cloned()
        .collect()
}
