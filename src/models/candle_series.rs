use super::Candle;
use std::sync::Arc;

/// Ordered, immutable view of candles for one pair.
///
/// Cloning is cheap: the underlying candles are shared.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    pair: String,
    candles: Arc<[Candle]>,
}

impl CandleSeries {
    /// Wrap candles that are already sorted ascending and unique per timestamp
    pub fn new(pair: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            pair: pair.into(),
            candles: candles.into(),
        }
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Candle before the last one
    pub fn previous(&self) -> Option<&Candle> {
        self.candles.len().checked_sub(2).and_then(|i| self.candles.get(i))
    }

    /// The most recent `n` candles (or all of them when shorter)
    pub fn tail(&self, n: usize) -> CandleSeries {
        let start = self.candles.len().saturating_sub(n);
        CandleSeries::new(self.pair.clone(), self.candles[start..].to_vec())
    }

    pub fn opens(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// Per-candle volume in USD (volume * close)
    pub fn usd_volumes(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::usd_volume).collect()
    }

    /// Close of the candle `days_back` bars before the last one
    pub fn close_days_back(&self, days_back: usize) -> Option<f64> {
        self.candles
            .len()
            .checked_sub(days_back + 1)
            .and_then(|i| self.candles.get(i))
            .map(|c| c.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> CandleSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new("ETH-USD", i as i64 * 86_400, c, c + 1.0, c - 1.0, c, 10.0))
            .collect();
        CandleSeries::new("ETH-USD", candles)
    }

    #[test]
    fn test_accessors() {
        let s = series(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.len(), 4);
        assert_eq!(s.closes(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.last().map(|c| c.close), Some(4.0));
        assert_eq!(s.previous().map(|c| c.close), Some(3.0));
        assert_eq!(s.close_days_back(3), Some(1.0));
        assert_eq!(s.close_days_back(4), None);
    }

    #[test]
    fn test_tail() {
        let s = series(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.tail(2).closes(), vec![3.0, 4.0]);
        assert_eq!(s.tail(10).len(), 4);
        assert!(series(&[]).previous().is_none());
    }
}
