//! Market Aggregator
//!
//! Breadth, sentiment, distributions and top movers across one batch of
//! pair analyses.

use crate::constants::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::indicators::MacdTrend;
use crate::models::{MarketSummary, Mover, PairAnalysis, RsiDistribution, Sentiment};
use crate::utils::{pct_change, safe_div};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sentiment ladder over the advance/decline ratio and the average RSI
///
/// | Label            | Condition                   |
/// |------------------|-----------------------------|
/// | Strongly Bullish | ratio > 3 and RSI > 60      |
/// | Bullish          | ratio > 1.5 and RSI > 50    |
/// | Strongly Bearish | ratio < 0.33 and RSI < 40   |
/// | Bearish          | ratio < 0.67 and RSI < 50   |
/// | Neutral          | otherwise                   |
pub fn classify_sentiment(advance_decline_ratio: f64, average_rsi: f64) -> Sentiment {
    if advance_decline_ratio > 3.0 && average_rsi > 60.0 {
        Sentiment::StronglyBullish
    } else if advance_decline_ratio > 1.5 && average_rsi > 50.0 {
        Sentiment::Bullish
    } else if advance_decline_ratio < 0.33 && average_rsi < 40.0 {
        Sentiment::StronglyBearish
    } else if advance_decline_ratio < 0.67 && average_rsi < 50.0 {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

fn to_mover(analysis: &PairAnalysis) -> Mover {
    Mover {
        pair: analysis.pair.clone(),
        price: analysis.current_price,
        daily_change: analysis.daily_change,
        volume_usd: analysis.volume_usd,
    }
}

/// Aggregate one batch of analyses
///
/// # Arguments
/// * `analyses` - Successful pair analyses of one run
/// * `top_movers_limit` - Length of the gainers / losers lists
pub fn summarize_market(analyses: &[PairAnalysis], top_movers_limit: usize) -> MarketSummary {
    let total_pairs = analyses.len();

    let advances = analyses.iter().filter(|a| a.daily_change > 0.0).count();
    let declines = analyses.iter().filter(|a| a.daily_change < 0.0).count();
    let unchanged = total_pairs - advances - declines;
    let advance_decline_ratio = advances as f64 / declines.max(1) as f64;

    let rsi_values: Vec<f64> = analyses.iter().filter_map(|a| a.rsi).collect();
    // No RSI anywhere reads as neutral
    let average_rsi = if rsi_values.is_empty() {
        50.0
    } else {
        rsi_values.iter().sum::<f64>() / rsi_values.len() as f64
    };

    let macd_values: Vec<f64> = analyses
        .iter()
        .filter(|a| a.macd.trend != MacdTrend::InsufficientData)
        .map(|a| a.macd.macd)
        .collect();
    let average_macd = safe_div(macd_values.iter().sum::<f64>(), macd_values.len() as f64);

    let mut trend_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for analysis in analyses {
        *trend_distribution
            .entry(analysis.macd.trend.label().to_string())
            .or_insert(0) += 1;
    }
    let share = |trend: MacdTrend| {
        let count = analyses.iter().filter(|a| a.macd.trend == trend).count();
        safe_div(count as f64, total_pairs as f64) * 100.0
    };

    let mut rsi_distribution = RsiDistribution::default();
    for rsi in &rsi_values {
        if *rsi < RSI_OVERSOLD {
            rsi_distribution.oversold += 1;
        } else if *rsi > RSI_OVERBOUGHT {
            rsi_distribution.overbought += 1;
        } else {
            rsi_distribution.neutral += 1;
        }
    }

    let mut gainers: Vec<&PairAnalysis> = analyses.iter().filter(|a| a.daily_change > 0.0).collect();
    gainers.sort_by(|a, b| b.daily_change.partial_cmp(&a.daily_change).unwrap_or(Ordering::Equal));
    let mut losers: Vec<&PairAnalysis> = analyses.iter().filter(|a| a.daily_change < 0.0).collect();
    losers.sort_by(|a, b| a.daily_change.partial_cmp(&b.daily_change).unwrap_or(Ordering::Equal));

    let total_volume_usd: f64 = analyses.iter().map(|a| a.volume_usd).sum();
    let total_volume_ma7: f64 = analyses.iter().map(|a| a.volume_ma7_usd).sum();

    MarketSummary {
        total_pairs,
        advances,
        declines,
        unchanged,
        advance_decline_ratio,
        average_rsi,
        average_macd,
        strong_uptrend_pct: share(MacdTrend::StrongUptrend),
        strong_downtrend_pct: share(MacdTrend::StrongDowntrend),
        sentiment: classify_sentiment(advance_decline_ratio, average_rsi),
        rsi_distribution,
        trend_distribution,
        top_gainers: gainers.into_iter().take(top_movers_limit).map(to_mover).collect(),
        top_losers: losers.into_iter().take(top_movers_limit).map(to_mover).collect(),
        total_volume_usd,
        volume_change: pct_change(total_volume_ma7, total_volume_usd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candle, CandleSeries};
    use crate::services::pair_analyzer::build_pair_analysis;

    /// Analysis with a given daily change; RSI is forced for distribution checks
    fn analysis(pair: &str, daily_change: f64, rsi: Option<f64>) -> PairAnalysis {
        let candles: Vec<Candle> = (0..40)
            .map(|i| Candle::new(pair, i * 86_400, 100.0, 101.0, 99.0, 100.0, 1_000.0))
            .collect();
        let series = CandleSeries::new(pair, candles);
        let mut analysis = build_pair_analysis(&series, &series, 180).unwrap();
        analysis.daily_change = daily_change;
        analysis.rsi = rsi;
        analysis
    }

    #[test]
    fn test_sentiment_ladder() {
        assert_eq!(classify_sentiment(4.0, 65.0), Sentiment::StronglyBullish);
        assert_eq!(classify_sentiment(2.0, 55.0), Sentiment::Bullish);
        assert_eq!(classify_sentiment(0.2, 35.0), Sentiment::StronglyBearish);
        assert_eq!(classify_sentiment(0.5, 45.0), Sentiment::Bearish);
        assert_eq!(classify_sentiment(1.0, 50.0), Sentiment::Neutral);
        // strong ratio alone is not enough
        assert_eq!(classify_sentiment(4.0, 45.0), Sentiment::Neutral);
    }

    #[test]
    fn test_breadth_and_movers() {
        let analyses = vec![
            analysis("A", 5.0, Some(75.0)),
            analysis("B", 2.0, Some(55.0)),
            analysis("C", -3.0, Some(25.0)),
            analysis("D", 0.0, None),
            analysis("E", 8.0, Some(60.0)),
        ];

        let summary = summarize_market(&analyses, 2);
        assert_eq!(summary.total_pairs, 5);
        assert_eq!(summary.advances, 3);
        assert_eq!(summary.declines, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.advance_decline_ratio, 3.0);
        assert!((summary.average_rsi - 53.75).abs() < 1e-9);
        assert_eq!(summary.sentiment, Sentiment::Bullish);

        let gainers: Vec<&str> = summary.top_gainers.iter().map(|m| m.pair.as_str()).collect();
        assert_eq!(gainers, vec!["E", "A"]);
        let losers: Vec<&str> = summary.top_losers.iter().map(|m| m.pair.as_str()).collect();
        assert_eq!(losers, vec!["C"]);

        assert_eq!(summary.rsi_distribution.oversold, 1);
        assert_eq!(summary.rsi_distribution.neutral, 2);
        assert_eq!(summary.rsi_distribution.overbought, 1);
        assert_eq!(summary.trend_distribution.values().sum::<usize>(), 5);
        assert!(summary.volume_change.abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch() {
        let summary = summarize_market(&[], 5);
        assert_eq!(summary.total_pairs, 0);
        assert_eq!(summary.advance_decline_ratio, 0.0);
        assert_eq!(summary.sentiment, Sentiment::Neutral);
        assert!(summary.top_gainers.is_empty());
        assert_eq!(summary.volume_change, 0.0);
    }
}
