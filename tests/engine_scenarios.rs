use marketpulse::indicators::MacdTrend;
use marketpulse::models::{AnalysisConfig, Candle, Significance};
use marketpulse::services::{AnalysisEngine, CsvCandleStore, InMemoryCandleStore};
use std::io::Write;

const DAY: i64 = 86_400;

/// Close rising 1% per day, open at the previous close, constant volume
fn uptrend(pair: &str, days: i64) -> Vec<Candle> {
    (0..days)
        .map(|i| {
            let close = 100.0 * 1.01f64.powi(i as i32);
            let open = close / 1.01;
            Candle::new(pair, i * DAY, open, close * 1.005, open * 0.995, close, 10_000.0)
        })
        .collect()
}

fn wave(pair: &str, days: i64, volume: f64) -> Vec<Candle> {
    (0..days)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.1;
            Candle::new(pair, i * DAY, close, close + 1.0, close - 1.0, close, volume)
        })
        .collect()
}

async fn engine(series: Vec<(&str, Vec<Candle>)>, as_of: i64) -> AnalysisEngine<InMemoryCandleStore> {
    let store = InMemoryCandleStore::new();
    for (pair, candles) in series {
        store.insert_series(pair, candles).await;
    }
    AnalysisEngine::new(store, AnalysisConfig::default().with_as_of(as_of))
}

#[tokio::test]
async fn clean_uptrend_scores_bullish() {
    let engine = engine(vec![("XYZ-USD", uptrend("XYZ-USD", 250))], 249 * DAY).await;

    let batch = engine.analyze_pairs(&["XYZ-USD".to_string()]).await.unwrap();
    assert_eq!(batch.pairs.len(), 1);

    let analysis = &batch.pairs[0];
    assert!(matches!(
        analysis.macd.trend,
        MacdTrend::WeakUptrend | MacdTrend::StrongUptrend
    ));
    assert!(analysis.scores.short_term > 0.5);
    assert!((analysis.daily_change - 1.0).abs() < 1e-9);
    assert_eq!(batch.market_summary.advances, 1);
}

#[tokio::test]
async fn identical_series_are_perfectly_correlated() {
    let engine = engine(
        vec![
            ("AAA-USD", wave("AAA-USD", 90, 10_000.0)),
            ("BBB-USD", wave("BBB-USD", 90, 10_000.0)),
        ],
        89 * DAY,
    )
    .await;

    let records = engine.analyze_correlations(&[], 30).await.unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert!((record.correlation - 1.0).abs() < 1e-9);
    assert_eq!(record.significance, Significance::High);
    assert_eq!(record.sample_size, 30);
}

#[tokio::test]
async fn thin_volume_legs_are_not_correlated() {
    let engine = engine(
        vec![
            ("AAA-USD", wave("AAA-USD", 90, 10_000.0)),
            ("DUST-USD", wave("DUST-USD", 90, 100.0)),
        ],
        89 * DAY,
    )
    .await;

    assert!(engine.analyze_correlations(&[], 30).await.unwrap().is_empty());
}

#[tokio::test]
async fn volume_spike_is_flagged_as_pump() {
    let mut candles: Vec<Candle> = (0..60)
        .map(|i| Candle::new("PUMP-USD", i * DAY, 100.0, 100.0, 100.0, 100.0, 1_000.0))
        .collect();
    candles.push(Candle::new("PUMP-USD", 60 * DAY, 100.0, 126.0, 99.0, 125.0, 5_000.0));

    let engine = engine(vec![("PUMP-USD", candles)], 60 * DAY).await;
    let batch = engine.analyze_pairs(&["PUMP-USD".to_string()]).await.unwrap();

    let signal = &batch.pairs[0].pump_dump;
    assert!(signal.is_pumping);
    assert!(signal.pump_score >= 70.0);
}

#[tokio::test]
async fn repeated_monitoring_is_quiet() {
    let engine = engine(
        vec![
            ("XYZ-USD", uptrend("XYZ-USD", 250)),
            ("AAA-USD", wave("AAA-USD", 250, 10_000.0)),
        ],
        249 * DAY,
    )
    .await;
    let pairs = vec!["XYZ-USD".to_string(), "AAA-USD".to_string()];

    assert!(engine.monitor_trends(&pairs).await.unwrap().is_empty());
    assert!(engine.monitor_trends(&pairs).await.unwrap().is_empty());
}

#[tokio::test]
async fn csv_store_feeds_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let pair_dir = dir.path().join("XYZ-USD");
    std::fs::create_dir_all(&pair_dir).unwrap();

    let mut file = std::fs::File::create(pair_dir.join("daily.csv")).unwrap();
    writeln!(file, "pair,timestamp,open,high,low,close,volume").unwrap();
    for c in uptrend("XYZ-USD", 60) {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            c.pair, c.timestamp, c.open, c.high, c.low, c.close, c.volume
        )
        .unwrap();
    }
    drop(file);

    let config = AnalysisConfig::default()
        .with_market_data_dir(dir.path())
        .with_as_of(59 * DAY);
    let engine = AnalysisEngine::new(CsvCandleStore::new(dir.path()), config);

    assert_eq!(engine.all_pairs().await.unwrap(), vec!["XYZ-USD".to_string()]);

    let batch = engine.analyze_pairs(&[]).await.unwrap();
    assert_eq!(batch.pairs.len(), 1);
    assert_eq!(batch.pairs[0].timestamp, 59 * DAY);
}
