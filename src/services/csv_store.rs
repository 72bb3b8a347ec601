//! CSV-backed candle store
//!
//! Layout: `<market_data_dir>/<PAIR>/daily.csv` with header
//! `pair,timestamp,open,high,low,close,volume`. The timestamp column accepts
//! unix seconds, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (UTC).

use super::candle_store::CandleStore;
use crate::error::{Error, Result};
use crate::models::Candle;
use crate::utils::{filter_duplicate_candles, CandleDeduplicator};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Daily candle file name inside each pair directory
pub const DAILY_FILENAME: &str = "daily.csv";

/// Candle store reading one CSV file per pair
#[derive(Debug, Clone)]
pub struct CsvCandleStore {
    market_data_dir: PathBuf,
}

impl CsvCandleStore {
    pub fn new(market_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            market_data_dir: market_data_dir.into(),
        }
    }

    pub fn market_data_dir(&self) -> &Path {
        &self.market_data_dir
    }

    /// Path of the daily file for `pair`
    pub fn pair_file(&self, pair: &str) -> PathBuf {
        self.market_data_dir.join(pair).join(DAILY_FILENAME)
    }

    /// Read, sort and de-duplicate every candle of `pair`
    pub fn read_pair(&self, pair: &str) -> Result<Vec<Candle>> {
        let path = self.pair_file(pair);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let candles = read_candle_file(&path, pair)?;
        let duplicates = CandleDeduplicator::count_duplicates(&candles);
        if duplicates > 0 {
            debug!(pair = %pair, duplicates, "Dropping duplicate candle timestamps");
        }
        debug!(pair = %pair, records = candles.len(), "Loaded candle file");
        Ok(filter_duplicate_candles(candles))
    }

    /// Pair directory names that contain a daily file
    pub fn list_pairs(&self) -> Result<Vec<String>> {
        if !self.market_data_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.market_data_dir).map_err(|e| {
            Error::Io(format!(
                "Failed to read market data directory {}: {}",
                self.market_data_dir.display(),
                e
            ))
        })?;

        let mut pairs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Io(format!("Failed to read directory entry: {}", e)))?;
            let pair_dir = entry.path();
            if !pair_dir.is_dir() || !pair_dir.join(DAILY_FILENAME).exists() {
                continue;
            }
            if let Some(name) = pair_dir.file_name().and_then(|n| n.to_str()) {
                pairs.push(name.to_string());
            }
        }
        pairs.sort();
        Ok(pairs)
    }
}

/// Parse the timestamp column into unix seconds
pub fn parse_timestamp(value: &str) -> Result<i64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<i64>() {
        return Ok(seconds);
    }
    if value.contains(' ') {
        return NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .map(|dt| dt.and_utc().timestamp())
            .map_err(|e| Error::Parse(format!("Invalid datetime '{}': {}", value, e)));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| Error::Parse(format!("Invalid date '{}': {}", value, e)))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| Error::Parse(format!("Invalid date '{}'", value)))
}

fn parse_field(record: &csv::StringRecord, idx: usize, name: &str, path: &Path) -> Result<f64> {
    record
        .get(idx)
        .ok_or_else(|| Error::Parse(format!("Missing {} in {}", name, path.display())))?
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::Parse(format!("Invalid {} in {}: {}", name, path.display(), e)))
}

fn read_candle_file(path: &Path, pair: &str) -> Result<Vec<Candle>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let mut candles = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::Io(format!("CSV parse error in {}: {}", path.display(), e)))?;
        if record.len() < 7 {
            return Err(Error::Parse(format!(
                "Invalid CSV format in {}: expected 7 fields, got {}",
                path.display(),
                record.len()
            )));
        }

        let timestamp = parse_timestamp(record.get(1).unwrap_or_default())?;
        candles.push(Candle::new(
            pair,
            timestamp,
            parse_field(&record, 2, "open", path)?,
            parse_field(&record, 3, "high", path)?,
            parse_field(&record, 4, "low", path)?,
            parse_field(&record, 5, "close", path)?,
            parse_field(&record, 6, "volume", path)?,
        ));
    }

    Ok(candles)
}

#[async_trait]
impl CandleStore for CsvCandleStore {
    async fn get_candles(&self, pair: &str, start: i64, end: i64) -> Result<Vec<Candle>> {
        let store = self.clone();
        let pair = pair.to_string();
        let candles = tokio::task::spawn_blocking(move || store.read_pair(&pair))
            .await
            .map_err(|e| Error::Other(format!("Candle read task failed: {}", e)))??;

        Ok(candles
            .into_iter()
            .filter(|c| c.timestamp >= start && c.timestamp <= end)
            .collect())
    }

    async fn get_all_pairs(&self) -> Result<Vec<String>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.list_pairs())
            .await
            .map_err(|e| Error::Other(format!("Pair listing task failed: {}", e)))?
    }

    fn backend_type(&self) -> &'static str {
        "csv"
    }
}
