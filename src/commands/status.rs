use crate::error::Result;
use crate::models::Candle;
use crate::services::{AnalysisEngine, CandleStore};

pub async fn run<S: CandleStore>(engine: &AnalysisEngine<S>) -> Result<()> {
    println!("📊 Market Data Status ({} store)\n", engine.store().backend_type());

    let pairs = engine.all_pairs().await?;
    if pairs.is_empty() {
        println!(
            "⚠️  No pairs found in {}",
            engine.config().market_data_dir.display()
        );
        return Ok(());
    }

    println!("📈 Total Pairs: {}\n", pairs.len());

    for pair in &pairs {
        let candles = engine.store().get_candles(pair, i64::MIN, i64::MAX).await?;
        match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => {
                println!(
                    "🔹 {:<12} {:>6} candles  ({} → {})  last close {}",
                    pair,
                    candles.len(),
                    format_date(first),
                    format_date(last),
                    format_price(last.close)
                );
            }
            _ => println!("🔹 {:<12} no candles", pair),
        }
    }

    Ok(())
}

fn format_date(candle: &Candle) -> String {
    candle
        .time()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| candle.timestamp.to_string())
}

/// Sub-dollar prices keep more precision
fn format_price(price: f64) -> String {
    if price.abs() >= 1.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.8}", price)
    }
}
