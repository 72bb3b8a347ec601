use super::print_json;
use crate::error::Result;
use crate::services::{AnalysisEngine, CandleStore};

pub async fn run<S: CandleStore>(engine: &AnalysisEngine<S>, pairs: &[String]) -> Result<()> {
    let batch = engine.analyze_pairs(pairs).await?;

    if batch.pairs.is_empty() {
        eprintln!("⚠️  No pairs could be analyzed in {}", engine.config().market_data_dir.display());
    }

    print_json(&batch)
}
