use super::print_json;
use crate::error::{AppError, Result};
use crate::services::{AnalysisEngine, CandleStore};

pub async fn run<S: CandleStore>(engine: &AnalysisEngine<S>, pairs: &[String], days: usize) -> Result<()> {
    if days < 2 {
        return Err(AppError::InvalidInput(format!("--days must be at least 2, got {}", days)));
    }

    let records = engine.analyze_correlations(pairs, days).await?;
    eprintln!("🔗 {} correlated pairs ({}d window)", records.len(), days);
    print_json(&records)
}
