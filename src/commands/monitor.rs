use super::print_json;
use crate::error::Result;
use crate::services::{AnalysisEngine, CandleStore};

/// A single run only establishes baselines, so events appear from `watch`
/// or when an injected trend store already holds earlier analyses.
pub async fn run<S: CandleStore>(engine: &AnalysisEngine<S>, pairs: &[String]) -> Result<()> {
    let events = engine.monitor_trends(pairs).await?;
    print_json(&events)
}
