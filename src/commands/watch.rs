use crate::services::{AnalysisEngine, CandleStore};
use crate::worker;

pub async fn run<S: CandleStore + 'static>(engine: AnalysisEngine<S>) {
    println!(
        "🚀 Watching {} every {}s",
        engine.config().market_data_dir.display(),
        engine.config().worker_interval.as_secs()
    );
    worker::run_analysis_worker(engine).await;
}
