use crate::services::{AnalysisEngine, CandleStore};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Summary of one worker iteration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IterationReport {
    pub analyzed: usize,
    pub events: usize,
}

/// One pass: analyze every pair, then feed the results to the trend monitor
pub async fn run_once<S: CandleStore>(engine: &AnalysisEngine<S>) -> crate::error::Result<IterationReport> {
    let (batch, events) = engine.analyze_and_monitor(&[]).await?;

    for event in &events {
        info!(
            pair = %event.pair,
            indicator = %event.indicator,
            significance = %event.significance,
            "{}",
            event.description
        );
    }

    Ok(IterationReport {
        analyzed: batch.pairs.len(),
        events: events.len(),
    })
}

#[instrument(skip(engine))]
pub async fn run<S: CandleStore>(engine: AnalysisEngine<S>) {
    let interval = engine.config().worker_interval;
    info!(
        interval_secs = interval.as_secs(),
        backend = engine.store().backend_type(),
        "Starting analysis worker"
    );

    let mut iteration_count = 0u64;

    loop {
        iteration_count += 1;
        let loop_start = Instant::now();

        info!(iteration = iteration_count, "Analysis worker: Starting run");

        match run_once(&engine).await {
            Ok(report) => {
                if report.analyzed == 0 {
                    warn!(iteration = iteration_count, "Analysis worker: No pairs analyzed");
                }
                info!(
                    iteration = iteration_count,
                    analyzed = report.analyzed,
                    events = report.events,
                    loop_duration_secs = loop_start.elapsed().as_secs_f64(),
                    next_run_secs = interval.as_secs(),
                    "Analysis worker: Iteration completed"
                );
            }
            Err(e) => {
                // Continue to next iteration even if the run fails
                error!(iteration = iteration_count, error = %e, "Analysis worker: Run failed");
            }
        }

        sleep(interval.max(Duration::from_secs(1))).await;
    }
}
