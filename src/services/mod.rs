pub mod candle_store;
pub mod csv_store;
pub mod price_levels;
pub mod scorer;
pub mod pump_detector;
pub mod pair_analyzer;
pub mod market_aggregator;
pub mod correlation;
pub mod trend_monitor;
pub mod engine;

pub use candle_store::{CandleStore, InMemoryCandleStore};
pub use csv_store::CsvCandleStore;
pub use price_levels::{analyze_price_levels, calculate_fibonacci_levels};
pub use scorer::{calculate_scores, ScoreInputs};
pub use pump_detector::detect_pump_dump;
pub use pair_analyzer::{analyze_pair, build_pair_analysis};
pub use market_aggregator::summarize_market;
pub use correlation::{correlate_all, correlate_pair, CorrelationSettings};
pub use trend_monitor::{detect_trend_changes, TrendStore};
pub use engine::AnalysisEngine;
