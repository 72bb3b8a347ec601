mod analysis;
mod analysis_config;
mod candle;
mod candle_series;
mod correlation;
mod market;
mod price_level;
mod timeframe;
mod trend_event;

pub use analysis::{CompositeScores, LiquidityType, PairAnalysis, PumpDumpSignal};
pub use analysis_config::{AnalysisConfig, DEFAULT_WORKER_INTERVAL_SECS};
pub use candle::Candle;
pub use candle_series::CandleSeries;
pub use correlation::{CorrelationRecord, Significance};
pub use market::{AnalysisBatch, MarketSummary, Mover, RsiDistribution, Sentiment};
pub use price_level::{FibonacciLevel, FibonacciLevels, LevelType, PriceLevel, PriceLevels};
pub use timeframe::Timeframe;
pub use trend_event::{TrendChangeEvent, TrendIndicator};
