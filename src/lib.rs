pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod indicators;
pub mod models;
pub mod services;
pub mod utils;
pub mod worker;

pub use error::{AppError, Result};
pub use models::{AnalysisBatch, AnalysisConfig, Candle, CorrelationRecord, PairAnalysis, TrendChangeEvent};
pub use services::{AnalysisEngine, CandleStore, CsvCandleStore, InMemoryCandleStore, TrendStore};
