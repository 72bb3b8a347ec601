use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::error::Result;
use crate::models::AnalysisConfig;
use crate::services::{AnalysisEngine, CsvCandleStore};
use crate::services::csv_store::parse_timestamp;

#[derive(Parser)]
#[command(name = "marketpulse")]
#[command(about = "Technical indicators and market aggregation for daily crypto candles", long_about = None)]
pub struct Cli {
    /// Candle CSV root (overrides MARKET_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Pin the analysis window end (unix seconds or YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_as_of)]
    pub as_of: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze pairs and print the batch with its market summary
    Analyze {
        /// Comma-separated pairs (default: all pairs in the store)
        #[arg(short, long, value_delimiter = ',')]
        pairs: Vec<String>,
    },
    /// Pairwise correlations
    Correlations {
        #[arg(short, long, value_delimiter = ',')]
        pairs: Vec<String>,

        /// Window of the canonical correlation
        #[arg(short, long, default_value_t = 30)]
        days: usize,
    },
    /// Run the trend monitor once and print change events
    Monitor {
        #[arg(short, long, value_delimiter = ',')]
        pairs: Vec<String>,
    },
    /// Run the periodic analysis worker
    Watch,
    /// Show pairs and candle coverage in the store
    Status,
}

fn parse_as_of(value: &str) -> std::result::Result<i64, String> {
    parse_timestamp(value).map_err(|e| e.to_string())
}

fn build_engine(cli: &Cli) -> Result<AnalysisEngine<CsvCandleStore>> {
    let mut config = AnalysisConfig::from_env()?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_market_data_dir(dir.clone());
    }
    if let Some(as_of) = cli.as_of {
        config = config.with_as_of(as_of);
    }

    let store = CsvCandleStore::new(config.market_data_dir.clone());
    Ok(AnalysisEngine::new(store, config))
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let engine = build_engine(&cli)?;

    match cli.command {
        Commands::Analyze { pairs } => commands::analyze::run(&engine, &pairs).await,
        Commands::Correlations { pairs, days } => commands::correlations::run(&engine, &pairs, days).await,
        Commands::Monitor { pairs } => commands::monitor::run(&engine, &pairs).await,
        Commands::Watch => {
            commands::watch::run(engine).await;
            Ok(())
        }
        Commands::Status => commands::status::run(&engine).await,
    }
}
