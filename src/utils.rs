pub mod deduplication;
pub mod guards;

pub use deduplication::{filter_duplicate_candles, CandleDeduplicator};
pub use guards::{clamp_unit, finite_or, last_value, pct_change, safe_div, safe_div_or};

