// In crates/analytics/src/lib.rs

pub mod classifier;
pub mod engine;
pub mod error;
pub mod format;
pub mod types;

pub use classifier::TradeClassifier;
pub use engine::StatsAggregator;
pub use error::{Error, Result};
pub use types::{StatsDiscrepancy, SummaryView, Tone, TradeRow};
