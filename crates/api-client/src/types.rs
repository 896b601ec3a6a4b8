// In crates/api-client/src/types.rs

use core_types::{BacktestStats, TradeRecord};
use reqwest::Client;
use serde::Deserialize;

/// The client for the strangle backtest service.
#[derive(Debug, Clone)]
pub struct BacktestClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// The base URL of the service, without a trailing slash.
    pub base_url: String,
}

/// The envelope every `/backtest` response is wrapped in.
#[derive(Debug, Deserialize, Clone)]
pub struct BacktestResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stats: Option<BacktestStats>,
    #[serde(default)]
    pub trades: Option<Vec<TradeRecord>>,
}

/// The payload of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestOutcome {
    /// `None` when the backend sent trades without a summary block.
    pub stats: Option<BacktestStats>,
    pub trades: Vec<TradeRecord>,
}

impl BacktestResponse {
    /// Splits the envelope into its payload, or the backend's own error text.
    pub fn into_outcome(self) -> crate::Result<BacktestOutcome> {
        if !self.success {
            return Err(crate::Error::BackendRejected(self.message.unwrap_or_default()));
        }
        Ok(BacktestOutcome {
            stats: self.stats,
            trades: self.trades.unwrap_or_default(),
        })
    }
}
