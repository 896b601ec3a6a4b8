// In crates/api-client/src/lib.rs

use std::time::Duration;

use app_config::BackendSettings;
use core_types::{BacktestParams, BacktestRequest};

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

impl BacktestClient {
    /// Constructs a new BacktestClient from BackendSettings.
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;
        let base_url = settings.base_url.trim().trim_end_matches('/').to_string();
        Ok(BacktestClient {
            http_client,
            base_url,
        })
    }

    /// Validates user parameters, adjusts them for the backend and runs the backtest.
    pub async fn run(&self, params: &BacktestParams) -> Result<BacktestOutcome> {
        let request = params.to_request()?;
        self.run_backtest(&request).await
    }

    /// Runs a backtest on the remote service.
    ///
    /// This corresponds to the `POST /backtest` endpoint. Nothing is retried:
    /// a transport error or a `success: false` answer is returned as-is.
    pub async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestOutcome> {
        let url = format!("{}/backtest", self.base_url);
        tracing::info!(
            url = %url,
            ticker = %request.ticker,
            years = request.years,
            friday = %request.friday_type,
            "Submitting backtest."
        );

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(Error::RequestFailed)?
            .error_for_status()
            .map_err(Error::RequestFailed)?;

        let text = response.text().await.map_err(Error::RequestFailed)?;
        let envelope: BacktestResponse =
            serde_json::from_str(&text).map_err(Error::DeserializationFailed)?;

        let outcome = envelope.into_outcome().inspect_err(|e| {
            tracing::warn!(message = %e, "Backend rejected the backtest.");
        })?;

        tracing::info!(
            trades = outcome.trades.len(),
            has_stats = outcome.stats.is_some(),
            "Backtest results received."
        );
        Ok(outcome)
    }
}

// Free function to allow api_client::new usage
pub fn new(settings: &BackendSettings) -> Result<BacktestClient> {
    BacktestClient::new(settings)
}
