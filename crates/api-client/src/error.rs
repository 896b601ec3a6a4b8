// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(String),
    /// Network failure or an error status from the backend.
    #[error("Failed to connect to the backtest server: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    /// The backend answered `success: false`; the message is shown as-is.
    #[error("{0}")]
    BackendRejected(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] core_types::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
