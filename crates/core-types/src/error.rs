// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid backtest parameters: {0}")]
    InvalidParams(String),
    #[error("Invalid calendar date '{0}'")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
