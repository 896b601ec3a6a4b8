// In crates/core-types/src/params.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Trading days subtracted from `days_before` when expiring on the first Friday.
const FIRST_FRIDAY_DAY_OFFSET: u32 = 10;

/// Which Friday of the month the options expire on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FridayType {
    #[default]
    Primeira,
    Terceira,
}

impl FromStr for FridayType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "primeira" | "first" | "1" => Ok(FridayType::Primeira),
            "terceira" | "third" | "3" => Ok(FridayType::Terceira),
            other => Err(Error::InvalidParams(format!(
                "unknown expiry Friday '{}', expected 'primeira' or 'terceira'",
                other
            ))),
        }
    }
}

impl fmt::Display for FridayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FridayType::Primeira => f.write_str("primeira"),
            FridayType::Terceira => f.write_str("terceira"),
        }
    }
}

/// Simulation parameters as the user enters them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestParams {
    pub ticker: String,
    #[serde(default = "default_years")]
    pub years: u32,
    /// Trading days before expiry at which the strangle is opened.
    #[serde(default = "default_days_before")]
    pub days_before: u32,
    /// Distance of each strike from the opening price, in percent.
    #[serde(default = "default_range_pct")]
    pub range_pct: f64,
    /// Total premium target for both legs, in percent of the opening price.
    #[serde(default = "default_premium_pct")]
    pub premium_pct: f64,
    #[serde(default = "default_num_contracts")]
    pub num_contracts: u32,
    /// Share of the premium captured that triggers an early exit.
    #[serde(default = "default_early_profit_pct")]
    pub early_profit_pct: u32,
    #[serde(default)]
    pub friday_type: FridayType,
}

fn default_years() -> u32 { 2 }
fn default_days_before() -> u32 { 21 }
fn default_range_pct() -> f64 { 4.95 }
fn default_premium_pct() -> f64 { 1.71 }
fn default_num_contracts() -> u32 { 1000 }
fn default_early_profit_pct() -> u32 { 60 }

impl BacktestParams {
    /// Parameters for `ticker` with every other field at its default.
    pub fn for_ticker(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            years: default_years(),
            days_before: default_days_before(),
            range_pct: default_range_pct(),
            premium_pct: default_premium_pct(),
            num_contracts: default_num_contracts(),
            early_profit_pct: default_early_profit_pct(),
            friday_type: FridayType::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(Error::InvalidParams("ticker is required".into()));
        }
        if !(1..=5).contains(&self.years) {
            return Err(Error::InvalidParams(format!(
                "years must be between 1 and 5, got {}",
                self.years
            )));
        }
        if !(self.range_pct > 0.0) {
            return Err(Error::InvalidParams("range_pct must be positive".into()));
        }
        if !(self.premium_pct > 0.0) {
            return Err(Error::InvalidParams("premium_pct must be positive".into()));
        }
        if self.num_contracts == 0 {
            return Err(Error::InvalidParams("num_contracts must be positive".into()));
        }
        if !(1..=100).contains(&self.early_profit_pct) {
            return Err(Error::InvalidParams(format!(
                "early_profit_pct must be between 1 and 100, got {}",
                self.early_profit_pct
            )));
        }
        Ok(())
    }

    /// Validates the parameters and converts them into the body the backend expects.
    ///
    /// The backend prices each leg separately, so the entered premium is split
    /// in half. First-Friday expiries open `FIRST_FRIDAY_DAY_OFFSET` days later.
    pub fn to_request(&self) -> Result<BacktestRequest> {
        self.validate()?;

        let days_before = match self.friday_type {
            FridayType::Primeira => self.days_before.checked_sub(FIRST_FRIDAY_DAY_OFFSET),
            FridayType::Terceira => Some(self.days_before),
        }
        .filter(|days| *days >= 1)
        .ok_or_else(|| {
            Error::InvalidParams(format!(
                "days_before {} leaves no trading days before a {} Friday expiry",
                self.days_before, self.friday_type
            ))
        })?;

        Ok(BacktestRequest {
            ticker: self.ticker.trim().to_uppercase(),
            years: self.years,
            days_before,
            range_pct: self.range_pct,
            premium_pct: self.premium_pct / 2.0,
            num_contracts: self.num_contracts,
            early_profit_pct: self.early_profit_pct,
            friday_type: self.friday_type,
        })
    }
}

/// JSON body of `POST /backtest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub ticker: String,
    pub years: u32,
    pub days_before: u32,
    pub range_pct: f64,
    pub premium_pct: f64,
    pub num_contracts: u32,
    pub early_profit_pct: u32,
    pub friday_type: FridayType,
}
