// In crates/analytics/src/error.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Problems with a trade record that make a derived value meaningless.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Trade opened on {open_date} has a zero opening price")]
    ZeroOpeningPrice { open_date: NaiveDate },
    #[error("Trade opened on {open_date} is missing the `{flag}` breach flag")]
    MissingBreachFlag { open_date: NaiveDate, flag: &'static str },
    #[error("Trade opened on {open_date} has lower strike {lower} not below upper strike {upper}")]
    InvertedStrikes { open_date: NaiveDate, lower: Decimal, upper: Decimal },
    #[error("Trade opened on {open_date} closes earlier, on {close_date}")]
    ClosedBeforeOpen { open_date: NaiveDate, close_date: NaiveDate },
    #[error("Arithmetic overflow while computing the {0}")]
    Overflow(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
