// In crates/analytics/src/classifier.rs

use core_types::{BreachCategory, TradeRecord};
use rust_decimal::prelude::*;

use crate::error::{Error, Result};

/// Derives presentation facts from a single trade without touching it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TradeClassifier;

impl TradeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Which side(s) of the range the backend says the trade breached.
    pub fn breach_category(&self, trade: &TradeRecord) -> Result<BreachCategory> {
        let upper = trade.exceeded_upper.ok_or(Error::MissingBreachFlag {
            open_date: trade.open_date,
            flag: "exceeded_upper",
        })?;
        let lower = trade.exceeded_lower.ok_or(Error::MissingBreachFlag {
            open_date: trade.open_date,
            flag: "exceeded_lower",
        })?;
        Ok(BreachCategory::from_flags(upper, lower))
    }

    /// Percentage move of the underlying between open and close.
    pub fn price_change_pct(&self, trade: &TradeRecord) -> Result<f64> {
        if trade.opening_price.is_zero() {
            return Err(Error::ZeroOpeningPrice { open_date: trade.open_date });
        }
        let change = trade
            .final_price
            .checked_sub(trade.opening_price)
            .and_then(|delta| delta.checked_div(trade.opening_price))
            .and_then(|fraction| fraction.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(Error::Overflow("price change"))?;
        Ok(change.to_f64().unwrap_or(0.0))
    }

    /// Whether the closing price sits outside the strikes.
    ///
    /// Computed from raw prices only. It may disagree with the backend's breach
    /// flags, which also cover intraday excursions.
    pub fn is_out_of_range(&self, trade: &TradeRecord) -> bool {
        trade.final_price > trade.upper_strike || trade.final_price < trade.lower_strike
    }

    /// Checks every precondition the derivations rely on.
    pub fn validate(&self, trade: &TradeRecord) -> Result<()> {
        if trade.opening_price.is_zero() {
            return Err(Error::ZeroOpeningPrice { open_date: trade.open_date });
        }
        self.breach_category(trade)?;
        if trade.lower_strike >= trade.upper_strike {
            return Err(Error::InvertedStrikes {
                open_date: trade.open_date,
                lower: trade.lower_strike,
                upper: trade.upper_strike,
            });
        }
        if trade.close_date < trade.open_date {
            return Err(Error::ClosedBeforeOpen {
                open_date: trade.open_date,
                close_date: trade.close_date,
            });
        }
        Ok(())
    }
}
