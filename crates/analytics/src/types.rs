// In crates/analytics/src/types.rs

use core_types::BreachCategory;
use rust_decimal::Decimal;
use serde::Serialize;

/// Sign-based styling for profit and return figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    /// Zero counts as positive.
    pub fn of_amount(value: Decimal) -> Self {
        if value >= Decimal::ZERO { Tone::Positive } else { Tone::Negative }
    }

    pub fn of_percent(value: f64) -> Self {
        if value >= 0.0 { Tone::Positive } else { Tone::Negative }
    }
}

/// A count shown together with its share of the run, e.g. `7 (70%)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountShare {
    pub count: u32,
    pub share: String,
}

/// A formatted amount with its styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub text: String,
    pub tone: Tone,
}

/// Everything the summary panel displays, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub total: u32,
    pub win_rate: String,
    pub total_profit: Figure,
    pub avg_profit_per_trade: Figure,
    pub closed_within: CountShare,
    pub exceeded: CountShare,
    pub exceeded_upper_only: u32,
    pub exceeded_lower_only: u32,
    pub exceeded_both: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub early_exits: Option<CountShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_days_held: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_win: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_loss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_reward: Option<String>,
}

/// One formatted row of the trade table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub open_date: String,
    pub close_date: String,
    pub price_change: String,
    /// Set only when the close landed outside the strikes.
    pub price_change_emphasis: Option<Tone>,
    /// `None` when the backend omitted a breach flag.
    pub breach: Option<BreachCategory>,
    pub breach_marker: &'static str,
    pub result: Figure,
    pub result_pct: Figure,
    pub days_held: u32,
    pub early_exit: &'static str,
}

/// A disagreement between the backend's stats block and a recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsDiscrepancy {
    pub field: &'static str,
    pub reported: String,
    pub computed: String,
}
