// In crates/core-types/src/types.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A single closed (or early-exited) short strangle, as reported by the backend.
///
/// Records are never mutated after they are decoded; every derived value is
/// computed from a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(with = "calendar_date")]
    pub open_date: NaiveDate,
    #[serde(with = "calendar_date")]
    pub close_date: NaiveDate,
    /// Underlying price when the position was opened.
    #[serde(with = "rust_decimal::serde::float")]
    pub opening_price: Decimal,
    /// Underlying price when the position was closed.
    #[serde(with = "rust_decimal::serde::float")]
    pub final_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub lower_strike: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub upper_strike: Decimal,
    /// Set by the backend when the underlying traded above the upper strike.
    /// `None` means the backend omitted the flag, which is a data error.
    #[serde(default)]
    pub exceeded_upper: Option<bool>,
    /// Set by the backend when the underlying traded below the lower strike.
    #[serde(default)]
    pub exceeded_lower: Option<bool>,
    /// Profit or loss of the position in currency units.
    #[serde(with = "rust_decimal::serde::float")]
    pub trade_result: Decimal,
    /// Return of the position as a percentage of the premium received.
    pub trade_result_pct: f64,
    pub days_held: u32,
    #[serde(default)]
    pub early_exit: bool,

    // Extra fields the backend sends along; carried through untouched.
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub total_premium: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub option_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_volatility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_within: Option<bool>,
}

/// Which side(s) of the strangle range a trade breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachCategory {
    None,
    Upper,
    Lower,
    Both,
}

impl BreachCategory {
    /// Collapses the two independent breach flags into a single category.
    ///
    /// `Both` takes priority, so the result is always exactly one variant.
    pub fn from_flags(exceeded_upper: bool, exceeded_lower: bool) -> Self {
        match (exceeded_upper, exceeded_lower) {
            (true, true) => BreachCategory::Both,
            (true, false) => BreachCategory::Upper,
            (false, true) => BreachCategory::Lower,
            (false, false) => BreachCategory::None,
        }
    }

    pub fn is_breach(self) -> bool {
        self != BreachCategory::None
    }

    /// The arrow shown in the trade table's breach column.
    pub fn marker(self) -> &'static str {
        match self {
            BreachCategory::None => "",
            BreachCategory::Upper => "↑",
            BreachCategory::Lower => "↓",
            BreachCategory::Both => "↕",
        }
    }
}

impl fmt::Display for BreachCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BreachCategory::None => "none",
            BreachCategory::Upper => "upper",
            BreachCategory::Lower => "lower",
            BreachCategory::Both => "both",
        };
        f.write_str(label)
    }
}

/// Reward/risk ratio as sent by the backend: a number, or a label such as
/// `"∞"` when there were no losing trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RiskReward {
    Ratio(f64),
    Label(String),
}

impl fmt::Display for RiskReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskReward::Ratio(r) if r.is_infinite() => f.write_str("∞"),
            RiskReward::Ratio(r) => write!(f, "{:.2}", r),
            RiskReward::Label(label) => f.write_str(label),
        }
    }
}

/// Aggregate figures for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BacktestStats {
    #[serde(default)]
    pub total: u32,
    /// Percentage of trades with a non-negative result. May be absent.
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_profit: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub avg_profit_per_trade: Option<Decimal>,

    // Range partition: closed_within + exceeded == total
    #[serde(default)]
    pub closed_within: u32,
    #[serde(default)]
    pub exceeded: u32,

    // Breach partition: the three counts sum to `exceeded`
    #[serde(default)]
    pub exceeded_upper_only: u32,
    #[serde(default)]
    pub exceeded_lower_only: u32,
    #[serde(default)]
    pub exceeded_both_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_exits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_days_held: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_profit_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profitable_trades: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub losing_trades: Option<u32>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub avg_win: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub avg_loss: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reward: Option<RiskReward>,
}

impl BacktestStats {
    /// Creates an empty stats block with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// `closed_within + exceeded`, widened so backend counters cannot overflow.
    pub fn range_sum(&self) -> u64 {
        u64::from(self.closed_within) + u64::from(self.exceeded)
    }

    /// Sum of the three breach-direction counters, widened like `range_sum`.
    pub fn breach_sum(&self) -> u64 {
        u64::from(self.exceeded_upper_only)
            + u64::from(self.exceeded_lower_only)
            + u64::from(self.exceeded_both_count)
    }

    pub fn range_partition_holds(&self) -> bool {
        self.range_sum() == u64::from(self.total)
    }

    pub fn breach_partition_holds(&self) -> bool {
        self.breach_sum() == u64::from(self.exceeded)
    }
}

/// Parses the date part of an ISO-8601 date or datetime string.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate> {
    let date_part = raw.trim().get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| Error::InvalidDate(raw.to_string()))
}

/// Serde adapter: the backend sends either `2024-03-01` or `2024-03-01T00:00:00`.
mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn breach_category_prefers_both() {
        assert_eq!(BreachCategory::from_flags(true, true), BreachCategory::Both);
        assert_eq!(BreachCategory::from_flags(true, false), BreachCategory::Upper);
        assert_eq!(BreachCategory::from_flags(false, true), BreachCategory::Lower);
        assert_eq!(BreachCategory::from_flags(false, false), BreachCategory::None);
        assert!(!BreachCategory::None.is_breach());
        assert!(BreachCategory::Both.is_breach());
    }

    #[test]
    fn parses_date_and_datetime_strings() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_calendar_date("2024-03-01").unwrap(), expected);
        assert_eq!(parse_calendar_date("2024-03-01T00:00:00").unwrap(), expected);
        assert!(matches!(parse_calendar_date("01/03/2024"), Err(Error::InvalidDate(_))));
        assert!(parse_calendar_date("").is_err());
    }

    #[test]
    fn decodes_backend_trade() {
        let trade: TradeRecord = serde_json::from_value(json!({
            "open_date": "2024-02-09T00:00:00",
            "close_date": "2024-03-01T00:00:00",
            "opening_price": 38.5,
            "final_price": 40.12,
            "upper_strike": 40.41,
            "lower_strike": 36.59,
            "premium_pct": 0.855,
            "total_premium": 658.35,
            "option_cost": 12.0,
            "trade_result": 646.35,
            "trade_result_pct": 98.18,
            "exceeded": false,
            "exceeded_upper": false,
            "exceeded_lower": false,
            "exceeded_both": false,
            "close_within": true,
            "early_exit": true,
            "days_held": 15,
            "initial_volatility": 27.3
        }))
        .unwrap();

        assert_eq!(trade.open_date, NaiveDate::from_ymd_opt(2024, 2, 9).unwrap());
        assert_eq!(trade.opening_price, dec!(38.5));
        assert_eq!(trade.trade_result, dec!(646.35));
        assert_eq!(trade.exceeded_upper, Some(false));
        assert_eq!(trade.total_premium, Some(dec!(658.35)));
        assert!(trade.early_exit);
    }

    #[test]
    fn missing_breach_flags_decode_as_none() {
        let trade: TradeRecord = serde_json::from_value(json!({
            "open_date": "2024-02-09",
            "close_date": "2024-03-01",
            "opening_price": 10.0,
            "final_price": 10.0,
            "upper_strike": 11.0,
            "lower_strike": 9.0,
            "trade_result": 1.0,
            "trade_result_pct": 1.0,
            "days_held": 3
        }))
        .unwrap();
        assert_eq!(trade.exceeded_upper, None);
        assert_eq!(trade.exceeded_lower, None);
        assert!(!trade.early_exit);
    }

    #[test]
    fn stats_tolerate_missing_and_null_fields() {
        let stats: BacktestStats = serde_json::from_value(json!({
            "total": 0,
            "win_rate": null,
            "risk_reward": "∞"
        }))
        .unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.win_rate, None);
        assert_eq!(stats.total_profit, None);
        assert_eq!(stats.risk_reward, Some(RiskReward::Label("∞".into())));
        assert!(stats.range_partition_holds());
        assert!(stats.breach_partition_holds());
    }

    #[test]
    fn partition_checks_survive_maximal_counters() {
        let stats: BacktestStats = serde_json::from_value(json!({
            "total": 1,
            "closed_within": u32::MAX,
            "exceeded": 1,
            "exceeded_upper_only": u32::MAX,
            "exceeded_lower_only": u32::MAX,
            "exceeded_both_count": u32::MAX
        }))
        .unwrap();
        assert_eq!(stats.range_sum(), u64::from(u32::MAX) + 1);
        assert_eq!(stats.breach_sum(), 3 * u64::from(u32::MAX));
        assert!(!stats.range_partition_holds());
        assert!(!stats.breach_partition_holds());
    }

    #[test]
    fn risk_reward_display() {
        assert_eq!(RiskReward::Ratio(1.456).to_string(), "1.46");
        assert_eq!(RiskReward::Ratio(f64::INFINITY).to_string(), "∞");
        assert_eq!(RiskReward::Label("∞".into()).to_string(), "∞");
    }
}
