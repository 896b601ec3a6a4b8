// In crates/analytics/src/format.rs

//! Display helpers for the summary panel and the trade table.
//!
//! Money is shown in Brazilian reais (`R$ 1.234,56`, with a no-break space
//! after the symbol as pt-BR locales print it), percentages with two
//! decimals and a dot separator, dates as `dd/mm/yyyy`.

use chrono::NaiveDate;
use rust_decimal::prelude::*;

/// Two-decimal percentage. Non-finite input renders as `0.00%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0.00%".to_string();
    }
    format!("{:.2}%", value)
}

/// Win rate for the summary panel; absent or NaN renders as `0.00%`.
pub fn win_rate_display(win_rate: Option<f64>) -> String {
    match win_rate {
        Some(rate) if !rate.is_nan() => format_percent(rate),
        _ => "0.00%".to_string(),
    }
}

/// `part / total` as a percentage, or `0` for an empty run.
pub fn ratio(part: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(part) / f64::from(total) * 100.0
}

/// Whole-number percentage, e.g. `67%`.
pub fn ratio_display(part: u32, total: u32) -> String {
    format!("{}%", ratio(part, total).round() as i64)
}

/// Formats a currency amount; a missing value is treated as zero.
pub fn currency_display(value: Option<Decimal>) -> String {
    let value = value
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", value.abs());
    let (units, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{}R$\u{a0}{},{}", sign, group_thousands(units), cents)
}

pub fn date_display(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn early_exit_display(early_exit: bool) -> &'static str {
    if early_exit { "✅" } else { "❌" }
}

fn group_thousands(units: &str) -> String {
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
