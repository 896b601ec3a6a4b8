// In crates/analytics/src/engine.rs

use core_types::{BacktestStats, BreachCategory, RiskReward, TradeRecord};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::classifier::TradeClassifier;
use crate::error::{Error, Result};
use crate::format::{
    currency_display, date_display, early_exit_display, format_percent, ratio, ratio_display,
    win_rate_display,
};
use crate::types::{CountShare, Figure, StatsDiscrepancy, SummaryView, Tone, TradeRow};

const WIN_RATE_TOLERANCE: f64 = 0.01;
const MONEY_TOLERANCE: Decimal = dec!(0.01);

/// Reduces a trade list into the figures shown in the summary panel.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    classifier: TradeClassifier,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a stats block from the trades alone.
    ///
    /// Range and breach counts come from one breach category per trade, so
    /// both partitions hold by construction. Fails on the first trade with a
    /// missing breach flag, or when the money figures overflow `Decimal`.
    pub fn compute(&self, trades: &[TradeRecord]) -> Result<BacktestStats> {
        let mut stats = BacktestStats::new();
        stats.win_rate = Some(0.0);
        stats.total_profit = Some(Decimal::ZERO);
        stats.avg_profit_per_trade = Some(Decimal::ZERO);
        if trades.is_empty() {
            return Ok(stats);
        }

        // 1. Breach categories
        for trade in trades {
            match self.classifier.breach_category(trade)? {
                BreachCategory::None => stats.closed_within += 1,
                BreachCategory::Upper => stats.exceeded_upper_only += 1,
                BreachCategory::Lower => stats.exceeded_lower_only += 1,
                BreachCategory::Both => stats.exceeded_both_count += 1,
            }
        }
        stats.total = trades.len() as u32;
        stats.exceeded =
            stats.exceeded_upper_only + stats.exceeded_lower_only + stats.exceeded_both_count;

        // 2. Profit
        let total_profit = sum_results(trades.iter())?;
        stats.total_profit = Some(total_profit);
        stats.avg_profit_per_trade = Some(
            total_profit
                .checked_div(Decimal::from(stats.total))
                .ok_or(Error::Overflow("average profit"))?,
        );
        stats.avg_profit_pct =
            Some(trades.iter().map(|t| t.trade_result_pct).sum::<f64>() / trades.len() as f64);

        // 3. Win rate, average win/loss and reward/risk
        let (wins, losses): (Vec<&TradeRecord>, Vec<&TradeRecord>) =
            trades.iter().partition(|t| t.trade_result >= Decimal::ZERO);
        stats.profitable_trades = Some(wins.len() as u32);
        stats.losing_trades = Some(losses.len() as u32);
        stats.win_rate = Some(ratio(wins.len() as u32, stats.total));

        let avg_win = mean_result(&wins)?;
        let avg_loss = mean_result(&losses)?;
        stats.avg_win = Some(avg_win);
        stats.avg_loss = Some(avg_loss);
        stats.risk_reward = Some(if avg_loss.is_zero() {
            RiskReward::Label("∞".to_string())
        } else {
            let reward_risk = avg_win.checked_div(avg_loss).ok_or(Error::Overflow("reward/risk"))?;
            RiskReward::Ratio(reward_risk.abs().to_f64().unwrap_or(0.0))
        });

        // 4. Holding period
        stats.early_exits = Some(trades.iter().filter(|t| t.early_exit).count() as u32);
        stats.avg_days_held = Some(
            trades.iter().map(|t| f64::from(t.days_held)).sum::<f64>() / trades.len() as f64,
        );

        Ok(stats)
    }

    /// Compares the backend's stats block against a recomputation.
    ///
    /// Also reports a backend block whose own counters break the range or
    /// breach partition.
    pub fn reconcile(
        &self,
        reported: &BacktestStats,
        computed: &BacktestStats,
    ) -> Vec<StatsDiscrepancy> {
        let mut discrepancies = Vec::new();

        let counts = [
            ("total", reported.total, computed.total),
            ("closed_within", reported.closed_within, computed.closed_within),
            ("exceeded", reported.exceeded, computed.exceeded),
            ("exceeded_upper_only", reported.exceeded_upper_only, computed.exceeded_upper_only),
            ("exceeded_lower_only", reported.exceeded_lower_only, computed.exceeded_lower_only),
            ("exceeded_both_count", reported.exceeded_both_count, computed.exceeded_both_count),
        ];
        for (field, reported, computed) in counts {
            if reported != computed {
                discrepancies.push(StatsDiscrepancy {
                    field,
                    reported: reported.to_string(),
                    computed: computed.to_string(),
                });
            }
        }

        if let (Some(r), Some(c)) = (reported.win_rate, computed.win_rate) {
            if r.is_nan() || (r - c).abs() > WIN_RATE_TOLERANCE {
                discrepancies.push(StatsDiscrepancy {
                    field: "win_rate",
                    reported: format_percent(r),
                    computed: format_percent(c),
                });
            }
        }

        if let (Some(r), Some(c)) = (reported.total_profit, computed.total_profit) {
            if r.checked_sub(c).is_none_or(|d| d.abs() > MONEY_TOLERANCE) {
                discrepancies.push(StatsDiscrepancy {
                    field: "total_profit",
                    reported: currency_display(Some(r)),
                    computed: currency_display(Some(c)),
                });
            }
        }

        if !reported.range_partition_holds() {
            discrepancies.push(StatsDiscrepancy {
                field: "closed_within + exceeded",
                reported: reported.range_sum().to_string(),
                computed: reported.total.to_string(),
            });
        }
        if !reported.breach_partition_holds() {
            discrepancies.push(StatsDiscrepancy {
                field: "upper_only + lower_only + both",
                reported: reported.breach_sum().to_string(),
                computed: reported.exceeded.to_string(),
            });
        }

        for d in &discrepancies {
            tracing::warn!(
                field = d.field,
                reported = %d.reported,
                computed = %d.computed,
                "Backend stats disagree with the trade list."
            );
        }
        discrepancies
    }

    /// Formats a stats block for the summary panel.
    pub fn summary(&self, stats: &BacktestStats) -> SummaryView {
        let total_profit = stats.total_profit.unwrap_or_default();
        let avg_profit = stats.avg_profit_per_trade.unwrap_or_default();

        SummaryView {
            total: stats.total,
            win_rate: win_rate_display(stats.win_rate),
            total_profit: Figure {
                text: currency_display(stats.total_profit),
                tone: Tone::of_amount(total_profit),
            },
            avg_profit_per_trade: Figure {
                text: currency_display(stats.avg_profit_per_trade),
                tone: Tone::of_amount(avg_profit),
            },
            closed_within: count_share(stats.closed_within, stats.total),
            exceeded: count_share(stats.exceeded, stats.total),
            exceeded_upper_only: stats.exceeded_upper_only,
            exceeded_lower_only: stats.exceeded_lower_only,
            exceeded_both: stats.exceeded_both_count,
            early_exits: stats.early_exits.map(|n| count_share(n, stats.total)),
            avg_days_held: stats.avg_days_held.filter(|d| d.is_finite()).map(|d| format!("{:.1}", d)),
            avg_win: stats.avg_win.map(|v| currency_display(Some(v))),
            avg_loss: stats.avg_loss.map(|v| currency_display(Some(v))),
            risk_reward: stats.risk_reward.as_ref().map(ToString::to_string),
        }
    }

    /// Formats one trade for the table.
    ///
    /// Malformed trades are logged and rendered with neutral values.
    pub fn trade_row(&self, trade: &TradeRecord) -> TradeRow {
        let price_change = match self.classifier.price_change_pct(trade) {
            Ok(pct) => Some(pct),
            Err(e) => {
                tracing::warn!(error = %e, "Rendering a neutral price change.");
                None
            }
        };
        let breach = match self.classifier.breach_category(trade) {
            Ok(category) => Some(category),
            Err(e) => {
                tracing::warn!(error = %e, "Rendering a blank breach marker.");
                None
            }
        };
        let emphasis = match price_change {
            Some(pct) if self.classifier.is_out_of_range(trade) => Some(Tone::of_percent(pct)),
            _ => None,
        };

        TradeRow {
            open_date: date_display(trade.open_date),
            close_date: date_display(trade.close_date),
            price_change: format_percent(price_change.unwrap_or(0.0)),
            price_change_emphasis: emphasis,
            breach,
            breach_marker: breach.map(BreachCategory::marker).unwrap_or(""),
            result: Figure {
                text: currency_display(Some(trade.trade_result)),
                tone: Tone::of_amount(trade.trade_result),
            },
            result_pct: Figure {
                text: format_percent(trade.trade_result_pct),
                tone: Tone::of_percent(trade.trade_result_pct),
            },
            days_held: trade.days_held,
            early_exit: early_exit_display(trade.early_exit),
        }
    }
}

fn count_share(count: u32, total: u32) -> CountShare {
    CountShare {
        count,
        share: ratio_display(count, total),
    }
}

fn sum_results<'a>(mut trades: impl Iterator<Item = &'a TradeRecord>) -> Result<Decimal> {
    trades.try_fold(Decimal::ZERO, |acc, t| {
        acc.checked_add(t.trade_result).ok_or(Error::Overflow("total profit"))
    })
}

fn mean_result(trades: &[&TradeRecord]) -> Result<Decimal> {
    if trades.is_empty() {
        return Ok(Decimal::ZERO);
    }
    sum_results(trades.iter().copied())?
        .checked_div(Decimal::from(trades.len()))
        .ok_or(Error::Overflow("average result"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::trade;

    fn mixed_trades() -> Vec<TradeRecord> {
        vec![
            trade(dec!(100), false, false, dec!(500)),
            trade(dec!(102), false, false, dec!(450)),
            trade(dec!(110), true, false, dec!(-300)),
            trade(dec!(90), false, true, dec!(-200)),
            trade(dec!(97), true, true, dec!(0)),
        ]
    }

    #[test]
    fn empty_run_is_all_zero() {
        let aggregator = StatsAggregator::new();
        let stats = aggregator.compute(&[]).unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.win_rate, Some(0.0));
        assert_eq!(stats.total_profit, Some(Decimal::ZERO));

        let view = aggregator.summary(&stats);
        assert_eq!(view.win_rate, "0.00%");
        assert_eq!(view.closed_within.share, "0%");
        assert_eq!(view.exceeded.share, "0%");
        assert_eq!(view.total_profit.text, "R$\u{a0}0,00");
        assert_eq!(view.total_profit.tone, Tone::Positive);
    }

    #[test]
    fn partitions_hold_for_mixed_trades() {
        let stats = StatsAggregator::new().compute(&mixed_trades()).unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.closed_within, 2);
        assert_eq!(stats.exceeded, 3);
        assert_eq!(stats.exceeded_upper_only, 1);
        assert_eq!(stats.exceeded_lower_only, 1);
        assert_eq!(stats.exceeded_both_count, 1);
        assert!(stats.range_partition_holds());
        assert!(stats.breach_partition_holds());
    }

    #[test]
    fn profit_figures() {
        let stats = StatsAggregator::new().compute(&mixed_trades()).unwrap();
        assert_eq!(stats.total_profit, Some(dec!(450)));
        assert_eq!(stats.avg_profit_per_trade, Some(dec!(90)));
        // A zero result counts as a win.
        assert_eq!(stats.profitable_trades, Some(3));
        assert_eq!(stats.losing_trades, Some(2));
        assert_eq!(stats.win_rate, Some(60.0));
        assert_eq!(stats.avg_loss, Some(dec!(-250)));
        match stats.risk_reward {
            Some(RiskReward::Ratio(r)) => assert!((r - 950.0 / 3.0 / 250.0).abs() < 1e-9),
            other => panic!("unexpected risk reward {:?}", other),
        }
        assert_eq!(stats.avg_days_held, Some(15.0));
    }

    #[test]
    fn no_losses_gives_unbounded_risk_reward() {
        let trades = vec![trade(dec!(100), false, false, dec!(10))];
        let stats = StatsAggregator::new().compute(&trades).unwrap();
        assert_eq!(stats.risk_reward, Some(RiskReward::Label("∞".into())));
        assert_eq!(stats.win_rate, Some(100.0));
    }

    #[test]
    fn compute_fails_on_missing_flag() {
        let mut trades = mixed_trades();
        trades[2].exceeded_upper = None;
        assert!(StatsAggregator::new().compute(&trades).is_err());
    }

    #[test]
    fn reconcile_agreeing_stats() {
        let aggregator = StatsAggregator::new();
        let computed = aggregator.compute(&mixed_trades()).unwrap();
        assert!(aggregator.reconcile(&computed, &computed).is_empty());
    }

    #[test]
    fn reconcile_reports_each_mismatch() {
        let aggregator = StatsAggregator::new();
        let computed = aggregator.compute(&mixed_trades()).unwrap();
        let mut reported = computed.clone();
        reported.closed_within = 1;
        reported.win_rate = Some(40.0);

        let found = aggregator.reconcile(&reported, &computed);
        let fields: Vec<&str> = found.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["closed_within", "win_rate", "closed_within + exceeded"]);
        assert_eq!(found[0].reported, "1");
        assert_eq!(found[0].computed, "2");
    }

    #[test]
    fn reconcile_ignores_absent_win_rate() {
        let aggregator = StatsAggregator::new();
        let computed = aggregator.compute(&mixed_trades()).unwrap();
        let mut reported = computed.clone();
        reported.win_rate = None;
        reported.total_profit = Some(dec!(450.004));
        assert!(aggregator.reconcile(&reported, &computed).is_empty());
    }

    #[test]
    fn reconcile_survives_maximal_backend_counters() {
        let aggregator = StatsAggregator::new();
        let computed = aggregator.compute(&[trade(dec!(100), false, false, dec!(1))]).unwrap();
        let reported: BacktestStats = serde_json::from_str(
            r#"{"total":1,"closed_within":4294967295,"exceeded":1}"#,
        )
        .unwrap();

        let found = aggregator.reconcile(&reported, &computed);
        let range = found.iter().find(|d| d.field == "closed_within + exceeded").unwrap();
        assert_eq!(range.reported, "4294967296");
        assert_eq!(range.computed, "1");
    }

    #[test]
    fn reconcile_flags_unrepresentable_profit_gap() {
        let aggregator = StatsAggregator::new();
        let mut computed = aggregator.compute(&mixed_trades()).unwrap();
        computed.total_profit = Some(Decimal::MIN);
        let mut reported = computed.clone();
        reported.total_profit = Some(Decimal::MAX);

        let fields: Vec<&str> =
            aggregator.reconcile(&reported, &computed).iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["total_profit"]);
    }

    #[test]
    fn compute_reports_profit_overflow() {
        let trades = vec![
            trade(dec!(100), false, false, Decimal::MAX),
            trade(dec!(100), false, false, Decimal::MAX),
        ];
        assert_eq!(
            StatsAggregator::new().compute(&trades),
            Err(Error::Overflow("total profit"))
        );
    }

    #[test]
    fn summary_formats_backend_stats() {
        let stats = BacktestStats {
            total: 3,
            win_rate: Some(66.6667),
            total_profit: Some(dec!(-1500.5)),
            avg_profit_per_trade: None,
            closed_within: 2,
            exceeded: 1,
            exceeded_upper_only: 1,
            early_exits: Some(1),
            ..BacktestStats::default()
        };
        let view = StatsAggregator::new().summary(&stats);
        assert_eq!(view.win_rate, "66.67%");
        assert_eq!(view.total_profit.text, "-R$\u{a0}1.500,50");
        assert_eq!(view.total_profit.tone, Tone::Negative);
        assert_eq!(view.avg_profit_per_trade.text, "R$\u{a0}0,00");
        assert_eq!(view.closed_within, CountShare { count: 2, share: "67%".into() });
        assert_eq!(view.exceeded.share, "33%");
        assert_eq!(view.early_exits.unwrap().share, "33%");
        assert_eq!(view.risk_reward, None);
    }

    #[test]
    fn trade_row_emphasises_out_of_range_close() {
        let aggregator = StatsAggregator::new();
        let row = aggregator.trade_row(&trade(dec!(110), true, false, dec!(-300)));
        assert_eq!(row.price_change, "10.00%");
        assert_eq!(row.price_change_emphasis, Some(Tone::Positive));
        assert_eq!(row.breach, Some(BreachCategory::Upper));
        assert_eq!(row.breach_marker, "↑");
        assert_eq!(row.result.text, "-R$\u{a0}300,00");
        assert_eq!(row.result.tone, Tone::Negative);
        assert_eq!(row.open_date, "09/02/2024");
        assert_eq!(row.early_exit, "❌");

        let inside = aggregator.trade_row(&trade(dec!(98), false, true, dec!(10)));
        assert_eq!(inside.price_change, "-2.00%");
        assert_eq!(inside.price_change_emphasis, None);
        assert_eq!(inside.breach_marker, "↓");
    }

    #[test]
    fn malformed_trade_renders_neutral_values() {
        let mut t = trade(dec!(110), true, false, dec!(5));
        t.opening_price = Decimal::ZERO;
        t.exceeded_upper = None;
        let row = StatsAggregator::new().trade_row(&t);
        assert_eq!(row.price_change, "0.00%");
        assert_eq!(row.price_change_emphasis, None);
        assert_eq!(row.breach, None);
        assert_eq!(row.breach_marker, "");
    }

    #[test]
    fn extreme_price_ratio_renders_neutral_change() {
        let t: TradeRecord = serde_json::from_str(
            r#"{"open_date":"2024-02-09","close_date":"2024-03-01",
                "opening_price":1e-20,"final_price":1e10,
                "lower_strike":95.0,"upper_strike":105.0,
                "exceeded_upper":true,"exceeded_lower":false,
                "trade_result":10.0,"trade_result_pct":1.0,"days_held":15}"#,
        )
        .unwrap();
        let row = StatsAggregator::new().trade_row(&t);
        assert_eq!(row.price_change, "0.00%");
        assert_eq!(row.price_change_emphasis, None);
        assert_eq!(row.breach_marker, "↑");
    }
}
