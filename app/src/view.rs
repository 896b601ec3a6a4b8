// In app/src/view.rs

use analytics::{StatsAggregator, StatsDiscrepancy, SummaryView, TradeRow};
use api_client::BacktestOutcome;
use core_types::BacktestStats;
use serde::Serialize;

/// Where the figures in the summary panel came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsSource {
    Backend,
    Computed,
}

/// Everything rendered for one backend response. Built fresh per response.
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub stats_source: StatsSource,
    pub summary: SummaryView,
    pub trades: Vec<TradeRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discrepancies: Vec<StatsDiscrepancy>,
}

impl ResultView {
    /// Classifies every trade and settles on the stats block to display.
    ///
    /// The backend's block wins when present and is checked against a
    /// recomputation; otherwise the recomputation is shown.
    pub fn build(outcome: &BacktestOutcome) -> Self {
        let aggregator = StatsAggregator::new();

        let computed = match aggregator.compute(&outcome.trades) {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!(error = %e, "Could not recompute stats from the trade list.");
                None
            }
        };

        let (stats, stats_source, discrepancies) = match (&outcome.stats, computed) {
            (Some(reported), Some(computed)) => {
                let discrepancies = aggregator.reconcile(reported, &computed);
                (reported.clone(), StatsSource::Backend, discrepancies)
            }
            (Some(reported), None) => (reported.clone(), StatsSource::Backend, Vec::new()),
            (None, Some(computed)) => (computed, StatsSource::Computed, Vec::new()),
            (None, None) => (BacktestStats::new(), StatsSource::Computed, Vec::new()),
        };

        ResultView {
            stats_source,
            summary: aggregator.summary(&stats),
            trades: outcome.trades.iter().map(|t| aggregator.trade_row(t)).collect(),
            discrepancies,
        }
    }
}
