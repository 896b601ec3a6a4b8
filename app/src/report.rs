// In app/src/report.rs

use analytics::types::{CountShare, Figure, Tone};

use crate::view::{ResultView, StatsSource};

/// Prints the result view as JSON.
pub fn print_json(view: &ResultView) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

/// Prints the summary panel followed by the trade table.
pub fn print_report(ticker: Option<&str>, view: &ResultView) {
    let summary = &view.summary;

    println!("\n--- Strangle Backtest ---");
    if let Some(ticker) = ticker {
        println!("Ticker: {}", ticker);
    }
    println!("-------------------------");
    println!("Total Trades:        {}", summary.total);
    println!("Win Rate:            {}", summary.win_rate);
    println!("Total Profit:        {}", figure(&summary.total_profit));
    println!("Avg Profit / Trade:  {}", figure(&summary.avg_profit_per_trade));

    println!("\n--- Range Analysis ---");
    println!("Closed within range: {}", count_share(&summary.closed_within));
    println!("Exceeded range:      {}", count_share(&summary.exceeded));
    println!("  - Upper only:      {}", summary.exceeded_upper_only);
    println!("  - Lower only:      {}", summary.exceeded_lower_only);
    println!("  - Both sides:      {}", summary.exceeded_both);

    if let Some(early_exits) = &summary.early_exits {
        println!("Early exits:         {}", count_share(early_exits));
    }
    if let Some(days) = &summary.avg_days_held {
        println!("Avg days held:       {}", days);
    }
    if let (Some(win), Some(loss)) = (&summary.avg_win, &summary.avg_loss) {
        println!("Avg win / loss:      {} / {}", win, loss);
    }
    if let Some(rr) = &summary.risk_reward {
        println!("Reward / risk:       {}", rr);
    }
    if view.stats_source == StatsSource::Computed {
        println!("(figures computed from the trade list)");
    }
    if !view.discrepancies.is_empty() {
        println!(
            "Warning: {} figure(s) disagree with the trade list; see the log.",
            view.discrepancies.len()
        );
    }

    if view.trades.is_empty() {
        println!("\nNo trades.");
        return;
    }

    println!("\n--- Trade History ---");
    println!(
        "{:<10}  {:<10}  {:>9}  {:^5}  {:>16}  {:>9}  {:>4}  {:^5}",
        "Open", "Close", "Price Δ", "Range", "Result", "Result %", "Days", "Early"
    );
    for row in &view.trades {
        let price_change = match row.price_change_emphasis {
            Some(_) => format!("{}*", row.price_change),
            None => row.price_change.clone(),
        };
        println!(
            "{:<10}  {:<10}  {:>9}  {:^5}  {:>16}  {:>9}  {:>4}  {:^5}",
            row.open_date,
            row.close_date,
            price_change,
            row.breach_marker,
            row.result.text,
            row.result_pct.text,
            row.days_held,
            row.early_exit,
        );
    }
    println!("\n* closed outside the strike range");
}

fn figure(figure: &Figure) -> String {
    match figure.tone {
        Tone::Positive => figure.text.clone(),
        Tone::Negative => format!("{} (loss)", figure.text),
    }
}

fn count_share(value: &CountShare) -> String {
    format!("{} ({})", value.count, value.share)
}
