// In app/src/main.rs

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Result;
use api_client::{BacktestOutcome, BacktestResponse};
use clap::{Args, Parser, Subcommand};
use core_types::{BacktestParams, FridayType};
use tracing_subscriber::prelude::*;

mod report;
mod view;

use crate::view::ResultView;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Client for the strangle options backtest service.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submits a backtest to the backend and renders the results.
    Backtest {
        #[command(flatten)]
        args: ParamArgs,

        /// Prints the results as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Renders a saved `/backtest` response without contacting the backend.
    Render {
        /// Path to a JSON file holding a backend response.
        file: PathBuf,

        /// Prints the results as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ParamArgs {
    /// Loads parameters from a TOML file; flags given on the command line win.
    #[arg(long)]
    params: Option<PathBuf>,

    /// The ticker to backtest (e.g., "PETR4", "VALE3").
    #[arg(short, long)]
    ticker: Option<String>,

    /// Length of the historical period in years (1-5).
    #[arg(short, long)]
    years: Option<u32>,

    /// Trading days before expiry at which the strangle is opened.
    #[arg(long)]
    days_before: Option<u32>,

    /// Distance of each strike from the opening price, in percent.
    #[arg(long)]
    range_pct: Option<f64>,

    /// Premium received for both legs, in percent of the opening price.
    #[arg(long)]
    premium_pct: Option<f64>,

    /// Number of option contracts per leg.
    #[arg(long)]
    num_contracts: Option<u32>,

    /// Share of the premium that triggers an early exit, in percent.
    #[arg(long)]
    early_profit_pct: Option<u32>,

    /// Expiry Friday: "primeira" (first) or "terceira" (third).
    #[arg(long, value_parser = FridayType::from_str)]
    friday: Option<FridayType>,
}

impl ParamArgs {
    /// Merges the parameter file (if any) with the command-line overrides.
    fn resolve(self) -> Result<BacktestParams> {
        let mut params = match &self.params {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading backtest parameters from file.");
                app_config::load_params_file(path)?
            }
            None => match &self.ticker {
                Some(ticker) => BacktestParams::for_ticker(ticker.clone()),
                None => anyhow::bail!("A ticker is required: pass --ticker or --params <file>."),
            },
        };

        if let Some(ticker) = self.ticker {
            params.ticker = ticker;
        }
        if let Some(years) = self.years {
            params.years = years;
        }
        if let Some(days) = self.days_before {
            params.days_before = days;
        }
        if let Some(range) = self.range_pct {
            params.range_pct = range;
        }
        if let Some(premium) = self.premium_pct {
            params.premium_pct = premium;
        }
        if let Some(contracts) = self.num_contracts {
            params.num_contracts = contracts;
        }
        if let Some(pct) = self.early_profit_pct {
            params.early_profit_pct = pct;
        }
        if let Some(friday) = self.friday {
            params.friday_type = friday;
        }
        Ok(params)
    }
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let settings = match app_config::load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // --- Tracing Setup ---
    // `load_settings` has already rejected unknown level names.
    let level = tracing::Level::from_str(settings.app.log_level.trim()).unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("reqwest", tracing::Level::WARN)
                .with_target("hyper", tracing::Level::WARN)
                .with_default(level),
        );
    tracing_subscriber::registry().with(fmt_layer).init();

    // Parse command-line arguments.
    let cli = Cli::parse();

    tracing::info!(environment = %settings.app.environment, "Starting strangle client");

    // Match on the parsed command and call the appropriate handler.
    let result = match cli.command {
        Commands::Backtest { args, json } => handle_backtest(&settings, args, json).await,
        Commands::Render { file, json } => handle_render(file, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Backend messages are shown exactly as received.
            tracing::error!(error = %e, "Backtest failed.");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// --- "Backtest" Subcommand Logic ---

/// Handles the logic for the `backtest` subcommand.
async fn handle_backtest(
    settings: &app_config::Settings,
    args: ParamArgs,
    json: bool,
) -> Result<()> {
    let params = args.resolve()?;
    let client = api_client::new(&settings.backend)?;

    let outcome = client.run(&params).await?;
    let view = ResultView::build(&outcome);

    if json {
        report::print_json(&view)?;
    } else {
        report::print_report(Some(&params.ticker), &view);
    }
    Ok(())
}

// --- "Render" Subcommand Logic ---

/// Handles the logic for the `render` subcommand.
fn handle_render(file: PathBuf, json: bool) -> Result<()> {
    tracing::info!(path = %file.display(), "Rendering saved backtest response.");
    let content = std::fs::read_to_string(&file)?;
    let response: BacktestResponse = serde_json::from_str(&content)?;
    let outcome: BacktestOutcome = response.into_outcome()?;
    let view = ResultView::build(&outcome);

    if json {
        report::print_json(&view)?;
    } else {
        report::print_report(None, &view);
    }
    Ok(())
}
