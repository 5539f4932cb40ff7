use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use configuration::Config;
use core_types::{DateRange, StrategyId};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use market_data::{CandleSource, FetchRequest};
use optimizer::{GridSearchOptimizer, OptimizationOutcome};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use strategies::StrategyParams;
use tokio::runtime::Handle;

/// The main entry point for the Chartist backtesting application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; variables may come from the real environment.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    // Held for the life of the process so the file writer flushes on exit.
    let _log_guard = configuration::logging::init_tracing(&config.logging)
        .context("Failed to initialise logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => handle_run(args, &config).await,
        Commands::Optimize(args) => handle_optimize(args, &config).await,
        Commands::Fetch(args) => handle_fetch(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Backtest and optimize technical-indicator trading strategies on exchange candles.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one strategy and print its performance metrics.
    Run(RunArgs),
    /// Grid-search a strategy's parameters across one or more timeframes.
    Optimize(OptimizeArgs),
    /// Download candles into the local cache.
    Fetch(FetchArgs),
}

#[derive(Parser)]
struct DataArgs {
    /// The symbol to load (e.g., "BTC/USDT" or "BTCUSDT").
    #[arg(long)]
    symbol: String,

    /// The start date (format: YYYY-MM-DD), inclusive.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// The end date (format: YYYY-MM-DD), inclusive.
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Parser)]
struct RunArgs {
    /// One of: bollinger-bands, ma-cross, rsi, macd, ichimoku.
    #[arg(long)]
    strategy: StrategyId,

    /// The timeframe of the candles (e.g., "1h", "4h", "1d").
    #[arg(long)]
    timeframe: String,

    #[command(flatten)]
    data: DataArgs,

    /// Overrides a strategy parameter, e.g. `--param fast_period=9`. Repeatable.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,
}

#[derive(Parser)]
struct OptimizeArgs {
    /// One of: bollinger-bands, ma-cross, rsi, macd, ichimoku.
    #[arg(long)]
    strategy: StrategyId,

    /// Timeframes to search, each with its own series. Repeatable.
    #[arg(long = "timeframe", required = true)]
    timeframes: Vec<String>,

    #[command(flatten)]
    data: DataArgs,

    /// Size of the worker pool (defaults to the configured value, then all cores).
    #[arg(long)]
    workers: Option<usize>,

    /// Print the full outcome as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct FetchArgs {
    /// Timeframes to download. Repeatable.
    #[arg(long = "timeframe", required = true)]
    timeframes: Vec<String>,

    #[command(flatten)]
    data: DataArgs,
}

impl DataArgs {
    fn range(&self) -> anyhow::Result<DateRange> {
        let start = self.start.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|t| t.and_utc());
        let end = self.end.and_then(|d| d.and_hms_opt(23, 59, 59)).map(|t| t.and_utc());
        Ok(DateRange::new(start, end)?)
    }
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

async fn handle_run(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let overrides = parse_overrides(&args.params)?;
    let params = StrategyParams::from_config(args.strategy, &config.strategies)
        .with_overrides(&overrides)
        .context("Invalid strategy parameters")?;

    let source = market_data::source_from_settings(&config.data)?;
    let request = FetchRequest::new(&args.data.symbol, &args.timeframe, args.data.range()?);
    let series = source
        .fetch(&request)
        .await
        .with_context(|| format!("Failed to fetch {}", request))?;

    tracing::info!(strategy = %args.strategy, params = %params, bars = series.len(), "Running backtest");
    let backtester = backtester::Backtester::from_params(params)?.with_data(Arc::new(series));
    let metrics = backtester.get_performance_metrics()?;

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Strategy"), Cell::new(args.strategy)]);
    table.add_row(vec![Cell::new("Parameters"), Cell::new(params)]);
    table.add_row(vec![Cell::new("Total profit"), Cell::new(format!("{:.4}", metrics.total_profit))]);
    table.add_row(vec![Cell::new("Total trades"), Cell::new(metrics.total_trades)]);
    table.add_row(vec![Cell::new("Position entries"), Cell::new(metrics.entries)]);
    table.add_row(vec![Cell::new("Profitable trades"), Cell::new(metrics.profitable_trades)]);
    table.add_row(vec![Cell::new("Win rate"), Cell::new(format!("{:.2}%", metrics.win_rate * 100.0))]);
    table.add_row(vec![Cell::new("Max drawdown"), Cell::new(format!("{:.2}%", metrics.max_drawdown * 100.0))]);
    table.add_row(vec![Cell::new("Count signals"), Cell::new(metrics.count_signals)]);
    println!("{table}");

    Ok(())
}

/// Parses `name=value` pairs. Values are read as JSON where possible, so `9` is a number.
fn parse_overrides(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut map = Map::new();
    for pair in pairs {
        let Some((name, raw)) = pair.split_once('=') else {
            bail!("Expected NAME=VALUE, got '{}'", pair);
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(name.trim().to_string(), value);
    }
    Ok(map)
}

// ==============================================================================
// Optimize Command Logic
// ==============================================================================

async fn handle_optimize(args: OptimizeArgs, config: &Config) -> anyhow::Result<()> {
    let mut optimizer = GridSearchOptimizer::from_config(args.strategy, config);
    if let Some(workers) = args.workers {
        optimizer = optimizer.with_workers(workers);
    }

    let source = market_data::source_from_settings(&config.data)?;
    let symbol = args.data.symbol.clone();
    let range = args.data.range()?;
    let timeframes = args.timeframes.clone();

    // The grid search is CPU-bound; keep it off the async workers and bridge back for fetches.
    let tokio_handle = Handle::current();
    let outcome = tokio::task::spawn_blocking(move || {
        optimizer.run_fetching(&symbol, &timeframes, range, |timeframe| {
            let request = FetchRequest::new(&symbol, timeframe, range);
            tokio_handle.block_on(source.fetch(&request))
        })
    })
    .await
    .context("Optimizer task panicked")??;

    if args.json {
        println!("{}", outcome.to_json()?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &OptimizationOutcome) {
    let mut table = Table::new();
    table.set_header(vec![
        "Timeframe", "Best parameters", "Total profit", "Win rate", "Max drawdown", "Evaluated",
        "Skipped", "Failed",
    ]);
    for tf in &outcome.timeframes {
        let (params, profit, win_rate, drawdown) = match &tf.best {
            Some(best) => (
                best.params.to_string(),
                format!("{:.4}", best.total_profit),
                format!("{:.2}%", best.metrics.win_rate * 100.0),
                format!("{:.2}%", best.metrics.max_drawdown * 100.0),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            Cell::new(&tf.timeframe),
            Cell::new(params),
            Cell::new(profit),
            Cell::new(win_rate),
            Cell::new(drawdown),
            Cell::new(tf.evaluated),
            Cell::new(tf.skipped),
            Cell::new(tf.failed),
        ]);
    }
    println!("Job {} ({})", outcome.job_id, outcome.strategy_id);
    println!("{table}");

    match &outcome.best {
        Some((timeframe, best)) => println!(
            "Best overall: {} on {} with total profit {:.4}",
            best.params, timeframe, best.total_profit
        ),
        None => println!("No valid parameter combination was found."),
    }
}

// ==============================================================================
// Fetch Command Logic
// ==============================================================================

/// Downloads every requested timeframe concurrently.
async fn handle_fetch(args: FetchArgs, config: &Config) -> anyhow::Result<()> {
    let source: Arc<dyn CandleSource> = Arc::from(market_data::source_from_settings(&config.data)?);
    let range = args.data.range()?;

    // Set up the progress bar
    let progress_bar = ProgressBar::new(args.timeframes.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let tasks: Vec<_> = args
        .timeframes
        .iter()
        .map(|timeframe| {
            let source = Arc::clone(&source);
            let request = FetchRequest::new(&args.data.symbol, timeframe, range);
            let pb_clone = progress_bar.clone();

            tokio::spawn(async move {
                pb_clone.set_message(format!("Fetching {}...", request.timeframe));
                let result = source.fetch(&request).await;
                pb_clone.inc(1);
                (request, result)
            })
        })
        .collect();

    // Wait for all concurrent tasks to complete
    let results = join_all(tasks).await;
    progress_bar.finish_with_message("Fetch complete!");

    let mut failures = 0;
    for result in results {
        match result.context("A fetch task panicked")? {
            (request, Ok(series)) => println!(
                "{}: {} bars ({} .. {})",
                request,
                series.len(),
                series.first_timestamp().map(|t| t.to_rfc3339()).unwrap_or_default(),
                series.last_timestamp().map(|t| t.to_rfc3339()).unwrap_or_default(),
            ),
            (request, Err(e)) => {
                tracing::error!(request = %request, error = %e, "Fetch failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} fetches failed", failures, args.timeframes.len());
    }
    Ok(())
}
