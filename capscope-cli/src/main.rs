//! Capscope CLI — market-cap snapshots and price history for ticker universes.
//!
//! Commands:
//! - `market-cap` — batched sector + market cap fetch with retry
//! - `history` — daily bars for several tickers in one table
//! - `returns` — total return and CAGR per ticker over a date range
//! - `reference` — print the sector and country colour tables

mod progress;

use anyhow::{bail, Context, Result};
use capscope_core::config::AppConfig;
use capscope_core::data::{
    download_batches_market_cap, fetch_history, BatchOptions, FetchProgress, HistoryTable,
    LogProgress, ResultTable, TableRow, ThreadSleeper, Universe, YahooClient,
};
use capscope_core::reference::ReferenceTables;
use capscope_core::returns::{period_returns, PeriodReturn};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use progress::{BarProgress, SuspendingWriter};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "capscope",
    about = "Capscope CLI — market caps, sectors and price history from Yahoo Finance"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable the progress bar; batch progress goes to the log instead.
    #[arg(long, global = true, default_value_t = false)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the ticker list comes from.
#[derive(Args, Debug, Clone, Default)]
struct TickerArgs {
    /// Tickers (e.g., AAPL ^GSPC 000001.SS). Defaults to the built-in world universe.
    tickers: Vec<String>,

    /// Universe TOML file with named ticker groups.
    #[arg(long, conflicts_with = "tickers")]
    universe: Option<PathBuf>,

    /// Restrict to one group of the universe.
    #[arg(long)]
    group: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct RangeArgs {
    /// Start date (YYYY-MM-DD), inclusive. Defaults to January 1 of the end year.
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), exclusive. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch sector and market capitalization in retried batches.
    MarketCap {
        #[command(flatten)]
        tickers: TickerArgs,

        /// Tickers per batch. Overrides fetch.batch_size from the config.
        #[arg(long)]
        batch_size: Option<NonZeroUsize>,

        /// Output file (.csv or .parquet). Defaults to CSV on stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit non-zero when any batch was dropped.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Fetch daily price history for every ticker into one table.
    History {
        #[command(flatten)]
        tickers: TickerArgs,

        #[command(flatten)]
        range: RangeArgs,

        /// Output file (.csv or .parquet). Defaults to CSV on stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Total return and CAGR per ticker between the first and last close.
    Returns {
        #[command(flatten)]
        tickers: TickerArgs,

        #[command(flatten)]
        range: RangeArgs,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the sector and country colour tables.
    Reference {
        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Hidden until a batched run starts drawing it; log lines go through it.
    let bar = ProgressBar::hidden();
    let log_bar = bar.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("capscope=info")),
        )
        .with_target(false)
        .with_writer(move || SuspendingWriter::new(log_bar.clone()))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::MarketCap {
            tickers,
            batch_size,
            output,
            strict,
        } => {
            let progress: Box<dyn FetchProgress> = if cli.no_progress {
                Box::new(LogProgress)
            } else {
                Box::new(BarProgress::new(bar))
            };
            run_market_cap(
                &config,
                &tickers,
                batch_size,
                output.as_deref(),
                strict,
                progress.as_ref(),
            )
        }
        Commands::History {
            tickers,
            range,
            output,
        } => run_history(&config, &tickers, &range, output.as_deref()),
        Commands::Returns {
            tickers,
            range,
            json,
        } => run_returns(&config, &tickers, &range, json),
        Commands::Reference { json } => run_reference(&config, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

fn resolve_tickers(args: &TickerArgs) -> Result<Vec<String>> {
    if !args.tickers.is_empty() {
        if args.group.is_some() {
            bail!("--group requires a universe, not explicit tickers");
        }
        return Ok(args.tickers.clone());
    }

    let universe = match &args.universe {
        Some(path) => Universe::from_file(path)
            .with_context(|| format!("loading universe {}", path.display()))?,
        None => Universe::default_world(),
    };

    let tickers: Vec<String> = match &args.group {
        Some(group) => universe.group_tickers(group)?.to_vec(),
        None => universe
            .all_tickers()
            .into_iter()
            .map(String::from)
            .collect(),
    };

    if tickers.is_empty() {
        bail!("no tickers selected");
    }
    Ok(tickers)
}

fn resolve_range(range: &RangeArgs) -> Result<(NaiveDate, NaiveDate)> {
    let end = range
        .end
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let start = match range.start {
        Some(start) => start,
        None => NaiveDate::from_ymd_opt(end.year(), 1, 1)
            .with_context(|| format!("no January 1 for year {}", end.year()))?,
    };
    if start >= end {
        bail!("start date {start} must be before end date {end}");
    }
    Ok((start, end))
}

fn yahoo_client(config: &AppConfig) -> Result<YahooClient> {
    YahooClient::new(&config.yahoo).context("building Yahoo Finance client")
}

fn run_market_cap(
    config: &AppConfig,
    ticker_args: &TickerArgs,
    batch_size: Option<NonZeroUsize>,
    output: Option<&Path>,
    strict: bool,
    progress: &dyn FetchProgress,
) -> Result<()> {
    let tickers = resolve_tickers(ticker_args)?;
    let ticker_refs: Vec<&str> = tickers.iter().map(|s| s.as_str()).collect();

    let options = BatchOptions {
        batch_size: match batch_size {
            Some(size) => size,
            None => config.fetch.batch_size()?,
        },
        retry: config.fetch.retry_policy()?,
    };
    let references = config.reference_tables()?;
    let client = yahoo_client(config)?;

    let run = download_batches_market_cap(
        &client,
        &ticker_refs,
        &options,
        &ThreadSleeper,
        progress,
    );

    let sectors = run.table.rows().iter().filter_map(|r| r.sector.as_deref());
    if let Err(e) = references.check_sectors(sectors) {
        tracing::warn!("{e}");
    }

    write_table(&run.table, output)?;

    if !run.all_succeeded() {
        for failure in &run.failures {
            eprintln!(
                "Dropped batch {} after {} attempts ({}): {}",
                failure.index + 1,
                failure.attempts,
                failure.last_error,
                failure.tickers.join(",")
            );
        }
        eprintln!(
            "{} of {} tickers missing from the result",
            run.failed_tickers().len(),
            tickers.len()
        );
        if strict {
            std::process::exit(1);
        }
    }

    Ok(())
}

fn fetch_history_table(
    config: &AppConfig,
    ticker_args: &TickerArgs,
    range: &RangeArgs,
) -> Result<HistoryTable> {
    let tickers = resolve_tickers(ticker_args)?;
    let ticker_refs: Vec<&str> = tickers.iter().map(|s| s.as_str()).collect();
    let (start, end) = resolve_range(range)?;
    let client = yahoo_client(config)?;

    fetch_history(&client, &ticker_refs, start, end)
        .with_context(|| format!("fetching history {start}..{end}"))
}

fn run_history(
    config: &AppConfig,
    ticker_args: &TickerArgs,
    range: &RangeArgs,
    output: Option<&Path>,
) -> Result<()> {
    let table = fetch_history_table(config, ticker_args, range)?;
    tracing::info!("fetched {} rows", table.len());
    write_table(&table, output)
}

fn run_returns(
    config: &AppConfig,
    ticker_args: &TickerArgs,
    range: &RangeArgs,
    json: bool,
) -> Result<()> {
    let table = fetch_history_table(config, ticker_args, range)?;
    let returns = period_returns(&table).context("computing returns")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&returns)?);
    } else {
        print_returns(&returns);
    }
    Ok(())
}

fn run_reference(config: &AppConfig, json: bool) -> Result<()> {
    let tables = config.reference_tables()?;

    if json {
        let value = serde_json::json!({
            "sector_colors": tables.sector_colors(),
            "country_labels": tables.country_labels(),
            "country_colors": tables.country_colors(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_reference(&tables);
    }
    Ok(())
}

/// Write a table by output extension, or CSV to stdout when no path is given.
fn write_table<R: TableRow>(table: &ResultTable<R>, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        table.write_csv(std::io::stdout().lock())?;
        return Ok(());
    };

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            table.write_csv(file)?;
        }
        Some("parquet") => table
            .write_parquet(path)
            .with_context(|| format!("writing {}", path.display()))?,
        _ => bail!(
            "unsupported output format for {}: use .csv or .parquet",
            path.display()
        ),
    }
    tracing::info!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn print_returns(returns: &[PeriodReturn]) {
    println!(
        "{:<12} {:<10} {:<10} {:>12} {:>12} {:>10} {:>10}",
        "Ticker", "Start", "End", "First", "Last", "Return %", "CAGR %"
    );
    println!("{}", "-".repeat(82));
    for r in returns {
        let cagr = r
            .cagr
            .map(|c| format!("{c:.3}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:<10} {:<10} {:>12.2} {:>12.2} {:>10.3} {:>10}",
            r.ticker, r.start_date, r.end_date, r.first_close, r.last_close, r.total_return, cagr
        );
    }
}

fn print_reference(tables: &ReferenceTables) {
    println!("--- Sectors ---");
    for (sector, colour) in tables.sector_colors() {
        println!("{sector:<24} {colour}");
    }
    println!();
    println!("--- Countries ---");
    for (ticker, label) in tables.country_labels() {
        let colour = tables.country_color(label).unwrap_or("-");
        println!("{ticker:<12} {label:<24} {colour}");
    }
}
