//! rusty-fxchart CLI - exchange-rate charts, conversion and watchlist
//!
//! ## Example Usage
//!
//! ```bash
//! # Chart USD/EUR over three months with both overlays
//! rusty-fxchart chart USD/EUR --timeframe 3M --indicator both
//!
//! # Export the chart data
//! rusty-fxchart chart GBP/JPY --csv gbpjpy.csv
//!
//! # Convert an amount
//! rusty-fxchart convert 250 USD THB
//!
//! # Watchlist
//! rusty-fxchart watch add EUR/GBP
//! rusty-fxchart watch refresh --follow
//!
//! # Offline, from a CSV of date,from,to,rate rows
//! rusty-fxchart --offline rates.csv chart USD/EUR
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rusty_fxchart::analytics::Trend;
use rusty_fxchart::chart::ChartView;
use rusty_fxchart::config::{Config, CONFIG_DIR_NAME};
use rusty_fxchart::controller::{ChartController, RefreshOutcome, Selection};
use rusty_fxchart::convert::Converter;
use rusty_fxchart::currency::{currency_info, supported_codes, CurrencyPair};
use rusty_fxchart::data::{FrankfurterSource, InMemoryRateSource, RateProvider};
use rusty_fxchart::watchlist::{BlobStore, FileBlobStore, MemoryBlobStore, Watchlist};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

/// rusty-fxchart: exchange-rate charts in the terminal
#[derive(Parser)]
#[command(name = "rusty-fxchart")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Exchange-rate charts with SMA/EMA overlays", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read rates from a CSV file instead of the network
    #[arg(long, global = true, value_name = "CSV")]
    offline: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a rate chart summary for a pair
    Chart {
        /// Pair as FROM/TO (default from config)
        #[arg(value_name = "PAIR")]
        pair: Option<String>,

        /// Timeframe: 1D, 1W, 1M, 3M or 1Y
        #[arg(short = 't', long)]
        timeframe: Option<String>,

        /// Overlay: none, sma, ema or both
        #[arg(short = 'i', long)]
        indicator: Option<String>,

        /// Print the chart payload as JSON
        #[arg(long)]
        json: bool,

        /// Write the chart data to a CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Convert an amount at the latest rate
    Convert {
        amount: f64,
        from: String,
        to: String,
    },

    /// List supported currencies
    Currencies,

    /// Manage the watchlist
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
}

#[derive(Subcommand)]
enum WatchAction {
    /// Show watched pairs
    List,
    /// Add a pair (FROM/TO)
    Add { pair: String },
    /// Remove the pair at a 1-based position
    Remove { position: usize },
    /// Fetch the latest rates
    Refresh {
        /// Keep refreshing on the configured interval
        #[arg(short = 'f', long)]
        follow: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::load(cli.config.as_deref());

    if cli.verbose {
        println!(
            "{} v{}",
            "rusty-fxchart".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        match &cli.offline {
            Some(path) => println!("Source: {}", path.display().to_string().dimmed()),
            None => println!("Source: {}", config.api_base_url.dimmed()),
        }
    }

    let result = match cli.offline.clone() {
        Some(path) => match load_offline(&path) {
            Ok(source) => run(cli, config, source).await,
            Err(e) => Err(e),
        },
        None => match FrankfurterSource::with_base_url(&config.api_base_url, config.request_timeout())
        {
            Ok(source) => run(cli, config, source).await,
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn load_offline(path: &Path) -> Result<InMemoryRateSource> {
    let mut source = InMemoryRateSource::new();
    let rows = source
        .load_from_path(path)
        .with_context(|| format!("loading rates from {}", path.display()))?;
    log::info!("Loaded {} rates from {}", rows, path.display());
    Ok(source)
}

async fn run<P: RateProvider>(cli: Cli, config: Config, provider: P) -> Result<()> {
    match cli.command {
        Commands::Chart {
            pair,
            timeframe,
            indicator,
            json,
            csv,
        } => {
            let selection = Selection::new(
                match pair {
                    Some(p) => p.parse()?,
                    None => config.default_pair(),
                },
                match timeframe {
                    Some(t) => t.parse()?,
                    None => config.default_timeframe,
                },
                match indicator {
                    Some(i) => i.parse()?,
                    None => config.default_indicator,
                },
            );
            show_chart(provider, &config, selection, json, csv).await
        }
        Commands::Convert { amount, from, to } => {
            convert(provider, CurrencyPair::new(from, to), amount).await
        }
        Commands::Currencies => {
            list_currencies();
            Ok(())
        }
        Commands::Watch { action } => match &config.data_dir {
            Some(dir) => watch(action, FileBlobStore::new(dir), provider, &config).await,
            None => match dirs::home_dir() {
                Some(home) => {
                    let store = FileBlobStore::new(home.join(CONFIG_DIR_NAME));
                    watch(action, store, provider, &config).await
                }
                None => {
                    log::warn!("No home directory; watchlist will not be saved");
                    watch(action, MemoryBlobStore::new(), provider, &config).await
                }
            },
        },
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn show_chart<P: RateProvider>(
    provider: P,
    config: &Config,
    selection: Selection,
    json: bool,
    csv: Option<PathBuf>,
) -> Result<()> {
    let controller = ChartController::from_config(provider, config)?;
    let pb = spinner(format!(
        "Loading {} ({})...",
        selection.pair.describe(),
        selection.timeframe.label()
    ));
    let outcome = controller.select(selection.clone()).await;
    // `select` skips when the selection equals the configured default
    let outcome = match outcome {
        RefreshOutcome::Skipped => controller.refresh().await,
        other => other,
    };
    pb.finish_and_clear();

    let state = controller.snapshot();
    let view = match (outcome, state.view) {
        (RefreshOutcome::Applied, Some(view)) => view,
        (RefreshOutcome::Failed(e), _) => {
            log::debug!("chart failed: {}", e);
            bail!(state.error.unwrap_or_else(|| e.user_message()));
        }
        _ => bail!("Select both currencies to show a chart"),
    };

    if json {
        println!("{}", view.payload.to_json()?);
    } else {
        print_chart(&selection, &view);
    }

    if let Some(path) = csv {
        fs::write(&path, view.payload.to_csv()?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("{} {}", "Saved".green(), path.display());
    }
    Ok(())
}

fn print_chart(selection: &Selection, view: &ChartView) {
    let from = currency_info(&selection.pair.from);
    let to = currency_info(&selection.pair.to);
    println!(
        "{} {} {} {}  {}",
        from.flag,
        selection.pair.from.bold(),
        to.flag,
        selection.pair.to.bold(),
        selection.timeframe.label().dimmed()
    );

    let summary = view.stats.summary();
    match view.stats.trend() {
        Trend::Up => println!("{}", summary.green()),
        Trend::Down => println!("{}", summary.red()),
    }
    println!();

    let labels = &view.payload.labels;
    let header: Vec<String> = view
        .payload
        .datasets
        .iter()
        .map(|d| format!("{:>14}", d.label))
        .collect();
    println!("{:<12}{}", "Date".bold(), header.join("").bold());
    for (i, label) in labels.iter().enumerate() {
        let cells: Vec<String> = view
            .payload
            .datasets
            .iter()
            .map(|d| match d.data.get(i).copied().flatten() {
                Some(v) => format!("{:>14.4}", v),
                None => format!("{:>14}", "-"),
            })
            .collect();
        println!("{:<12}{}", label, cells.join(""));
    }
}

async fn convert<P: RateProvider>(provider: P, pair: CurrencyPair, amount: f64) -> Result<()> {
    let converter = Converter::new(provider);
    let pb = spinner(format!("Fetching {} rate...", pair));
    let result = converter.convert(&pair, amount).await;
    pb.finish_and_clear();

    let conversion = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("{}", conversion.to_string().bold());
    println!("{}", conversion.rate_line().dimmed());
    Ok(())
}

fn list_currencies() {
    for code in supported_codes() {
        let info = currency_info(code);
        println!(
            "{} {}  {:<20} {}",
            info.flag,
            code.bold(),
            info.name,
            info.symbol.dimmed()
        );
    }
}

async fn watch<S: BlobStore, P: RateProvider>(
    action: WatchAction,
    store: S,
    provider: P,
    config: &Config,
) -> Result<()> {
    let mut watchlist = Watchlist::load(store)?;

    match action {
        WatchAction::List => print_watchlist(&watchlist),
        WatchAction::Add { pair } => {
            let pair: CurrencyPair = pair.parse()?;
            if watchlist.add(pair.clone())? {
                println!("{} {}", "Added".green(), pair);
            } else {
                println!("{} is already watched", pair);
            }
        }
        WatchAction::Remove { position } => {
            match position.checked_sub(1).map(|i| watchlist.remove(i)).transpose()? {
                Some(Some(pair)) => println!("{} {}", "Removed".yellow(), pair),
                _ => bail!("No watchlist entry at position {}", position),
            }
        }
        WatchAction::Refresh { follow } => {
            let mut ticker = tokio::time::interval(config.watchlist_refresh_interval());
            loop {
                ticker.tick().await;
                let pb = spinner(format!("Refreshing {} pairs...", watchlist.len()));
                watchlist.refresh(&provider).await;
                pb.finish_and_clear();
                print_watchlist(&watchlist);
                if !follow {
                    break;
                }
                println!();
            }
        }
    }
    Ok(())
}

fn print_watchlist<S: BlobStore>(watchlist: &Watchlist<S>) {
    if watchlist.is_empty() {
        println!("{}", "Watchlist is empty".dimmed());
        return;
    }
    for (i, entry) in watchlist.entries().iter().enumerate() {
        let rate = match entry.rate {
            Some(rate) => format!("{:.4}", rate).bold(),
            None => "-".dimmed(),
        };
        println!(
            "{:>3}. {} {}/{} {}  {}",
            i + 1,
            currency_info(&entry.pair.from).flag,
            entry.pair.from,
            entry.pair.to,
            currency_info(&entry.pair.to).flag,
            rate
        );
    }
}
