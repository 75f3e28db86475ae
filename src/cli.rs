//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::coingecko::{CoinGeckoAdapter, DEFAULT_COINGECKO_URL};
use crate::adapters::csv_trade_log::CsvTradeLog;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::ftso::{DEFAULT_FTSO_ADDRESS, DEFAULT_RPC_URL, FtsoAdapter};
use crate::domain::account::{DEFAULT_INITIAL_BALANCE, PaperAccount};
use crate::domain::config_validation::{
    DEFAULT_PRIMARY_TIMEOUT_MS, DEFAULT_SECONDARY_TIMEOUT_MS, validate_config,
};
use crate::domain::error::{FeedError, PricefuseError};
use crate::domain::ledger::Ledger;
use crate::domain::signal_fusion::{
    self, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD, FusionThresholds,
};
use crate::domain::signals::RiskSignals;
use crate::domain::trade::{Side, TradeIntent};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::quote_service::QuoteService;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";

#[derive(Parser, Debug)]
#[command(
    name = "pricefuse",
    about = "Hybrid price oracle, signal fusion and paper-trading ledger"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a resolved quote for a symbol
    Quote { symbol: String },
    /// Recommend BUY / SELL / HOLD for a price and risk signals
    Suggest {
        #[arg(long, conflicts_with = "symbol", required_unless_present = "symbol")]
        price: Option<f64>,
        /// Fetch the current quote for this symbol instead of passing --price
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        whale_inflow: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        network_stress: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        sentiment_score: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        fud_level: i64,
    },
    /// Record a paper trade
    Trade {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        side: Side,
        #[arg(long)]
        quantity: f64,
        /// Execution price; the current quote is used when omitted
        #[arg(long)]
        price: Option<f64>,
    },
    /// List recorded trades, most recent first
    History,
    /// Show net holdings per symbol
    Holdings,
    /// Validate the configuration file
    Validate,
    /// Start the HTTP API
    Serve,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let filter = config
        .get_non_empty("logging", "filter")
        .unwrap_or_else(|| logging::DEFAULT_FILTER.to_string());
    logging::setup_logger(&filter);

    let result = validate_config(&config).and_then(|()| match cli.command {
        Command::Quote { symbol } => run_quote(&config, &symbol),
        Command::Suggest {
            price,
            symbol,
            whale_inflow,
            network_stress,
            sentiment_score,
            fud_level,
        } => {
            let signals =
                RiskSignals::new(whale_inflow, network_stress, sentiment_score, fud_level);
            run_suggest(&config, price, symbol.as_deref(), signals)
        }
        Command::Trade {
            symbol,
            side,
            quantity,
            price,
        } => run_trade(&config, &symbol, side, quantity, price),
        Command::History => run_history(&config),
        Command::Holdings => run_holdings(&config),
        Command::Validate => {
            eprintln!("Configuration is valid.");
            Ok(())
        }
        Command::Serve => run_serve(&config),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load the INI file, or an empty configuration when no path is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, PricefuseError> {
    match path {
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| PricefuseError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_thresholds(config: &dyn ConfigPort) -> Result<FusionThresholds, PricefuseError> {
    FusionThresholds::new(
        config.get_double("fusion", "low_threshold", DEFAULT_LOW_THRESHOLD),
        config.get_double("fusion", "high_threshold", DEFAULT_HIGH_THRESHOLD),
    )
}

pub fn build_account(config: &dyn ConfigPort) -> PaperAccount {
    PaperAccount::new(config.get_double("account", "initial_balance", DEFAULT_INITIAL_BALANCE))
}

fn feed_setup_error(feed: &'static str) -> impl FnOnce(FeedError) -> PricefuseError {
    move |source| PricefuseError::FeedSetup {
        feed: feed.to_string(),
        source,
    }
}

pub fn build_quote_service(config: &dyn ConfigPort) -> Result<QuoteService, PricefuseError> {
    let rpc_url = config
        .get_non_empty("feeds", "rpc_url")
        .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
    let ftso_address = config
        .get_non_empty("feeds", "ftso_address")
        .unwrap_or_else(|| DEFAULT_FTSO_ADDRESS.to_string());
    let coingecko_url = config
        .get_non_empty("feeds", "coingecko_url")
        .unwrap_or_else(|| DEFAULT_COINGECKO_URL.to_string());

    let primary = FtsoAdapter::new(rpc_url, ftso_address).map_err(feed_setup_error("primary"))?;
    let secondary = CoinGeckoAdapter::new(coingecko_url).map_err(feed_setup_error("secondary"))?;

    Ok(QuoteService::new(
        Arc::new(primary),
        Arc::new(secondary),
        timeout_ms(config, "primary_timeout_ms", DEFAULT_PRIMARY_TIMEOUT_MS),
        timeout_ms(config, "secondary_timeout_ms", DEFAULT_SECONDARY_TIMEOUT_MS),
    ))
}

fn timeout_ms(config: &dyn ConfigPort, key: &str, default: i64) -> Duration {
    let ms = config.get_int("feeds", key, default).max(1);
    Duration::from_millis(ms as u64)
}

/// In-memory ledger, or one replayed from `[ledger] trade_log` when set.
pub fn build_ledger(config: &dyn ConfigPort) -> Result<Ledger, PricefuseError> {
    match config.get_non_empty("ledger", "trade_log") {
        Some(path) => Ledger::with_trade_log(Arc::new(CsvTradeLog::new(path))),
        None => Ok(Ledger::new()),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, PricefuseError> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PricefuseError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{text}");
    Ok(())
}

fn run_quote(config: &dyn ConfigPort, symbol: &str) -> Result<(), PricefuseError> {
    let service = build_quote_service(config)?;
    let quote = runtime()?.block_on(service.quote(symbol))?;
    print_json(&quote)
}

fn run_suggest(
    config: &dyn ConfigPort,
    price: Option<f64>,
    symbol: Option<&str>,
    signals: RiskSignals,
) -> Result<(), PricefuseError> {
    let thresholds = build_thresholds(config)?;
    let price = match (price, symbol) {
        (Some(p), _) => p,
        (None, Some(s)) => {
            let service = build_quote_service(config)?;
            let quote = runtime()?.block_on(service.quote(s))?;
            eprintln!("{} @ {:.6} ({:?})", quote.symbol, quote.price, quote.source);
            quote.price
        }
        (None, None) => {
            return Err(PricefuseError::invalid_input("either --price or --symbol is required"));
        }
    };

    let rec = signal_fusion::recommend(price, &signals, &thresholds)?;
    println!("Action:      {}", rec.action);
    println!("Risk tier:   {}", rec.risk_tier);
    println!("Explanation: {}", rec.explanation);
    Ok(())
}

fn run_trade(
    config: &dyn ConfigPort,
    symbol: &str,
    side: Side,
    quantity: f64,
    price: Option<f64>,
) -> Result<(), PricefuseError> {
    if config.get_non_empty("ledger", "trade_log").is_none() {
        return Err(PricefuseError::ConfigMissing {
            section: "ledger".into(),
            key: "trade_log".into(),
        });
    }
    let ledger = build_ledger(config)?;
    let account = build_account(config);

    let price = match price {
        Some(p) => p,
        None => {
            let service = build_quote_service(config)?;
            runtime()?.block_on(service.quote(symbol))?.price
        }
    };

    let record = ledger.submit_checked(&TradeIntent::new(symbol, side, quantity, price), &account)?;
    println!(
        "Recorded trade #{}: {} {} {} @ {:.6} ({:.2} USD)",
        record.id, record.side, record.quantity, record.symbol, record.price, record.value_usd
    );
    Ok(())
}

fn run_history(config: &dyn ConfigPort) -> Result<(), PricefuseError> {
    let ledger = build_ledger(config)?;
    if ledger.is_empty() {
        eprintln!("No trades recorded");
        return Ok(());
    }
    for t in ledger.history() {
        println!(
            "#{:<5} {}  {:<4} {:<5} {:>14.6} @ {:>14.6}  {:>14.2} USD",
            t.id,
            t.timestamp.to_rfc3339(),
            t.side,
            t.symbol,
            t.quantity,
            t.price,
            t.value_usd
        );
    }
    Ok(())
}

fn run_holdings(config: &dyn ConfigPort) -> Result<(), PricefuseError> {
    let ledger = build_ledger(config)?;
    let summary = build_account(config).summary(&ledger.snapshot());
    for (symbol, qty) in &summary.holdings {
        println!("{symbol:<6} {qty:.6}");
    }
    eprintln!("Demo balance:   {:.2} USD", summary.balance);
    eprintln!("Net cash flow:  {:.2} USD", summary.net_cash_flow);
    Ok(())
}

fn run_serve(config: &dyn ConfigPort) -> Result<(), PricefuseError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};
        use std::net::SocketAddr;
        use tracing::info;

        let listen = config
            .get_non_empty("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let addr: SocketAddr = listen.parse().map_err(|_| PricefuseError::ConfigInvalid {
            section: "web".into(),
            key: "listen".into(),
            reason: format!("{listen:?} is not a socket address"),
        })?;

        let state = AppState {
            quotes: Arc::new(build_quote_service(config)?),
            ledger: Arc::new(build_ledger(config)?),
            thresholds: build_thresholds(config)?,
            account: build_account(config),
        };
        let router = build_router(state);

        runtime()?.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "HTTP API listening");
            axum::serve(listener, router).await?;
            Ok::<(), PricefuseError>(())
        })
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config;
        Err(PricefuseError::invalid_input(
            "web feature is required for serve",
        ))
    }
}
