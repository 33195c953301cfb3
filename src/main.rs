//! MEXC Listing Bot CLI
//!
//! Runs the trading engine together with the Telegram webhook / status server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mexc_listing_bot::api::{create_app, AppState};
use mexc_listing_bot::{
    Config, Database, LogNotifier, MarketGateway, Metrics, MexcClient, Notifier, RuntimeConfig,
    TelegramNotifier, TradingEngine,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mexc-listing-bot")]
#[command(about = "Buys fresh MEXC listings and manages exits")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine and the webhook server
    Run {
        /// Listen address, overrides BIND_ADDR
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Print open positions from the store
    Positions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Run { bind: None }) {
        Commands::Run { bind } => run_bot(config, bind).await?,
        Commands::Positions => show_positions(&config).await?,
    }

    Ok(())
}

async fn run_bot(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║       MEXC LISTING BOT                                       ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Trading:   {:<48} ║", if config.trading_enabled { "RUNNING" } else { "PAUSED" });
    println!("║  Buy size:  {:<48} ║", format!("{} {}", config.buy_quote_amount, config.engine.quote_asset));
    println!("║  Target:    {:<48} ║", format!("{}x", config.target_multiplier));
    println!("║  API keys:  {:<48} ║", if config.has_credentials() { "SET" } else { "MISSING" });
    println!("║  Telegram:  {:<48} ║", if config.telegram_bot_token.is_some() { "ENABLED" } else { "DISABLED" });
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let db = Arc::new(Database::new(&config.database_path).await?);
    let gateway: Arc<dyn MarketGateway> = Arc::new(MexcClient::new(&config)?);
    let runtime = Arc::new(RuntimeConfig::from_config(&config));
    let metrics = Metrics::new();

    let notifier: Arc<dyn Notifier> = match &config.telegram_bot_token {
        Some(token) => Arc::new(TelegramNotifier::new(
            token,
            config.telegram_chat_id.clone(),
            config.notify_timeout(),
        )),
        None => Arc::new(LogNotifier),
    };

    let open = db.count_positions().await?;
    info!("[Engine] Resuming with {} open positions", open);

    let engine = TradingEngine::new(
        gateway,
        db.clone(),
        runtime.clone(),
        notifier.clone(),
        metrics.clone(),
        &config.engine,
    );
    tokio::spawn(engine.run());

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, db, runtime, notifier, metrics);
    let app = create_app(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn show_positions(config: &Config) -> Result<()> {
    let db = Database::new(&config.database_path).await?;
    let positions = db.get_positions().await?;

    println!("\n{}", "=".repeat(70));
    println!("  OPEN POSITIONS ({})", positions.len());
    println!("{}\n", "=".repeat(70));

    if positions.is_empty() {
        println!("  No open positions");
        return Ok(());
    }

    for position in &positions {
        println!(
            "  {:<14} qty {:<14} entry {:<12} high {:<12} since {}",
            position.symbol,
            position.quantity,
            position.entry_price,
            position.high_price,
            position.entry_time.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();

    Ok(())
}
