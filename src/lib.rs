//! MEXC New-Listing Trading Bot Library
//!
//! Watches the exchange for newly listed pairs, buys the ones that have not
//! traded yet, and manages each position until one exit fires:
//!
//! 1. **Target**: price reaches entry × target multiplier.
//! 2. **Trailing stop**: price falls a fixed fraction below the highest price
//!    seen since entry.
//! 3. **Timeout**: the position has been held for the maximum hold time.
//!
//! Operators pause, resume and retune the bot over Telegram while it runs.

pub mod api;
pub mod config;
pub mod db;
pub mod exchange;
pub mod notifier;
pub mod services;
pub mod types;

pub use config::{Config, EngineConfig};
pub use db::Database;
pub use exchange::{GatewayError, MarketGateway, MexcClient};
pub use notifier::{LogNotifier, Notifier, TelegramNotifier};
pub use services::{ControlChannel, Metrics, RuntimeConfig, TradingEngine};
pub use types::{Candle, Fill, Position};
