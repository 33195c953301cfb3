//! Market gateway: the engine's only route to the exchange

pub mod error;
pub mod mexc;

pub use error::GatewayError;
pub use mexc::MexcClient;

use crate::types::{Candle, Fill};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Market operations consumed by the engine.
///
/// Implementations must bound every call in time and report failures as a
/// `GatewayError` value, never by panicking.
#[async_trait]
pub trait MarketGateway: Send + Sync {
    /// Symbols currently open for trading
    async fn tradable_symbols(&self) -> Result<HashSet<String>, GatewayError>;

    /// Most recent `limit` klines, oldest first
    async fn recent_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, GatewayError>;

    async fn current_price(&self, symbol: &str) -> Result<Decimal, GatewayError>;

    /// Spend `quote_amount` of the quote asset at market
    async fn market_buy(&self, symbol: &str, quote_amount: Decimal) -> Result<Fill, GatewayError>;

    /// Sell `quantity` of the base asset at market. The raw response is
    /// returned verbatim for operator visibility.
    async fn market_sell(
        &self,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<serde_json::Value, GatewayError>;
}
