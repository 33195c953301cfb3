//! Core types for the listing bot

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An open holding, one per symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    /// Base-asset amount acquired
    pub quantity: Decimal,
    /// Fill price at open
    pub entry_price: Decimal,
    pub entry_time: DateTime<Utc>,
    /// Highest price observed since open, never below entry_price
    pub high_price: Decimal,
}

impl Position {
    /// Build a fresh position from a buy fill
    pub fn open(symbol: &str, fill: &Fill, at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            quantity: fill.quantity,
            entry_price: fill.price,
            entry_time: at,
            high_price: fill.price,
        }
    }

    /// Price at which the trailing stop fires
    pub fn trail_floor(&self, trail_fraction: Decimal) -> Decimal {
        self.high_price * (Decimal::ONE - trail_fraction)
    }

    /// Price at which the take-profit fires
    pub fn target_price(&self, target_multiplier: Decimal) -> Decimal {
        self.entry_price * target_multiplier
    }

    pub fn held_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.entry_time
    }

    /// Unrealized return at the given price (0.10 = +10%)
    pub fn pnl_ratio(&self, price: Decimal) -> Decimal {
        if self.entry_price.is_zero() {
            return Decimal::ZERO;
        }
        (price - self.entry_price) / self.entry_price
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | qty={} | entry={}",
            self.symbol, self.quantity, self.entry_price
        )
    }
}

/// OHLC summary for one kline interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// No price movement inside the interval
    pub fn is_flat(&self) -> bool {
        self.open == self.close
    }
}

/// Executed result of a market buy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub order_id: String,
    pub quantity: Decimal,
    pub price: Decimal,
}
