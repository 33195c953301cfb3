//! Auto-Buyer - opens positions for discovered listings
//!
//! Buys only while trading is enabled and no position exists for the symbol.
//! A rejected or malformed buy is reported and never retried.

use super::config::RuntimeConfig;
use crate::db::Database;
use crate::exchange::MarketGateway;
use crate::notifier::Notifier;
use crate::services::metrics::Metrics;
use crate::types::Position;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Auto-Buyer service
pub struct AutoBuyer {
    gateway: Arc<dyn MarketGateway>,
    db: Arc<Database>,
    runtime: Arc<RuntimeConfig>,
    notifier: Arc<dyn Notifier>,
    metrics: Metrics,
}

impl AutoBuyer {
    pub fn new(
        gateway: Arc<dyn MarketGateway>,
        db: Arc<Database>,
        runtime: Arc<RuntimeConfig>,
        notifier: Arc<dyn Notifier>,
        metrics: Metrics,
    ) -> Self {
        Self {
            gateway,
            db,
            runtime,
            notifier,
            metrics,
        }
    }

    /// Open a position for `symbol`.
    ///
    /// Returns the stored position, or `None` when skipped or rejected.
    /// Errors are store failures only.
    pub async fn open_position(&self, symbol: &str) -> Result<Option<Position>> {
        if !self.runtime.trading_enabled() {
            debug!("[Buy] Trading paused, not buying {}", symbol);
            return Ok(None);
        }

        if self.db.has_position(symbol).await? {
            debug!("[Buy] Already holding {}, skipping", symbol);
            return Ok(None);
        }

        let amount = self.runtime.buy_quote_amount();
        info!("[Buy] Buying {} for {} quote", symbol, amount);

        let fill = match self.gateway.market_buy(symbol, amount).await {
            Ok(fill) => fill,
            Err(e) => {
                warn!("[Buy] Buy failed for {}: {}", symbol, e);
                self.metrics.record_buy_failed();
                self.notifier
                    .notify(format!("❌ BUY FAILED {}\n{}", symbol, e));
                return Ok(None);
            }
        };

        let position = Position::open(symbol, &fill, Utc::now());
        if let Err(e) = self.db.upsert_position(&position).await {
            error!("[Buy] {} filled but could not be stored: {:#}", symbol, e);
            self.notifier.notify(format!(
                "⚠️ BUY FILLED BUT NOT RECORDED\n{}\nQty: {}\nPrice: {}",
                symbol, position.quantity, position.entry_price
            ));
            return Err(e);
        }
        self.metrics.record_buy_filled();

        info!(
            "[Buy] Opened {} qty {} at {} (order {})",
            symbol, position.quantity, position.entry_price, fill.order_id
        );
        self.notifier.notify(format!(
            "🟢 BUY EXECUTED\n{}\nQty: {}\nPrice: {}",
            symbol, position.quantity, position.entry_price
        ));

        Ok(Some(position))
    }
}
