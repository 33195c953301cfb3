//! Auto-Seller - exits positions flagged by the position monitor
//!
//! A sell that returns any response is presumed executed and the row is
//! deleted. A sell that errors leaves the row in place so the next cycle
//! re-evaluates and re-sells it.

use super::types::ExitTrigger;
use crate::db::Database;
use crate::exchange::MarketGateway;
use crate::notifier::Notifier;
use crate::services::metrics::Metrics;
use anyhow::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Auto-Seller service
pub struct AutoSeller {
    gateway: Arc<dyn MarketGateway>,
    db: Arc<Database>,
    notifier: Arc<dyn Notifier>,
    metrics: Metrics,
}

impl AutoSeller {
    pub fn new(
        gateway: Arc<dyn MarketGateway>,
        db: Arc<Database>,
        notifier: Arc<dyn Notifier>,
        metrics: Metrics,
    ) -> Self {
        Self {
            gateway,
            db,
            notifier,
            metrics,
        }
    }

    /// Sell the stored quantity of `symbol`. Returns whether the row was removed.
    pub async fn close_position(&self, symbol: &str, trigger: &ExitTrigger) -> Result<bool> {
        let Some(position) = self.db.get_position(symbol).await? else {
            warn!("[Sell] No stored position for {}, nothing to sell", symbol);
            return Ok(false);
        };

        let reason = trigger.reason();
        info!(
            "[Sell] {} {} qty {}: {}",
            reason,
            symbol,
            position.quantity,
            trigger.describe()
        );

        let response = match self.gateway.market_sell(symbol, position.quantity).await {
            Ok(response) => response,
            Err(e) => {
                warn!("[Sell] Sell failed for {}, will retry next cycle: {}", symbol, e);
                self.metrics.record_sell_failed();
                self.notifier.notify(format!(
                    "⚠️ SELL FAILED ({})\n{}\n{}\nWill retry next cycle",
                    reason, symbol, e
                ));
                return Ok(false);
            }
        };

        self.db.delete_position(symbol).await?;
        self.metrics.record_sell_executed();

        info!(
            "[Sell] Closed {} ({}) at ~{} (entry {}, {:+.1}%)",
            symbol,
            reason,
            trigger.price(),
            position.entry_price,
            position.pnl_ratio(trigger.price()) * Decimal::ONE_HUNDRED
        );
        self.notifier.notify(format!(
            "🔴 SELL EXECUTED ({})\n{}\n{}",
            reason, symbol, response
        ));

        Ok(true)
    }
}
