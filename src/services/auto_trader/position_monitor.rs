//! Position Monitor - checks every open position for exit triggers
//!
//! Per position, in priority order (first match wins):
//! - Target: price >= entry * target_multiplier
//! - Trailing Stop: price <= high * (1 - trail_fraction)
//! - Timeout: held for at least max_hold
//!
//! The target multiplier is read at evaluation time, so operator changes apply
//! to positions that are already open.

use super::auto_seller::AutoSeller;
use super::config::RuntimeConfig;
use super::types::{ExitTrigger, MonitorReport};
use crate::config::EngineConfig;
use crate::db::Database;
use crate::exchange::MarketGateway;
use crate::services::metrics::Metrics;
use crate::types::Position;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Thresholds for one evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ExitRules {
    pub target_multiplier: Decimal,
    pub trail_fraction: Decimal,
    pub max_hold: chrono::Duration,
}

/// Decide whether `position` should exit at `price`.
///
/// `position.high_price` must already include `price`.
pub fn evaluate_exit(
    position: &Position,
    price: Decimal,
    now: DateTime<Utc>,
    rules: &ExitRules,
) -> Option<ExitTrigger> {
    let target = position.target_price(rules.target_multiplier);
    if price >= target {
        return Some(ExitTrigger::TakeProfit { price, target });
    }

    let floor = position.trail_floor(rules.trail_fraction);
    if price <= floor {
        return Some(ExitTrigger::TrailingStop {
            price,
            peak: position.high_price,
            floor,
        });
    }

    let held = position.held_for(now);
    if held >= rules.max_hold {
        return Some(ExitTrigger::TimeExit {
            price,
            held_secs: held.num_seconds(),
        });
    }

    None
}

/// Position Monitor service
pub struct PositionMonitor {
    gateway: Arc<dyn MarketGateway>,
    db: Arc<Database>,
    runtime: Arc<RuntimeConfig>,
    seller: AutoSeller,
    trail_fraction: Decimal,
    max_hold: chrono::Duration,
    metrics: Metrics,
}

impl PositionMonitor {
    pub fn new(
        gateway: Arc<dyn MarketGateway>,
        db: Arc<Database>,
        runtime: Arc<RuntimeConfig>,
        seller: AutoSeller,
        config: &EngineConfig,
        metrics: Metrics,
    ) -> Self {
        Self {
            gateway,
            db,
            runtime,
            seller,
            trail_fraction: config.trail_fraction,
            max_hold: config.max_hold(),
            metrics,
        }
    }

    /// Evaluate every stored position once, selling those that hit a trigger
    pub async fn check_positions(&self) -> Result<MonitorReport> {
        let positions = self.db.get_positions().await?;
        let mut report = MonitorReport::default();

        for mut position in positions {
            let symbol = position.symbol.clone();

            let price = match self.gateway.current_price(&symbol).await {
                Ok(price) => price,
                Err(e) => {
                    warn!("[Monitor] No price for {}, skipping this cycle: {}", symbol, e);
                    self.metrics.record_price_failure();
                    report.price_failures += 1;
                    continue;
                }
            };

            position.high_price = match self.db.raise_high_price(&symbol, price).await {
                Ok(Some(high)) => high,
                Ok(None) => {
                    debug!("[Monitor] {} closed while checking, skipping", symbol);
                    continue;
                }
                Err(e) => {
                    warn!("[Monitor] Failed to persist high for {}: {:#}", symbol, e);
                    position.high_price.max(price)
                }
            };

            report.evaluated += 1;

            let rules = ExitRules {
                target_multiplier: self.runtime.target_multiplier(),
                trail_fraction: self.trail_fraction,
                max_hold: self.max_hold,
            };

            let Some(trigger) = evaluate_exit(&position, price, Utc::now(), &rules) else {
                debug!(
                    "[Monitor] {} holding at {} (entry {}, high {})",
                    symbol, price, position.entry_price, position.high_price
                );
                continue;
            };

            match self.seller.close_position(&symbol, &trigger).await {
                Ok(true) => report.closed += 1,
                Ok(false) => {}
                Err(e) => warn!("[Monitor] Failed to close {}: {:#}", symbol, e),
            }
        }

        Ok(report)
    }
}
