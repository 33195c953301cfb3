//! Trading engine - the discovery → buy → monitor → exit loop
//!
//! Two states, driven only by the `trading_enabled` flag:
//! - RUNNING: one full cycle, then sleep the cycle interval
//! - PAUSED: no gateway calls, sleep the short pause interval
//!
//! The flag is read once per iteration, so a resume always starts from a
//! clean cycle boundary.

use super::auto_buyer::AutoBuyer;
use super::auto_seller::AutoSeller;
use super::config::RuntimeConfig;
use super::listing_scanner::ListingScanner;
use super::position_monitor::PositionMonitor;
use super::types::CycleReport;
use crate::config::EngineConfig;
use crate::db::Database;
use crate::exchange::MarketGateway;
use crate::notifier::Notifier;
use crate::services::metrics::Metrics;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineState {
    Running,
    Paused,
}

impl EngineState {
    pub fn from_flag(trading_enabled: bool) -> Self {
        if trading_enabled {
            EngineState::Running
        } else {
            EngineState::Paused
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Running => write!(f, "RUNNING"),
            EngineState::Paused => write!(f, "PAUSED"),
        }
    }
}

/// Owns the position lifecycle. Runs forever on its own task.
pub struct TradingEngine {
    gateway: Arc<dyn MarketGateway>,
    runtime: Arc<RuntimeConfig>,
    notifier: Arc<dyn Notifier>,
    metrics: Metrics,
    scanner: ListingScanner,
    buyer: AutoBuyer,
    monitor: PositionMonitor,
    state: EngineState,
    cycle_interval: Duration,
    pause_interval: Duration,
}

impl TradingEngine {
    pub fn new(
        gateway: Arc<dyn MarketGateway>,
        db: Arc<Database>,
        runtime: Arc<RuntimeConfig>,
        notifier: Arc<dyn Notifier>,
        metrics: Metrics,
        config: &EngineConfig,
    ) -> Self {
        let scanner = ListingScanner::new(config, metrics.clone());
        let buyer = AutoBuyer::new(
            gateway.clone(),
            db.clone(),
            runtime.clone(),
            notifier.clone(),
            metrics.clone(),
        );
        let seller = AutoSeller::new(gateway.clone(), db.clone(), notifier.clone(), metrics.clone());
        let monitor = PositionMonitor::new(
            gateway.clone(),
            db,
            runtime.clone(),
            seller,
            config,
            metrics.clone(),
        );

        Self {
            gateway,
            state: EngineState::from_flag(runtime.trading_enabled()),
            runtime,
            notifier,
            metrics,
            scanner,
            buyer,
            monitor,
            cycle_interval: config.cycle_interval(),
            pause_interval: config.pause_interval(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Loop forever. The only way out is process termination.
    pub async fn run(mut self) {
        info!("[Engine] Starting in state {}", self.state);
        self.notifier.notify("✅ BOT LIVE".to_string());

        loop {
            let wait = self.tick().await;
            tokio::time::sleep(wait).await;
        }
    }

    /// One loop iteration. Returns how long to sleep before the next one.
    pub async fn tick(&mut self) -> Duration {
        let next = EngineState::from_flag(self.runtime.trading_enabled());
        if next != self.state {
            info!("[Engine] {} -> {}", self.state, next);
            self.state = next;
        }

        match self.state {
            EngineState::Paused => {
                self.metrics.record_paused_tick();
                self.pause_interval
            }
            EngineState::Running => {
                let report = self.run_cycle().await;
                debug!(
                    "[Engine] Cycle done: {} known, {} candidates, {} opened, {} evaluated, {} closed | {:?}",
                    self.scanner.known_count(),
                    report.candidates,
                    report.opened,
                    report.monitor.evaluated,
                    report.monitor.closed,
                    self.metrics.snapshot()
                );
                self.cycle_interval
            }
        }
    }

    /// Discovery, buys, then one monitor pass over every open position
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.scanner.scan(self.gateway.as_ref()).await {
            Ok(candidates) => {
                report.candidates = candidates.len();
                for symbol in &candidates {
                    match self.buyer.open_position(symbol).await {
                        Ok(Some(_)) => report.opened += 1,
                        Ok(None) => {}
                        Err(e) => error!("[Engine] Open failed for {}: {:#}", symbol, e),
                    }
                }
            }
            Err(e) if e.is_transient() => {
                warn!("[Engine] Discovery skipped, universe unavailable: {}", e);
                self.metrics.record_gateway_error();
            }
            Err(e) => {
                error!("[Engine] Discovery skipped: {}", e);
                self.metrics.record_gateway_error();
            }
        }

        match self.monitor.check_positions().await {
            Ok(monitor) => report.monitor = monitor,
            Err(e) => error!("[Engine] Monitor pass failed: {:#}", e),
        }

        self.metrics.record_cycle();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_follows_flag() {
        assert_eq!(EngineState::from_flag(true), EngineState::Running);
        assert_eq!(EngineState::from_flag(false), EngineState::Paused);
        assert_eq!(EngineState::Paused.to_string(), "PAUSED");
    }
}
