//! Metrics collection for monitoring engine activity

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Collected metrics for the trading engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Running cycles completed
    pub cycles: u64,
    /// Loop iterations skipped while paused
    pub paused_ticks: u64,
    /// Newly listed symbols that passed the listing heuristic
    pub candidates: u64,
    pub buys_filled: u64,
    pub buys_failed: u64,
    pub sells_executed: u64,
    pub sells_failed: u64,
    /// Open positions skipped because no price was available
    pub price_failures: u64,
    /// All gateway errors, any operation
    pub gateway_errors: u64,
}

/// Thread-safe metrics collector
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    cycles: AtomicU64,
    paused_ticks: AtomicU64,
    candidates: AtomicU64,
    buys_filled: AtomicU64,
    buys_failed: AtomicU64,
    sells_executed: AtomicU64,
    sells_failed: AtomicU64,
    price_failures: AtomicU64,
    gateway_errors: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&self) {
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_paused_tick(&self) {
        self.inner.paused_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_candidates(&self, count: usize) {
        self.inner.candidates.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_buy_filled(&self) {
        self.inner.buys_filled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_buy_failed(&self) {
        self.inner.buys_failed.fetch_add(1, Ordering::Relaxed);
        self.record_gateway_error();
    }

    pub fn record_sell_executed(&self) {
        self.inner.sells_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sell_failed(&self) {
        self.inner.sells_failed.fetch_add(1, Ordering::Relaxed);
        self.record_gateway_error();
    }

    pub fn record_price_failure(&self) {
        self.inner.price_failures.fetch_add(1, Ordering::Relaxed);
        self.record_gateway_error();
    }

    pub fn record_gateway_error(&self) {
        self.inner.gateway_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        MetricsSnapshot {
            cycles: load(&self.inner.cycles),
            paused_ticks: load(&self.inner.paused_ticks),
            candidates: load(&self.inner.candidates),
            buys_filled: load(&self.inner.buys_filled),
            buys_failed: load(&self.inner.buys_failed),
            sells_executed: load(&self.inner.sells_executed),
            sells_failed: load(&self.inner.sells_failed),
            price_failures: load(&self.inner.price_failures),
            gateway_errors: load(&self.inner.gateway_errors),
        }
    }
}
