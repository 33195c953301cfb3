//! Scripted market gateway and recording notifier for engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mexc_listing_bot::config::EngineConfig;
use mexc_listing_bot::services::auto_trader::{AutoBuyer, AutoSeller, PositionMonitor};
use mexc_listing_bot::{
    Candle, Database, Fill, GatewayError, MarketGateway, Metrics, Notifier, Position,
    RuntimeConfig, TradingEngine,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-process gateway. Every call is counted.
#[derive(Default)]
pub struct FakeGateway {
    calls: AtomicUsize,
    /// Universe per discovery call; the last entry repeats
    universes: Mutex<VecDeque<Result<HashSet<String>, GatewayError>>>,
    candles: Mutex<HashMap<String, Vec<Candle>>>,
    /// Remaining kline failures per symbol
    candle_failures: Mutex<HashMap<String, usize>>,
    candle_calls: Mutex<HashMap<String, usize>>,
    prices: Mutex<HashMap<String, Result<Decimal, GatewayError>>>,
    buys: Mutex<HashMap<String, Result<Fill, GatewayError>>>,
    sell_error: Mutex<Option<GatewayError>>,
    pub sold: Mutex<Vec<(String, Decimal)>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn push_universe(&self, symbols: &[&str]) {
        let set = symbols.iter().map(|s| s.to_string()).collect();
        self.universes.lock().unwrap().push_back(Ok(set));
    }

    pub fn push_universe_error(&self, error: GatewayError) {
        self.universes.lock().unwrap().push_back(Err(error));
    }

    pub fn set_candles(&self, symbol: &str, candles: Vec<Candle>) {
        self.candles.lock().unwrap().insert(symbol.to_string(), candles);
    }

    /// Fail the next `times` kline fetches for `symbol`
    pub fn fail_candles(&self, symbol: &str, times: usize) {
        self.candle_failures
            .lock()
            .unwrap()
            .insert(symbol.to_string(), times);
    }

    pub fn candle_calls(&self, symbol: &str) -> usize {
        self.candle_calls
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.prices.lock().unwrap().insert(symbol.to_string(), Ok(price));
    }

    pub fn fail_price(&self, symbol: &str) {
        self.prices
            .lock()
            .unwrap()
            .insert(symbol.to_string(), Err(GatewayError::Timeout));
    }

    pub fn set_buy(&self, symbol: &str, quantity: Decimal, price: Decimal) {
        let fill = Fill {
            order_id: format!("order-{}", symbol),
            quantity,
            price,
        };
        self.buys.lock().unwrap().insert(symbol.to_string(), Ok(fill));
    }

    pub fn set_sell_error(&self, error: Option<GatewayError>) {
        *self.sell_error.lock().unwrap() = error;
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MarketGateway for FakeGateway {
    async fn tradable_symbols(&self) -> Result<HashSet<String>, GatewayError> {
        self.hit();
        let mut universes = self.universes.lock().unwrap();
        if universes.len() > 1 {
            return universes.pop_front().unwrap();
        }
        universes.front().cloned().unwrap_or_else(|| Ok(HashSet::new()))
    }

    async fn recent_candles(
        &self,
        symbol: &str,
        _interval: &str,
        _limit: u32,
    ) -> Result<Vec<Candle>, GatewayError> {
        self.hit();
        *self
            .candle_calls
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default() += 1;

        if let Some(remaining) = self.candle_failures.lock().unwrap().get_mut(symbol) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(GatewayError::Timeout);
            }
        }

        Ok(self
            .candles
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_default())
    }

    async fn current_price(&self, symbol: &str) -> Result<Decimal, GatewayError> {
        self.hit();
        self.prices
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Err(GatewayError::Malformed(format!("no price for {}", symbol))))
    }

    async fn market_buy(&self, symbol: &str, _quote_amount: Decimal) -> Result<Fill, GatewayError> {
        self.hit();
        // Yield so concurrent opens interleave
        tokio::task::yield_now().await;
        self.buys.lock().unwrap().get(symbol).cloned().unwrap_or_else(|| {
            Err(GatewayError::Rejected {
                body: "no fill scripted".to_string(),
            })
        })
    }

    async fn market_sell(
        &self,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<serde_json::Value, GatewayError> {
        self.hit();
        if let Some(error) = self.sell_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.sold.lock().unwrap().push((symbol.to_string(), quantity));
        Ok(json!({ "symbol": symbol, "orderId": "sell-1" }))
    }
}

/// Keeps every notification in memory
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(Option<String>, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, chat_id: Option<String>, text: String) {
        self.messages.lock().unwrap().push((chat_id, text));
    }
}

pub fn flat_candles(price: Decimal, count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle {
            open_time: i as i64 * 60_000,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: Decimal::ZERO,
        })
        .collect()
}

pub fn position(symbol: &str, entry: Decimal, high: Decimal, entry_time: DateTime<Utc>) -> Position {
    Position {
        symbol: symbol.to_string(),
        quantity: dec!(10),
        entry_price: entry,
        entry_time,
        high_price: high,
    }
}

/// Everything a test needs, wired the way the binary wires it
pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub db: Arc<Database>,
    pub runtime: Arc<RuntimeConfig>,
    pub metrics: Metrics,
    pub config: EngineConfig,
}

impl Harness {
    pub async fn new() -> Self {
        Self {
            gateway: FakeGateway::new(),
            notifier: RecordingNotifier::new(),
            db: Arc::new(Database::in_memory().await.unwrap()),
            runtime: Arc::new(RuntimeConfig::new(true, dec!(1), dec!(10))),
            metrics: Metrics::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn engine(&self) -> TradingEngine {
        TradingEngine::new(
            self.gateway.clone(),
            self.db.clone(),
            self.runtime.clone(),
            self.notifier.clone(),
            self.metrics.clone(),
            &self.config,
        )
    }

    pub fn buyer(&self) -> AutoBuyer {
        AutoBuyer::new(
            self.gateway.clone(),
            self.db.clone(),
            self.runtime.clone(),
            self.notifier.clone(),
            self.metrics.clone(),
        )
    }

    pub fn monitor(&self) -> PositionMonitor {
        let seller = AutoSeller::new(
            self.gateway.clone(),
            self.db.clone(),
            self.notifier.clone(),
            self.metrics.clone(),
        );
        PositionMonitor::new(
            self.gateway.clone(),
            self.db.clone(),
            self.runtime.clone(),
            seller,
            &self.config,
            self.metrics.clone(),
        )
    }
}
