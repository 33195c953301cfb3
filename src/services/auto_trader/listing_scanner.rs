//! Listing Scanner - finds newly listed symbols that have not traded yet
//!
//! Each pass diffs the tradable universe against the previous pass. A new
//! symbol is a buy candidate when every recent kline is flat (open == close),
//! i.e. the pair is still sitting at its initial print. A symbol whose klines
//! cannot be fetched is dropped from the known set and retried next pass.

use crate::config::EngineConfig;
use crate::exchange::{GatewayError, MarketGateway};
use crate::services::metrics::Metrics;
use crate::types::Candle;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Listing heuristic: a non-empty run of flat klines
pub fn is_fresh_listing(candles: &[Candle]) -> bool {
    !candles.is_empty() && candles.iter().all(Candle::is_flat)
}

/// Tracks the known universe between passes. In-memory only.
pub struct ListingScanner {
    known: HashSet<String>,
    /// Set after the first successful pass; that pass only records the universe
    primed: bool,
    candle_interval: String,
    candle_limit: u32,
    metrics: Metrics,
}

impl ListingScanner {
    pub fn new(config: &EngineConfig, metrics: Metrics) -> Self {
        Self {
            known: HashSet::new(),
            primed: false,
            candle_interval: config.candle_interval.clone(),
            candle_limit: config.candle_limit,
            metrics,
        }
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    /// Run one discovery pass and return buy candidates, sorted.
    ///
    /// Fails only when the universe itself cannot be fetched; the known set is
    /// left untouched in that case.
    pub async fn scan(&mut self, gateway: &dyn MarketGateway) -> Result<Vec<String>, GatewayError> {
        let current = gateway.tradable_symbols().await?;

        let mut new_symbols: Vec<String> = current.difference(&self.known).cloned().collect();
        new_symbols.sort();
        self.known = current;

        if !self.primed {
            self.primed = true;
            info!(
                "[Discovery] Primed with {} tradable symbols, watching for new listings",
                self.known.len()
            );
            return Ok(Vec::new());
        }

        if new_symbols.is_empty() {
            return Ok(Vec::new());
        }

        info!("[Discovery] {} new symbols: {:?}", new_symbols.len(), new_symbols);

        let mut candidates = Vec::new();
        for symbol in new_symbols {
            let candles = match gateway
                .recent_candles(&symbol, &self.candle_interval, self.candle_limit)
                .await
            {
                Ok(candles) => candles,
                Err(e) => {
                    // Forget it so the next pass sees it as new again
                    warn!("[Discovery] Failed to fetch candles for {}, retrying next cycle: {}", symbol, e);
                    self.metrics.record_gateway_error();
                    self.known.remove(&symbol);
                    continue;
                }
            };

            if is_fresh_listing(&candles) {
                info!("[Discovery] {} is a fresh listing ({} flat candles)", symbol, candles.len());
                candidates.push(symbol);
            } else {
                debug!("[Discovery] {} already trading, skipping", symbol);
            }
        }

        self.metrics.record_candidates(candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn candle(open: Decimal, close: Decimal) -> Candle {
        Candle {
            open_time: 0,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: Decimal::ZERO,
        }
    }

    #[test]
    fn test_all_flat_is_fresh() {
        let candles = vec![candle(dec!(0.01), dec!(0.01)); 5];
        assert!(is_fresh_listing(&candles));
    }

    #[test]
    fn test_any_move_is_not_fresh() {
        let mut candles = vec![candle(dec!(0.01), dec!(0.01)); 5];
        candles[3] = candle(dec!(0.01), dec!(0.011));
        assert!(!is_fresh_listing(&candles));
    }

    #[test]
    fn test_no_candles_is_not_fresh() {
        assert!(!is_fresh_listing(&[]));
    }

    #[test]
    fn test_flat_compares_by_value() {
        assert!(is_fresh_listing(&[candle(dec!(1.0), dec!(1.00))]));
    }
}
