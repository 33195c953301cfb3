//! Runtime trading settings shared between the engine and the control channel
//!
//! Each field is read and written independently. A reader may see a mix of
//! old and new fields across a burst of updates, but never a torn value.

use crate::config::Config;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

/// Guarded, concurrently-mutable trading settings
#[derive(Debug)]
pub struct RuntimeConfig {
    /// Master switch - RUNNING when true, PAUSED when false
    trading_enabled: AtomicBool,
    /// Quote currency spent per buy
    buy_quote_amount: RwLock<Decimal>,
    /// Take-profit ratio applied to every open position
    target_multiplier: RwLock<Decimal>,
}

/// Point-in-time copy for status reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    pub trading_enabled: bool,
    pub buy_quote_amount: Decimal,
    pub target_multiplier: Decimal,
}

impl RuntimeConfig {
    pub fn new(trading_enabled: bool, buy_quote_amount: Decimal, target_multiplier: Decimal) -> Self {
        Self {
            trading_enabled: AtomicBool::new(trading_enabled),
            buy_quote_amount: RwLock::new(buy_quote_amount),
            target_multiplier: RwLock::new(target_multiplier),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.trading_enabled,
            config.buy_quote_amount,
            config.target_multiplier,
        )
    }

    pub fn trading_enabled(&self) -> bool {
        self.trading_enabled.load(Ordering::SeqCst)
    }

    pub fn set_trading_enabled(&self, enabled: bool) {
        self.trading_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn buy_quote_amount(&self) -> Decimal {
        *self
            .buy_quote_amount
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_buy_quote_amount(&self, amount: Decimal) {
        *self
            .buy_quote_amount
            .write()
            .unwrap_or_else(PoisonError::into_inner) = amount;
    }

    pub fn target_multiplier(&self) -> Decimal {
        *self
            .target_multiplier
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_target_multiplier(&self, multiplier: Decimal) {
        *self
            .target_multiplier
            .write()
            .unwrap_or_else(PoisonError::into_inner) = multiplier;
    }

    pub fn snapshot(&self) -> RuntimeSnapshot {
        RuntimeSnapshot {
            trading_enabled: self.trading_enabled(),
            buy_quote_amount: self.buy_quote_amount(),
            target_multiplier: self.target_multiplier(),
        }
    }
}

/// Request to update runtime settings (partial update).
///
/// Decimal fields arrive as strings and are validated before anything is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub trading_enabled: Option<bool>,
    pub buy_quote_amount: Option<String>,
    pub target_multiplier: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_fields_update_independently() {
        let runtime = RuntimeConfig::new(true, dec!(1), dec!(10));

        runtime.set_target_multiplier(dec!(3));
        assert_eq!(runtime.target_multiplier(), dec!(3));
        assert_eq!(runtime.buy_quote_amount(), dec!(1));
        assert!(runtime.trading_enabled());

        runtime.set_trading_enabled(false);
        assert_eq!(
            runtime.snapshot(),
            RuntimeSnapshot {
                trading_enabled: false,
                buy_quote_amount: dec!(1),
                target_multiplier: dec!(3),
            }
        );
    }

    #[test]
    fn test_concurrent_writers_never_tear() {
        let runtime = Arc::new(RuntimeConfig::new(true, dec!(1), dec!(10)));
        let allowed = [dec!(1), dec!(2.5), dec!(7.75)];

        let writers: Vec<_> = allowed
            .iter()
            .map(|&amount| {
                let runtime = runtime.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        runtime.set_buy_quote_amount(amount);
                    }
                })
            })
            .collect();

        for _ in 0..1000 {
            assert!(allowed.contains(&runtime.buy_quote_amount()));
        }
        for writer in writers {
            writer.join().unwrap();
        }
    }
}
