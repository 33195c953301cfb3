//! Operator control boundary
//!
//! Mutates runtime settings and reads the position store. Never talks to the
//! exchange and never calls into the engine directly.

use crate::db::Database;
use crate::services::auto_trader::{RuntimeConfig, RuntimeSnapshot, UpdateSettingsRequest};
use crate::types::Position;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Rejected operator input. Nothing is changed when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: Decimal },
}

/// Runtime settings plus open-position count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub settings: RuntimeSnapshot,
    pub open_positions: i64,
}

impl StatusReport {
    pub fn state_label(&self) -> &'static str {
        if self.settings.trading_enabled {
            "RUNNING"
        } else {
            "PAUSED"
        }
    }
}

#[derive(Clone)]
pub struct ControlChannel {
    db: Arc<Database>,
    runtime: Arc<RuntimeConfig>,
}

impl ControlChannel {
    pub fn new(db: Arc<Database>, runtime: Arc<RuntimeConfig>) -> Self {
        Self { db, runtime }
    }

    pub async fn status(&self) -> Result<StatusReport> {
        Ok(StatusReport {
            settings: self.runtime.snapshot(),
            open_positions: self.db.count_positions().await?,
        })
    }

    pub async fn positions(&self) -> Result<Vec<Position>> {
        self.db.get_positions().await
    }

    pub fn set_trading_enabled(&self, enabled: bool) {
        self.runtime.set_trading_enabled(enabled);
        info!(
            "[Control] Trading {}",
            if enabled { "resumed" } else { "paused" }
        );
    }

    pub fn set_buy_quote_amount(&self, raw: &str) -> Result<Decimal, ControlError> {
        let amount = parse_positive("buy_quote_amount", raw)?;
        self.runtime.set_buy_quote_amount(amount);
        info!("[Control] Buy amount set to {}", amount);
        Ok(amount)
    }

    pub fn set_target_multiplier(&self, raw: &str) -> Result<Decimal, ControlError> {
        let multiplier = parse_positive("target_multiplier", raw)?;
        self.runtime.set_target_multiplier(multiplier);
        info!("[Control] Target multiplier set to {}x", multiplier);
        Ok(multiplier)
    }

    /// Apply a partial update. Every present field is validated before any is written.
    pub fn apply_update(&self, request: &UpdateSettingsRequest) -> Result<RuntimeSnapshot, ControlError> {
        let amount = request
            .buy_quote_amount
            .as_deref()
            .map(|raw| parse_positive("buy_quote_amount", raw))
            .transpose()?;
        let multiplier = request
            .target_multiplier
            .as_deref()
            .map(|raw| parse_positive("target_multiplier", raw))
            .transpose()?;

        if let Some(amount) = amount {
            self.runtime.set_buy_quote_amount(amount);
        }
        if let Some(multiplier) = multiplier {
            self.runtime.set_target_multiplier(multiplier);
        }
        if let Some(enabled) = request.trading_enabled {
            self.runtime.set_trading_enabled(enabled);
        }

        let snapshot = self.runtime.snapshot();
        info!("[Control] Settings updated: {:?}", snapshot);
        Ok(snapshot)
    }
}

fn parse_positive(field: &'static str, raw: &str) -> Result<Decimal, ControlError> {
    let value = Decimal::from_str(raw.trim()).map_err(|_| ControlError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    if value <= Decimal::ZERO {
        return Err(ControlError::NotPositive { field, value });
    }
    Ok(value)
}
