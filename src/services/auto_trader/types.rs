//! Types for the auto-trading engine

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Why a position was exited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Target,
    Trail,
    Timeout,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Target => write!(f, "TARGET"),
            ExitReason::Trail => write!(f, "TRAIL"),
            ExitReason::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

/// Exit condition that fired for a position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExitTrigger {
    TakeProfit {
        price: Decimal,
        target: Decimal,
    },
    TrailingStop {
        price: Decimal,
        peak: Decimal,
        floor: Decimal,
    },
    TimeExit {
        price: Decimal,
        held_secs: i64,
    },
}

impl ExitTrigger {
    pub fn reason(&self) -> ExitReason {
        match self {
            ExitTrigger::TakeProfit { .. } => ExitReason::Target,
            ExitTrigger::TrailingStop { .. } => ExitReason::Trail,
            ExitTrigger::TimeExit { .. } => ExitReason::Timeout,
        }
    }

    /// Human-readable detail for logs
    pub fn describe(&self) -> String {
        match self {
            ExitTrigger::TakeProfit { price, target } => {
                format!("price {} reached target {}", price, target)
            }
            ExitTrigger::TrailingStop { price, peak, floor } => {
                format!("price {} fell below {} (peak {})", price, floor, peak)
            }
            ExitTrigger::TimeExit { price, held_secs } => {
                format!("held {}s, exiting at {}", held_secs, price)
            }
        }
    }

    /// Price observed when the trigger fired
    pub fn price(&self) -> Decimal {
        match self {
            ExitTrigger::TakeProfit { price, .. } => *price,
            ExitTrigger::TrailingStop { price, .. } => *price,
            ExitTrigger::TimeExit { price, .. } => *price,
        }
    }
}

/// Outcome of one monitor pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitorReport {
    /// Positions with a fresh price that were evaluated
    pub evaluated: usize,
    /// Positions whose price could not be fetched
    pub price_failures: usize,
    /// Positions closed this pass
    pub closed: usize,
}

/// Outcome of one engine cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Newly listed symbols that passed the listing heuristic
    pub candidates: usize,
    /// Positions opened this cycle
    pub opened: usize,
    pub monitor: MonitorReport,
}
