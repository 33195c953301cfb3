//! Background services for the listing bot

pub mod auto_trader;
pub mod control;
pub mod metrics;

pub use auto_trader::{
    AutoBuyer, AutoSeller, EngineState, ExitReason, ExitTrigger, ListingScanner, PositionMonitor,
    RuntimeConfig, TradingEngine,
};
pub use control::{ControlChannel, ControlError, StatusReport};
pub use metrics::{Metrics, MetricsSnapshot};
