//! Auto-trading service module
//!
//! Provides the position lifecycle:
//! - Listing discovery for freshly listed symbols
//! - Auto-buying discovered listings
//! - Position monitoring for target/trailing-stop/timeout exits
//! - The engine loop tying them together

pub mod auto_buyer;
pub mod auto_seller;
pub mod config;
pub mod engine;
pub mod listing_scanner;
pub mod position_monitor;
pub mod types;

pub use auto_buyer::AutoBuyer;
pub use auto_seller::AutoSeller;
pub use config::{RuntimeConfig, RuntimeSnapshot, UpdateSettingsRequest};
pub use engine::{EngineState, TradingEngine};
pub use listing_scanner::{is_fresh_listing, ListingScanner};
pub use position_monitor::{evaluate_exit, ExitRules, PositionMonitor};
pub use types::{CycleReport, ExitReason, ExitTrigger, MonitorReport};
