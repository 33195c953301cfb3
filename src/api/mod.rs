//! HTTP surface for the listing bot
//!
//! Telegram webhook for operator commands plus a small JSON API.

pub mod commands;
pub mod routes;
pub mod server;

pub use commands::Command;
pub use server::{create_app, AppState};
