//! API route handlers

pub mod auto_trading;
pub mod telegram;
