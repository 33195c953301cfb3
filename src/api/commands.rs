//! Telegram text commands
//!
//! Parsing is pure; execution goes through the control boundary and returns
//! the reply text.

use crate::services::control::ControlChannel;
use anyhow::Result;

pub const HELP_TEXT: &str = "/status\n/positions\n/pause\n/resume\n/setbuy 5\n/settarget 10";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Positions,
    Pause,
    Resume,
    /// Raw argument, `None` when missing
    SetBuy(Option<String>),
    SetTarget(Option<String>),
}

impl Command {
    /// Parse a message. Returns `None` for anything that is not a known command.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?;
        let name = head.strip_prefix('/')?;
        // "/status@my_bot" in group chats
        let name = name.split('@').next().unwrap_or(name);
        let arg = parts.next().map(str::to_string);

        match name.to_lowercase().as_str() {
            "help" | "start" => Some(Command::Help),
            "status" => Some(Command::Status),
            "positions" => Some(Command::Positions),
            "pause" => Some(Command::Pause),
            "resume" => Some(Command::Resume),
            "setbuy" => Some(Command::SetBuy(arg)),
            "settarget" => Some(Command::SetTarget(arg)),
            _ => None,
        }
    }

    /// Run the command and build the reply
    pub async fn execute(self, control: &ControlChannel) -> Result<String> {
        let reply = match self {
            Command::Help => HELP_TEXT.to_string(),
            Command::Status => {
                let status = control.status().await?;
                format!(
                    "State: {}\nBuy: {} USDT\nTarget: {}x\nOpen: {}",
                    status.state_label(),
                    status.settings.buy_quote_amount,
                    status.settings.target_multiplier,
                    status.open_positions
                )
            }
            Command::Positions => {
                let positions = control.positions().await?;
                if positions.is_empty() {
                    "No open positions".to_string()
                } else {
                    positions
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::Pause => {
                control.set_trading_enabled(false);
                "⏸ Trading paused".to_string()
            }
            Command::Resume => {
                control.set_trading_enabled(true);
                "▶️ Trading resumed".to_string()
            }
            Command::SetBuy(arg) => match arg.map(|raw| control.set_buy_quote_amount(&raw)) {
                Some(Ok(amount)) => format!("Buy set to {} USDT", amount),
                _ => "Usage: /setbuy 5".to_string(),
            },
            Command::SetTarget(arg) => match arg.map(|raw| control.set_target_multiplier(&raw)) {
                Some(Ok(multiplier)) => format!("Target set to {}x", multiplier),
                _ => "Usage: /settarget 10".to_string(),
            },
        };

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::services::auto_trader::RuntimeConfig;
    use crate::types::Position;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/status"), Some(Command::Status));
        assert_eq!(Command::parse("/status@listing_bot"), Some(Command::Status));
        assert_eq!(Command::parse("  /PAUSE "), Some(Command::Pause));
        assert_eq!(
            Command::parse("/setbuy 5"),
            Some(Command::SetBuy(Some("5".to_string())))
        );
        assert_eq!(Command::parse("/settarget"), Some(Command::SetTarget(None)));
    }

    #[test]
    fn test_unknown_text_ignored() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/moon"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[tokio::test]
    async fn test_execute_replies() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let runtime = Arc::new(RuntimeConfig::new(true, dec!(1), dec!(10)));
        let control = ControlChannel::new(db.clone(), runtime.clone());

        let reply = Command::SetBuy(Some("x".to_string())).execute(&control).await.unwrap();
        assert_eq!(reply, "Usage: /setbuy 5");
        let reply = Command::SetTarget(None).execute(&control).await.unwrap();
        assert_eq!(reply, "Usage: /settarget 10");

        let reply = Command::SetTarget(Some("4".to_string())).execute(&control).await.unwrap();
        assert_eq!(reply, "Target set to 4x");
        assert_eq!(runtime.target_multiplier(), dec!(4));

        Command::Pause.execute(&control).await.unwrap();
        let reply = Command::Status.execute(&control).await.unwrap();
        assert!(reply.starts_with("State: PAUSED"));

        let reply = Command::Positions.execute(&control).await.unwrap();
        assert_eq!(reply, "No open positions");

        db.upsert_position(&Position {
            symbol: "ABCUSDT".to_string(),
            quantity: dec!(50),
            entry_price: dec!(0.02),
            entry_time: Utc::now(),
            high_price: dec!(0.02),
        })
        .await
        .unwrap();
        let reply = Command::Positions.execute(&control).await.unwrap();
        assert_eq!(reply, "ABCUSDT | qty=50 | entry=0.02");
    }
}
