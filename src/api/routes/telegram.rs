//! Telegram webhook
//!
//! Telegram posts updates to `/<bot token>`. Anything that is not a known
//! command, including a body that does not parse, is acknowledged with 200
//! and dropped, so Telegram never redelivers it.

use crate::api::commands::Command;
use crate::api::server::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{debug, error, warn};

#[derive(Debug, Deserialize)]
pub struct Update {
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// POST /:token - receive one Telegram update
pub async fn webhook(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> StatusCode {
    if state.config.telegram_bot_token.as_deref() != Some(token.as_str()) {
        warn!("[Control] Webhook hit with unknown token");
        return StatusCode::NOT_FOUND;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            debug!("[Control] Ignoring unparseable update: {}", e);
            return StatusCode::OK;
        }
    };

    let Some(message) = update.message else {
        return StatusCode::OK;
    };
    let Some(command) = message.text.as_deref().and_then(Command::parse) else {
        return StatusCode::OK;
    };

    match command.execute(&state.control).await {
        Ok(reply) => state.notifier.send(Some(message.chat.id.to_string()), reply),
        Err(e) => error!("[Control] Command failed: {:#}", e),
    }

    StatusCode::OK
}
