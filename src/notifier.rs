//! Operator notifications
//!
//! Delivery is fire-and-forget: callers never wait on, or see failures of,
//! a notification.

use crate::config::TelegramApi;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info};

/// Best-effort delivery of human-readable event text
pub trait Notifier: Send + Sync {
    /// Send `text` to `chat_id`, or to the default operator chat
    fn send(&self, chat_id: Option<String>, text: String);

    /// Send to the default operator chat
    fn notify(&self, text: String) {
        self.send(None, text);
    }
}

/// Telegram bot client for engine events and command replies
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    send_url: String,
    default_chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, default_chat_id: Option<String>, timeout: Duration) -> Self {
        Self::with_url(TelegramApi::send_message_url(bot_token), default_chat_id, timeout)
    }

    /// Build against an explicit `sendMessage` URL
    pub fn with_url(send_url: String, default_chat_id: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build Telegram client ({}), using defaults", e);
                Client::new()
            });

        Self {
            client,
            send_url,
            default_chat_id,
        }
    }

    /// Deliver one message, logging any failure
    pub async fn send_message(&self, chat_id: &str, text: &str) {
        let payload = json!({ "chat_id": chat_id, "text": text });

        match self.client.post(&self.send_url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    debug!("Telegram message sent to {}", chat_id);
                } else {
                    error!("Telegram sendMessage failed: {}", response.status());
                }
            }
            Err(e) => {
                error!("Failed to send Telegram message: {}", e);
            }
        }
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, chat_id: Option<String>, text: String) {
        let Some(chat_id) = chat_id.or_else(|| self.default_chat_id.clone()) else {
            info!("[Notify] (no chat configured) {}", text);
            return;
        };

        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.send_message(&chat_id, &text).await;
        });
    }
}

/// Writes notifications to the log when no Telegram bot is configured
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, chat_id: Option<String>, text: String) {
        match chat_id {
            Some(chat) => info!("[Notify:{}] {}", chat, text),
            None => info!("[Notify] {}", text),
        }
    }
}
