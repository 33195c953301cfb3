//! Exchange API error differentiation
//!
//! Parses MEXC REST error responses into structured types so the engine can
//! log, notify and move on without inspecting raw bodies.

use serde::Deserialize;
use thiserror::Error;

/// Structured gateway failures. Never fatal to the engine.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Request exceeded the per-call timeout
    #[error("request timed out")]
    Timeout,
    /// Connection/transport failure
    #[error("network error: {0}")]
    Network(String),
    /// Rate limited by the exchange
    #[error("rate limited by exchange")]
    RateLimited,
    /// API key/signature rejected
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    /// Not enough quote or base balance for the order
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),
    /// Order refused by the exchange; body kept for diagnostics
    #[error("order rejected: {body}")]
    Rejected { body: String },
    /// Response arrived but lacked the expected data
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Any other API error with status code and body
    #[error("exchange error {status}: {body}")]
    Api { status: u16, body: String },
}

/// MEXC error response format
#[derive(Debug, Deserialize)]
struct MexcErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
}

impl GatewayError {
    /// Parse a non-success API response into a structured error
    pub fn from_response(status: u16, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<MexcErrorResponse>(body) {
            Ok(parsed) => (parsed.code, parsed.msg.unwrap_or_else(|| body.to_string())),
            Err(_) => (None, body.to_string()),
        };

        let msg_lower = message.to_lowercase();

        if status == 429 || msg_lower.contains("too many requests") || msg_lower.contains("rate limit") {
            return GatewayError::RateLimited;
        }

        // 700001-700003: api key / signature / timestamp problems
        if status == 401
            || status == 403
            || matches!(code, Some(700001..=700003))
            || msg_lower.contains("signature")
            || msg_lower.contains("api key")
        {
            return GatewayError::AuthenticationFailed(message);
        }

        if msg_lower.contains("insufficient") || msg_lower.contains("oversold") || code == Some(30004) {
            return GatewayError::InsufficientBalance(message);
        }

        GatewayError::Api {
            status,
            body: body.to_string(),
        }
    }

    /// Parse a transport error
    pub fn from_network_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_connect() {
            GatewayError::Network("connection failed".to_string())
        } else if err.is_decode() {
            GatewayError::Malformed(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }

    /// Whether the condition is likely to clear on its own by the next cycle
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout | GatewayError::Network(_) | GatewayError::RateLimited
        ) || matches!(self, GatewayError::Api { status, .. } if *status >= 500)
    }
}
