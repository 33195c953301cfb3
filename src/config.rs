//! Configuration management for the listing bot

use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Bot configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// MEXC API key (required for live trading)
    pub api_key: Option<String>,

    /// MEXC API secret used for HMAC signing
    pub secret_key: Option<String>,

    /// MEXC REST endpoint
    pub base_url: String,

    /// Telegram bot token, also the secret webhook path
    pub telegram_bot_token: Option<String>,

    /// Default chat for engine notifications
    pub telegram_chat_id: Option<String>,

    /// Path to SQLite database
    pub database_path: String,

    /// Address the webhook/API server listens on
    pub bind_addr: String,

    /// Whether trading starts enabled
    pub trading_enabled: bool,

    /// Quote currency spent per buy (USDT)
    pub buy_quote_amount: Decimal,

    /// Exit when price reaches entry * target_multiplier
    pub target_multiplier: Decimal,

    /// Per-call timeout for exchange requests
    pub request_timeout_secs: u64,

    /// Per-message timeout for Telegram notifications
    pub notify_timeout_secs: u64,

    /// Engine cadence and exit rules
    pub engine: EngineConfig,
}

/// Fixed engine parameters. Not changeable at runtime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Kline interval used for the listing heuristic
    pub candle_interval: String,
    /// Number of klines that must all be flat
    pub candle_limit: u32,
    /// Only symbols quoted in this asset are tradable
    pub quote_asset: String,
    /// Trailing stop distance below the high-water mark (0.15 = 15%)
    pub trail_fraction: Decimal,
    /// Maximum hold time before a forced exit
    pub max_hold_secs: u64,
    /// Sleep between running cycles
    pub cycle_interval_secs: u64,
    /// Sleep between checks while paused
    pub pause_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candle_interval: "1m".to_string(),
            candle_limit: 5,
            quote_asset: "USDT".to_string(),
            trail_fraction: dec!(0.15),
            max_hold_secs: 7 * 60,
            cycle_interval_secs: 20,
            pause_interval_secs: 2,
        }
    }
}

impl EngineConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn pause_interval(&self) -> Duration {
        Duration::from_secs(self.pause_interval_secs)
    }

    pub fn max_hold(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.max_hold_secs as i64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            secret_key: None,
            base_url: MexcApi::BASE_URL.to_string(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            database_path: "positions.db".to_string(),
            bind_addr: "0.0.0.0:5000".to_string(),
            trading_enabled: true,
            buy_quote_amount: dec!(1.0),
            target_multiplier: dec!(10.0),
            request_timeout_secs: 5,
            notify_timeout_secs: 10,
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let engine_defaults = EngineConfig::default();

        let api_key = non_empty("MEXC_API_KEY");
        let secret_key = non_empty("MEXC_SECRET_KEY");
        let base_url = non_empty("MEXC_BASE_URL").unwrap_or(defaults.base_url);

        let telegram_bot_token = non_empty("TELEGRAM_BOT_TOKEN");
        let telegram_chat_id = non_empty("TELEGRAM_CHAT_ID");

        let database_path = env::var("DATABASE_PATH").unwrap_or(defaults.database_path);
        let bind_addr = env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let trading_enabled = env::var("TRADING_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(defaults.trading_enabled);

        let buy_quote_amount = env_decimal("BUY_QUOTE_AMOUNT").unwrap_or(defaults.buy_quote_amount);
        let target_multiplier =
            env_decimal("TARGET_MULTIPLIER").unwrap_or(defaults.target_multiplier);

        let engine = EngineConfig {
            candle_interval: non_empty("CANDLE_INTERVAL").unwrap_or(engine_defaults.candle_interval),
            candle_limit: env_parse("CANDLE_LIMIT").unwrap_or(engine_defaults.candle_limit),
            quote_asset: non_empty("QUOTE_ASSET").unwrap_or(engine_defaults.quote_asset),
            trail_fraction: env_decimal("TRAIL_FRACTION").unwrap_or(engine_defaults.trail_fraction),
            max_hold_secs: env_parse("MAX_HOLD_SECS").unwrap_or(engine_defaults.max_hold_secs),
            cycle_interval_secs: env_parse("CYCLE_INTERVAL_SECS")
                .unwrap_or(engine_defaults.cycle_interval_secs),
            pause_interval_secs: env_parse("PAUSE_INTERVAL_SECS")
                .unwrap_or(engine_defaults.pause_interval_secs),
        };

        let config = Self {
            api_key,
            secret_key,
            base_url,
            telegram_bot_token,
            telegram_chat_id,
            database_path,
            bind_addr,
            trading_enabled,
            buy_quote_amount,
            target_multiplier,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            notify_timeout_secs: env_parse("NOTIFY_TIMEOUT_SECS")
                .unwrap_or(defaults.notify_timeout_secs),
            engine,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot trade with
    pub fn validate(&self) -> Result<()> {
        if self.buy_quote_amount <= Decimal::ZERO {
            anyhow::bail!("BUY_QUOTE_AMOUNT must be greater than 0");
        }
        if self.target_multiplier <= Decimal::ZERO {
            anyhow::bail!("TARGET_MULTIPLIER must be greater than 0");
        }
        if self.engine.trail_fraction <= Decimal::ZERO || self.engine.trail_fraction >= Decimal::ONE {
            anyhow::bail!("TRAIL_FRACTION must be between 0 and 1");
        }
        if self.engine.candle_limit == 0 {
            anyhow::bail!("CANDLE_LIMIT must be at least 1");
        }
        Ok(())
    }

    /// Check that exchange credentials are present
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.secret_key.is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_decimal(key: &str) -> Option<Decimal> {
    env::var(key).ok().and_then(|v| Decimal::from_str(v.trim()).ok())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// MEXC spot API endpoints
pub struct MexcApi;

impl MexcApi {
    pub const BASE_URL: &'static str = "https://api.mexc.com";

    pub const EXCHANGE_INFO: &'static str = "/api/v3/exchangeInfo";
    pub const KLINES: &'static str = "/api/v3/klines";
    pub const TICKER_PRICE: &'static str = "/api/v3/ticker/price";
    pub const ORDER: &'static str = "/api/v3/order";
}

/// Telegram Bot API configuration
pub struct TelegramApi;

impl TelegramApi {
    pub const BASE_URL: &'static str = "https://api.telegram.org";

    pub fn send_message_url(bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", Self::BASE_URL, bot_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.max_hold(), chrono::Duration::seconds(420));
        assert_eq!(engine.cycle_interval(), Duration::from_secs(20));
        assert_eq!(engine.trail_fraction, dec!(0.15));
        assert_eq!(engine.candle_limit, 5);
    }

    #[test]
    fn test_validate_rejects_non_positive_trading_values() {
        assert!(Config::default().validate().is_ok());

        let zero_target = Config {
            target_multiplier: Decimal::ZERO,
            ..Config::default()
        };
        assert!(zero_target.validate().is_err());

        let negative_buy = Config {
            buy_quote_amount: dec!(-1),
            ..Config::default()
        };
        assert!(negative_buy.validate().is_err());

        let mut wide_trail = Config::default();
        wide_trail.engine.trail_fraction = Decimal::ONE;
        assert!(wide_trail.validate().is_err());
    }

    #[test]
    fn test_send_message_url() {
        assert_eq!(
            TelegramApi::send_message_url("123:abc"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
