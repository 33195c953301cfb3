//! MEXC spot REST client
//!
//! Public market data is unauthenticated. Orders are signed with
//! HMAC-SHA256 over the query string and carry the key in `X-MEXC-APIKEY`.

use super::{GatewayError, MarketGateway};
use crate::config::{Config, MexcApi};
use crate::types::{Candle, Fill};
use anyhow::{Context, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

type HmacSha256 = Hmac<Sha256>;

/// Status values MEXC reports for symbols open to trading
const TRADING_STATUSES: [&str; 2] = ["TRADING", "1"];

/// Raw exchange info response
#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    #[serde(default)]
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// Signed REST client for MEXC spot
pub struct MexcClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
    quote_asset: String,
}

impl MexcClient {
    /// Build a client from configuration. Fails without API credentials.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("MEXC_API_KEY required for live trading")?;
        let secret_key = config
            .secret_key
            .clone()
            .context("MEXC_SECRET_KEY required for live trading")?;

        Self::with_credentials(
            &config.base_url,
            api_key,
            secret_key,
            &config.engine.quote_asset,
            config.request_timeout(),
        )
    }

    pub fn with_credentials(
        base_url: &str,
        api_key: String,
        secret_key: String,
        quote_asset: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            secret_key,
            quote_asset: quote_asset.to_string(),
        })
    }

    /// Hex-encoded HMAC-SHA256 of `message` under the secret key
    fn sign(&self, message: &str) -> String {
        // HMAC accepts keys of any length, so this cannot fail
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Query string with timestamp and signature appended, order preserved
    fn signed_query(&self, params: &[(&str, String)], timestamp_ms: i64) -> String {
        let mut parts: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        parts.push(format!("timestamp={}", timestamp_ms));

        let query = parts.join("&");
        let signature = self.sign(&query);
        format!("{}&signature={}", query, signature)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::from_network_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from_network_error(&e))?;

        if !status.is_success() {
            return Err(GatewayError::from_response(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::Malformed(format!("{}: {}", path, e)))
    }

    /// Submit a signed market order and return the parsed response body
    async fn post_order(&self, params: &[(&str, String)]) -> Result<Value, GatewayError> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let url = format!(
            "{}{}?{}",
            self.base_url,
            MexcApi::ORDER,
            self.signed_query(params, timestamp_ms)
        );

        let response = self
            .client
            .post(&url)
            .header("X-MEXC-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| GatewayError::from_network_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from_network_error(&e))?;

        if !status.is_success() {
            return Err(GatewayError::from_response(status.as_u16(), &body));
        }

        // A 2xx body that is not JSON is still an accepted order
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[async_trait]
impl MarketGateway for MexcClient {
    async fn tradable_symbols(&self) -> Result<HashSet<String>, GatewayError> {
        let info: ExchangeInfo = self.get_json(MexcApi::EXCHANGE_INFO, &[]).await?;

        let symbols: HashSet<String> = info
            .symbols
            .into_iter()
            .filter(|s| TRADING_STATUSES.contains(&s.status.as_str()))
            .filter(|s| s.symbol.ends_with(&self.quote_asset))
            .map(|s| s.symbol)
            .collect();

        debug!("Fetched {} tradable {} symbols", symbols.len(), self.quote_asset);
        Ok(symbols)
    }

    async fn recent_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, GatewayError> {
        let rows: Vec<Vec<Value>> = self
            .get_json(
                MexcApi::KLINES,
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        rows.iter().map(|row| parse_kline(row)).collect()
    }

    async fn current_price(&self, symbol: &str) -> Result<Decimal, GatewayError> {
        let ticker: TickerPrice = self
            .get_json(MexcApi::TICKER_PRICE, &[("symbol", symbol.to_string())])
            .await?;

        Decimal::from_str(&ticker.price)
            .map_err(|_| GatewayError::Malformed(format!("price for {}: {}", symbol, ticker.price)))
    }

    async fn market_buy(&self, symbol: &str, quote_amount: Decimal) -> Result<Fill, GatewayError> {
        info!("Submitting market buy {} for {} {}", symbol, quote_amount, self.quote_asset);

        let body = self
            .post_order(&[
                ("symbol", symbol.to_string()),
                ("side", "BUY".to_string()),
                ("type", "MARKET".to_string()),
                ("quoteOrderQty", quote_amount.normalize().to_string()),
            ])
            .await?;

        parse_buy_fill(&body)
    }

    async fn market_sell(&self, symbol: &str, quantity: Decimal) -> Result<Value, GatewayError> {
        info!("Submitting market sell {} qty {}", symbol, quantity);

        self.post_order(&[
            ("symbol", symbol.to_string()),
            ("side", "SELL".to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", quantity.normalize().to_string()),
        ])
        .await
    }
}

/// Kline row: `[openTime, open, high, low, close, volume, closeTime, quoteVolume]`
fn parse_kline(row: &[Value]) -> Result<Candle, GatewayError> {
    let field = |index: usize| {
        row.get(index)
            .and_then(value_to_decimal)
            .ok_or_else(|| GatewayError::Malformed(format!("kline field {} in {:?}", index, row)))
    };

    Ok(Candle {
        open_time: row.first().and_then(Value::as_i64).unwrap_or_default(),
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
        volume: field(5)?,
    })
}

/// Extract the fill from a 2xx order response
fn parse_buy_fill(body: &Value) -> Result<Fill, GatewayError> {
    let order_id = match body.get("orderId") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(GatewayError::Rejected {
                body: body.to_string(),
            })
        }
    };

    let quantity = body
        .get("executedQty")
        .and_then(value_to_decimal)
        .filter(|q| q.is_sign_positive() && !q.is_zero())
        .ok_or_else(|| GatewayError::Malformed(format!("no executed quantity: {}", body)))?;

    let price = body
        .get("fills")
        .and_then(|fills| fills.get(0))
        .and_then(|fill| fill.get("price"))
        .and_then(value_to_decimal)
        .filter(|p| p.is_sign_positive() && !p.is_zero())
        .ok_or_else(|| GatewayError::Malformed(format!("no fill price: {}", body)))?;

    Ok(Fill {
        order_id,
        quantity,
        price,
    })
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}
