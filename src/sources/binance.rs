use super::{excerpt, PriceHistoryProvider};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";
const REQUEST_TIMEOUT_SECS: u64 = 5;
const QUOTE_ASSET: &str = "USDT";
/// Position of the close price inside a kline row.
const KLINE_CLOSE_INDEX: usize = 4;

/// Binance REST client for daily klines.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(base_url: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("coinscope/0.1")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url
                .unwrap_or_else(|| BINANCE_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Trading pair for a bare symbol, e.g. `sol` -> `SOLUSDT`.
    pub fn pair(symbol: &str) -> String {
        let upper = symbol.trim().to_uppercase();
        if upper.ends_with(QUOTE_ASSET) {
            upper
        } else {
            format!("{}{}", upper, QUOTE_ASSET)
        }
    }
}

/// Extract closes from a klines payload (an array of arrays whose fifth
/// element is the close as a decimal string).
pub fn parse_closes(rows: &[Vec<Value>]) -> Result<Vec<f64>> {
    rows.iter()
        .map(|row| {
            let raw = row.get(KLINE_CLOSE_INDEX).ok_or_else(|| {
                AppError::MalformedResponse(format!("kline row has {} fields", row.len()))
            })?;
            let close = match raw {
                Value::String(s) => s.parse::<f64>().ok(),
                Value::Number(n) => n.as_f64(),
                _ => None,
            };
            close
                .filter(|c| c.is_finite())
                .ok_or_else(|| AppError::MalformedResponse(format!("bad close value {}", raw)))
        })
        .collect()
}

#[async_trait]
impl PriceHistoryProvider for BinanceClient {
    async fn daily_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>> {
        let pair = Self::pair(symbol);
        let url = format!(
            "{}/klines?symbol={}&interval=1d&limit={}",
            self.base_url, pair, limit
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance API returned {} for {}: {}",
                status,
                pair,
                excerpt(&text)
            );
            // Unknown pairs come back as 400; retrying will not help.
            if status.is_client_error() && status.as_u16() != 429 {
                return Err(AppError::MalformedResponse(format!(
                    "Binance rejected {}: {}",
                    pair, status
                )));
            }
            return Err(AppError::ExternalApi(format!("Binance API error: {}", status)));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("klines for {}: {}", pair, e)))?;
        let closes = parse_closes(&rows)?;
        debug!("Binance: {} closes for {}", closes.len(), pair);
        Ok(closes)
    }
}
