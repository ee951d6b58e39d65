use super::{excerpt, MarketDataProvider};
use crate::error::{AppError, Result};
use crate::types::MarketSnapshot;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
const COINGECKO_PRO_API_URL: &str = "https://pro-api.coingecko.com/api/v3";
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// One row of `/coins/markets`.
#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    symbol: String,
    #[serde(default)]
    name: String,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap_rank: Option<u32>,
}

impl From<CoinGeckoMarket> for MarketSnapshot {
    fn from(m: CoinGeckoMarket) -> Self {
        MarketSnapshot {
            symbol: m.symbol.to_uppercase(),
            name: m.name,
            market_cap: m.market_cap.unwrap_or(0.0),
            volume_24h: m.total_volume.unwrap_or(0.0),
            price_change_24h: m.price_change_percentage_24h.unwrap_or(0.0),
            rank: m.market_cap_rank,
        }
    }
}

/// CoinGecko REST client.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("coinscope/0.1 (Crypto Market Scanner)")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    fn base_url(&self) -> &str {
        if self.api_key.is_some() {
            COINGECKO_PRO_API_URL
        } else {
            COINGECKO_API_URL
        }
    }

    fn markets_url(&self, page: u32, per_page: u32) -> String {
        let mut url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page={}&sparkline=false",
            self.base_url(),
            per_page,
            page
        );
        if let Some(ref key) = self.api_key {
            url.push_str(&format!("&x_cg_pro_api_key={}", key));
        }
        url
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn top_markets(&self, page: u32, per_page: u32) -> Result<Vec<MarketSnapshot>> {
        let response = self
            .client
            .get(self.markets_url(page, per_page))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "CoinGecko API returned {}: {}",
                status,
                excerpt(&text)
            );
            return Err(AppError::ExternalApi(format!("CoinGecko API error: {}", status)));
        }

        let markets: Vec<CoinGeckoMarket> = response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("coins/markets: {}", e)))?;

        debug!("CoinGecko page {}: {} coins", page, markets.len());
        Ok(markets.into_iter().map(MarketSnapshot::from).collect())
    }
}
