//! External data providers.

pub mod binance;
pub mod coingecko;
pub mod newsdata;

pub use binance::BinanceClient;
pub use coingecko::CoinGeckoClient;
pub use newsdata::NewsDataClient;

use crate::error::Result;
use crate::types::MarketSnapshot;
use async_trait::async_trait;

/// First 200 characters of an error body, for logging.
pub(crate) fn excerpt(text: &str) -> String {
    text.chars().take(200).collect()
}

/// Daily close history for one symbol.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Up to `limit` daily closes, oldest first. Fewer bars than requested is
    /// not an error.
    async fn daily_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>>;
}

/// Market-cap ranked listing.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// One page (1-based) of coins ordered by market cap.
    async fn top_markets(&self, page: u32, per_page: u32) -> Result<Vec<MarketSnapshot>>;
}

#[async_trait]
impl<T: PriceHistoryProvider + ?Sized> PriceHistoryProvider for std::sync::Arc<T> {
    async fn daily_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>> {
        (**self).daily_closes(symbol, limit).await
    }
}

#[async_trait]
impl<T: MarketDataProvider + ?Sized> MarketDataProvider for std::sync::Arc<T> {
    async fn top_markets(&self, page: u32, per_page: u32) -> Result<Vec<MarketSnapshot>> {
        (**self).top_markets(page, per_page).await
    }
}
