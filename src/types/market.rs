use serde::{Deserialize, Serialize};

/// Market-cap data for one coin, as reported by the market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Upper-case ticker symbol.
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub market_cap: f64,
    pub volume_24h: f64,
    /// 24h price change in percent.
    pub price_change_24h: f64,
    /// Market-cap rank; absent for unranked coins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl MarketSnapshot {
    /// 24h volume relative to market cap, when market cap is known.
    pub fn volume_ratio(&self) -> Option<f64> {
        if self.market_cap > 0.0 {
            Some(self.volume_24h / self.market_cap)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_ratio() {
        let snapshot = MarketSnapshot {
            symbol: "BTC".to_string(),
            name: "Bitcoin".to_string(),
            market_cap: 1_000.0,
            volume_24h: 120.0,
            price_change_24h: 1.0,
            rank: Some(1),
        };
        assert_eq!(snapshot.volume_ratio(), Some(0.12));

        let unknown_cap = MarketSnapshot {
            market_cap: 0.0,
            ..snapshot
        };
        assert_eq!(unknown_cap.volume_ratio(), None);
    }
}
