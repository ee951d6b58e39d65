use super::TrendSignal;
use serde::{Deserialize, Serialize};

/// Result of scoring one batch of news articles for a keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAnalysis {
    /// Net polarity across all articles.
    pub score: f64,
    /// Article count reported by the news provider.
    pub mentions: u64,
    /// Verdict string, e.g. "BULLISH".
    pub verdict: String,
}

/// One entry of the cached sentiment history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentRecord {
    pub symbol: String,
    /// Unix timestamp (milliseconds) when the analysis was taken.
    #[serde(default)]
    pub timestamp: i64,
    pub analysis: SentimentAnalysis,
}

/// Aggregated news sentiment for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSnapshot {
    pub symbol: String,
    /// Running average of net polarity.
    pub sentiment_score: f64,
    /// Running average mention count, rounded.
    pub mentions: u64,
    /// Verdict of the most recent record.
    pub sentiment: TrendSignal,
}
