use super::ReportRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one ranking run as stored in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    /// One formatted line per ranked coin.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_coins: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top3: Vec<String>,
    /// Structured form of `all_coins`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranked: Vec<ReportRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    /// A successful run with its ranked rows and their formatted lines.
    pub fn success(ranked: Vec<ReportRow>, all_coins: Vec<String>) -> Self {
        let top3 = all_coins.iter().take(3).cloned().collect();
        Self {
            timestamp: Utc::now(),
            success: true,
            all_coins,
            top3,
            ranked,
            error: None,
        }
    }

    /// A failed run.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            success: false,
            all_coins: Vec::new(),
            top3: Vec::new(),
            ranked: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Symbol ranked first, if the run succeeded with any result.
    pub fn top_symbol(&self) -> Option<&str> {
        self.ranked.first().map(|r| r.symbol.as_str())
    }
}

/// One record of the append-only prediction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub result: RunResult,
}

impl HistoryEntry {
    pub fn new(result: RunResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            result,
        }
    }
}

/// Per-symbol statistics over a span of history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinStats {
    pub symbol: String,
    /// Number of runs the symbol was ranked in.
    pub appearances: u32,
    pub avg_score: f64,
    pub max_score: f64,
    pub min_score: f64,
}
