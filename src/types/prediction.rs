use super::{MarketSnapshot, SentimentSnapshot, TechnicalSnapshot};
use serde::{Deserialize, Serialize};

/// Which data drove a prediction into the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PredictionCategory {
    /// Symbol from the configured universe with price history.
    Technical,
    /// Symbol known only from the market-data feed.
    Market,
}

impl PredictionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Technical => "TECHNICAL",
            Self::Market => "MARKET",
        }
    }
}

/// Coarse bucket of the scoring engine's confidence tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Bucket a confidence value in [0, 1].
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.6 {
            Self::High
        } else if confidence > 0.3 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High confidence",
            Self::Medium => "Medium confidence",
            Self::Low => "Low confidence",
        }
    }
}

/// Output of the scoring engine for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Clamped to [0, 100].
    pub score: f64,
    /// Every rule that fired, in evaluation order.
    pub factors: Vec<String>,
    /// Clamped to [0, 1].
    pub confidence: f64,
    pub level: ConfidenceLevel,
}

/// A scored symbol with the inputs that produced the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub symbol: String,
    pub score: f64,
    pub factors: Vec<String>,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub technical: Option<TechnicalSnapshot>,
    pub sentiment: Option<SentimentSnapshot>,
    pub market: Option<MarketSnapshot>,
    pub category: PredictionCategory,
}

impl Prediction {
    /// Assemble a prediction from its inputs and the engine's verdict.
    pub fn new(
        symbol: String,
        result: ScoreResult,
        technical: Option<TechnicalSnapshot>,
        sentiment: Option<SentimentSnapshot>,
        market: Option<MarketSnapshot>,
        category: PredictionCategory,
    ) -> Self {
        Self {
            symbol,
            score: result.score,
            factors: result.factors,
            confidence: result.confidence,
            confidence_level: result.level,
            technical,
            sentiment,
            market,
            category,
        }
    }

    /// Forecast change in percent, when a forecast exists.
    pub fn forecast_percent(&self) -> Option<f64> {
        self.technical
            .as_ref()
            .and_then(|t| t.forecast.as_ref())
            .map(|f| f.change_percent)
    }
}

/// Renderer contract: one row of a ranked report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub symbol: String,
    pub score: f64,
    pub category: PredictionCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_percent: Option<f64>,
    pub factors: Vec<String>,
}

impl ReportRow {
    pub fn from_prediction(rank: usize, prediction: &Prediction) -> Self {
        Self {
            rank,
            symbol: prediction.symbol.clone(),
            score: prediction.score,
            category: prediction.category,
            forecast_percent: prediction.forecast_percent(),
            factors: prediction.factors.clone(),
        }
    }
}
