use serde::{Deserialize, Serialize};

/// Discrete trend label shared by technical signals, forecasts and sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendSignal {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl TrendSignal {
    /// Parse from a verdict string, ignoring case and any trailing decoration.
    pub fn from_str(s: &str) -> Option<Self> {
        let word = s.split_whitespace().next()?.to_uppercase();
        match word.as_str() {
            "BULLISH" => Some(Self::Bullish),
            "BEARISH" => Some(Self::Bearish),
            "NEUTRAL" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
            Self::Neutral => "NEUTRAL",
        }
    }
}

impl std::fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// RSI smoothing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RsiMethod {
    /// Plain sums of gains and losses over the last `period` transitions.
    #[default]
    Simple,
    /// Wilder smoothing seeded by the first `period` transitions and carried
    /// across the whole series.
    Wilder,
}

impl RsiMethod {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "simple" | "window" => Some(Self::Simple),
            "wilder" | "smoothed" => Some(Self::Wilder),
            _ => None,
        }
    }
}

/// Rule set used to turn indicator values into a [`TrendSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalRule {
    /// RSI < 40 with positive 7d momentum is bullish; RSI > 70 with negative
    /// 7d momentum is bearish.
    #[default]
    Baseline,
    /// Baseline, but a bullish call also needs EMA(fast) above EMA(slow).
    EmaConfirmed,
    /// Deep oversold with a rising forecast, or mildly oversold with strong
    /// momentum, is bullish. Bearish as baseline.
    ForecastConfirmed,
}

impl SignalRule {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "baseline" | "basic" => Some(Self::Baseline),
            "ema" | "ema_confirmed" => Some(Self::EmaConfirmed),
            "forecast" | "forecast_confirmed" => Some(Self::ForecastConfirmed),
            _ => None,
        }
    }
}

/// How the scoring engine treats large 24h price moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PumpPolicy {
    /// Small bonus for moderate gains; moves of 15% or more are ignored.
    #[default]
    Conservative,
    /// Tiered bonus up to +40 for extreme 24h gains.
    Aggressive,
}

impl PumpPolicy {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "conservative" | "modest" => Some(Self::Conservative),
            "aggressive" | "momentum" => Some(Self::Aggressive),
            _ => None,
        }
    }
}
