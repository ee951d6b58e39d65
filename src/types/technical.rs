use super::TrendSignal;
use serde::{Deserialize, Serialize};

/// MACD line, signal line and histogram at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdSnapshot {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Linear-regression price forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Extrapolated price `days_ahead` bars past the latest close.
    pub price: f64,
    /// Forecast change relative to the latest close, in percent.
    pub change_percent: f64,
    /// Fit quality discounted by volatility, in [0, 1].
    pub confidence: f64,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
    /// Bollinger-window volatility (stddev / mean), in percent.
    pub volatility: f64,
    pub trend: TrendSignal,
}

/// Indicator values computed for one symbol during a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub symbol: String,
    /// Latest close.
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    /// Fractional 7-bar change.
    pub momentum_7d: f64,
    /// Fractional 30-bar change.
    pub momentum_30d: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_fast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_slow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdSnapshot>,
    /// Standard deviation of daily returns, in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
    pub signal: TrendSignal,
    /// Forecast confidence, or 0 without a forecast.
    pub data_quality: f64,
}
