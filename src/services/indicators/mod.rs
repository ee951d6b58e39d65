//! Technical indicator implementations.
//!
//! Every indicator works on daily closes ordered oldest-first and returns
//! `None` when the series is too short, never panicking on short input.

pub mod ema;
pub mod macd;
pub mod momentum;
pub mod regression;
pub mod rsi;
pub mod volatility;

pub use ema::Ema;
pub use macd::Macd;
pub use momentum::Momentum;
pub use regression::LinearForecast;
pub use rsi::Rsi;
pub use volatility::Volatility;

/// Trait for implementing technical indicators over a close series.
pub trait Indicator {
    type Output;

    /// Minimum number of closes required for calculation.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator from closes.
    /// Returns None if insufficient data or calculation fails.
    fn calculate(&self, closes: &[f64]) -> Option<Self::Output>;
}

/// Arithmetic mean, or None for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation around `mean`.
pub(crate) fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
