//! Builds a [`TechnicalSnapshot`] from a close series.

use crate::services::classifier::{ClassifierInput, SignalClassifier};
use crate::services::indicators::{
    Ema, Indicator, LinearForecast, Macd, Momentum, Rsi, Volatility,
};
use crate::types::{RsiMethod, SignalRule, TechnicalSnapshot};
use tracing::debug;

/// Runs the indicator library over one symbol's closes.
pub struct TechnicalAnalyzer {
    rsi: Rsi,
    ema_fast: Ema,
    ema_slow: Ema,
    macd: Macd,
    momentum_7d: Momentum,
    momentum_30d: Momentum,
    forecast: LinearForecast,
    volatility: Volatility,
    classifier: SignalClassifier,
}

impl Default for TechnicalAnalyzer {
    fn default() -> Self {
        Self::new(RsiMethod::default(), SignalRule::default())
    }
}

impl TechnicalAnalyzer {
    pub fn new(rsi_method: RsiMethod, rule: SignalRule) -> Self {
        Self {
            rsi: Rsi::new(14, rsi_method),
            ema_fast: Ema::new(12),
            ema_slow: Ema::new(26),
            macd: Macd::default(),
            momentum_7d: Momentum::new(7),
            momentum_30d: Momentum::new(30),
            forecast: LinearForecast::default(),
            volatility: Volatility,
            classifier: SignalClassifier::new(rule),
        }
    }

    /// Compute every indicator for `symbol`. Indicators without enough
    /// history are left empty. Returns None only for an empty series.
    pub fn analyze(&self, symbol: &str, closes: &[f64]) -> Option<TechnicalSnapshot> {
        let price = *closes.last()?;

        let rsi = self.rsi.calculate(closes);
        let ema_fast = self.ema_fast.calculate(closes);
        let ema_slow = self.ema_slow.calculate(closes);
        let macd = self.macd.calculate(closes);
        let momentum_7d = self.momentum_7d.value(closes);
        let momentum_30d = self.momentum_30d.value(closes);
        let forecast = self.forecast.calculate(closes);
        let volatility = self.volatility.calculate(closes);

        let signal = self.classifier.classify(&ClassifierInput {
            rsi,
            momentum_7d,
            ema_fast,
            ema_slow,
            forecast_change: forecast.map(|f| f.change_percent),
        });

        debug!(
            "{}: {} closes, rsi={:?}, m7={:.4}, signal={}",
            symbol,
            closes.len(),
            rsi,
            momentum_7d,
            signal
        );

        Some(TechnicalSnapshot {
            symbol: symbol.to_uppercase(),
            price,
            rsi,
            momentum_7d,
            momentum_30d,
            ema_fast,
            ema_slow,
            macd,
            volatility,
            forecast,
            signal,
            data_quality: forecast.map(|f| f.confidence).unwrap_or(0.0),
        })
    }
}
