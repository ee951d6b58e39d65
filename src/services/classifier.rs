//! Maps indicator values to a discrete trend label.

use crate::types::{SignalRule, TrendSignal};

/// Indicator values the classifier looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierInput {
    pub rsi: Option<f64>,
    pub momentum_7d: f64,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub forecast_change: Option<f64>,
}

/// Threshold-rule trend classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalClassifier {
    rule: SignalRule,
}

impl SignalClassifier {
    pub fn new(rule: SignalRule) -> Self {
        Self { rule }
    }

    /// Bullish is checked before bearish; the first match wins.
    pub fn classify(&self, input: &ClassifierInput) -> TrendSignal {
        let Some(rsi) = input.rsi else {
            return TrendSignal::Neutral;
        };
        let m7 = input.momentum_7d;

        if self.is_bullish(rsi, m7, input) {
            TrendSignal::Bullish
        } else if rsi > 70.0 && m7 < 0.0 {
            TrendSignal::Bearish
        } else {
            TrendSignal::Neutral
        }
    }

    fn is_bullish(&self, rsi: f64, m7: f64, input: &ClassifierInput) -> bool {
        match self.rule {
            SignalRule::Baseline => rsi < 40.0 && m7 > 0.0,
            SignalRule::EmaConfirmed => {
                let ema_rising = matches!(
                    (input.ema_fast, input.ema_slow),
                    (Some(fast), Some(slow)) if fast > slow
                );
                rsi < 40.0 && m7 > 0.0 && ema_rising
            }
            SignalRule::ForecastConfirmed => {
                let forecast_up = input.forecast_change.is_some_and(|c| c > 0.0);
                (rsi < 30.0 && m7 > 0.0 && forecast_up) || (rsi < 40.0 && m7 > 0.05)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(rsi: f64, m7: f64) -> ClassifierInput {
        ClassifierInput {
            rsi: Some(rsi),
            momentum_7d: m7,
            ..Default::default()
        }
    }

    #[test]
    fn test_baseline_rules() {
        let c = SignalClassifier::default();
        assert_eq!(c.classify(&input(35.0, 0.01)), TrendSignal::Bullish);
        assert_eq!(c.classify(&input(35.0, -0.01)), TrendSignal::Neutral);
        assert_eq!(c.classify(&input(75.0, -0.01)), TrendSignal::Bearish);
        assert_eq!(c.classify(&input(75.0, 0.01)), TrendSignal::Neutral);
        assert_eq!(c.classify(&input(50.0, 0.2)), TrendSignal::Neutral);
    }

    #[test]
    fn test_missing_rsi_is_neutral() {
        let c = SignalClassifier::default();
        let i = ClassifierInput {
            rsi: None,
            momentum_7d: 0.5,
            ..Default::default()
        };
        assert_eq!(c.classify(&i), TrendSignal::Neutral);
    }

    #[test]
    fn test_ema_confirmation() {
        let c = SignalClassifier::new(SignalRule::EmaConfirmed);
        let mut i = input(35.0, 0.01);
        assert_eq!(c.classify(&i), TrendSignal::Neutral);

        i.ema_fast = Some(101.0);
        i.ema_slow = Some(100.0);
        assert_eq!(c.classify(&i), TrendSignal::Bullish);

        i.ema_fast = Some(99.0);
        assert_eq!(c.classify(&i), TrendSignal::Neutral);
    }

    #[test]
    fn test_forecast_confirmation() {
        let c = SignalClassifier::new(SignalRule::ForecastConfirmed);

        let mut deep = input(25.0, 0.01);
        assert_eq!(c.classify(&deep), TrendSignal::Neutral);
        deep.forecast_change = Some(2.0);
        assert_eq!(c.classify(&deep), TrendSignal::Bullish);

        // Mild oversold needs strong momentum.
        assert_eq!(c.classify(&input(38.0, 0.03)), TrendSignal::Neutral);
        assert_eq!(c.classify(&input(38.0, 0.06)), TrendSignal::Bullish);

        assert_eq!(c.classify(&input(80.0, -0.02)), TrendSignal::Bearish);
    }
}
