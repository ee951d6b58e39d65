//! Relative Strength Index (RSI) indicator.

use super::Indicator;
use crate::types::RsiMethod;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
///
/// The two methods give materially different values on the same input and are
/// not interchangeable; pick one per deployment.
pub struct Rsi {
    period: usize,
    method: RsiMethod,
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            period: 14,
            method: RsiMethod::Simple,
        }
    }
}

impl Rsi {
    pub fn new(period: usize, method: RsiMethod) -> Self {
        Self { period, method }
    }

    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return 100.0;
        }
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }

    /// Sum gains and losses over the last `period` transitions.
    fn simple(closes: &[f64], period: usize) -> f64 {
        let window = &closes[closes.len() - period - 1..];
        let (gains, losses) = window
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold((0.0, 0.0), |(g, l), change| {
                if change > 0.0 {
                    (g + change, l)
                } else {
                    (g, l - change)
                }
            });
        Self::from_averages(gains, losses)
    }

    /// Wilder smoothing across the whole series.
    fn wilder(closes: &[f64], period: usize) -> f64 {
        let mut gains = Vec::with_capacity(closes.len() - 1);
        let mut losses = Vec::with_capacity(closes.len() - 1);

        for w in closes.windows(2) {
            let change = w[1] - w[0];
            if change > 0.0 {
                gains.push(change);
                losses.push(0.0);
            } else {
                gains.push(0.0);
                losses.push(-change);
            }
        }

        // Calculate initial averages
        let mut avg_gain: f64 = gains.iter().take(period).sum::<f64>() / period as f64;
        let mut avg_loss: f64 = losses.iter().take(period).sum::<f64>() / period as f64;

        for i in period..gains.len() {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        }

        Self::from_averages(avg_gain, avg_loss)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, closes: &[f64]) -> Option<f64> {
        if self.period == 0 || closes.len() < self.min_periods() {
            return None;
        }

        let rsi = match self.method {
            RsiMethod::Simple => Self::simple(closes, self.period),
            RsiMethod::Wilder => Self::wilder(closes, self.period),
        };

        if rsi.is_nan() {
            None
        } else {
            Some(rsi.clamp(0.0, 100.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64 * 1.5).collect()
    }

    fn downtrend(count: usize) -> Vec<f64> {
        (0..count).map(|i| 200.0 - i as f64 * 1.5).collect()
    }

    #[test]
    fn test_rsi_min_periods() {
        assert_eq!(Rsi::default().min_periods(), 15);
        assert_eq!(Rsi::new(7, RsiMethod::Wilder).min_periods(), 8);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        for period in 1..20 {
            for method in [RsiMethod::Simple, RsiMethod::Wilder] {
                let rsi = Rsi::new(period, method);
                assert!(rsi.calculate(&uptrend(period)).is_none());
            }
        }
    }

    #[test]
    fn test_rsi_zero_period() {
        assert!(Rsi::new(0, RsiMethod::Simple).calculate(&uptrend(10)).is_none());
    }

    #[test]
    fn test_rsi_uptrend_is_100() {
        let value = Rsi::default().calculate(&uptrend(30)).unwrap();
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_rsi_downtrend_low_value() {
        for method in [RsiMethod::Simple, RsiMethod::Wilder] {
            let value = Rsi::new(14, method).calculate(&downtrend(50)).unwrap();
            assert!(value < 50.0, "RSI in downtrend should be < 50, got {}", value);
        }
    }

    #[test]
    fn test_simple_rsi_only_looks_at_window() {
        // Crash early, then 14 flat-or-rising transitions.
        let mut closes = vec![200.0, 100.0];
        closes.extend((0..14).map(|i| 100.0 + i as f64));
        let simple = Rsi::new(14, RsiMethod::Simple).calculate(&closes).unwrap();
        let wilder = Rsi::new(14, RsiMethod::Wilder).calculate(&closes).unwrap();
        assert_eq!(simple, 100.0);
        assert!(wilder < 100.0);
    }

    #[test]
    fn test_simple_rsi_known_value() {
        // Gains 2 + 2 = 4, losses 1 + 1 = 2 → RS = 2 → RSI = 66.67
        let closes = [10.0, 12.0, 11.0, 13.0, 12.0];
        let value = Rsi::new(4, RsiMethod::Simple).calculate(&closes).unwrap();
        assert!((value - 200.0 / 3.0).abs() < 1e-9);
    }
}
