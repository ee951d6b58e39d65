//! Linear-regression price forecast.

use super::{mean, std_dev, Indicator};
use crate::types::{Forecast, TrendSignal};

/// Forecast change (percent) beyond which the trend is called.
const TREND_THRESHOLD_PCT: f64 = 5.0;

/// Least-squares fit of a line through `(index, value)` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Fit `values` against their indices. None for fewer than two points.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let n_f = n as f64;

        let sum_x: f64 = (0..n).map(|i| i as f64).sum();
        let sum_y: f64 = values.iter().sum();
        let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
        let sum_xx: f64 = (0..n).map(|i| (i as f64).powi(2)).sum();

        let denominator = n_f * sum_xx - sum_x * sum_x;
        if denominator == 0.0 {
            return None;
        }

        let slope = (n_f * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n_f;

        let y_mean = sum_y / n_f;
        let ss_res: f64 = values
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
            .sum();
        let ss_tot: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();

        // A flat series is fitted exactly by a flat line.
        let r_squared = if ss_tot == 0.0 {
            1.0
        } else {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Value of the fitted line at `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Linear-regression forecast with an R²- and volatility-based confidence.
///
/// The line is fitted over the whole series and extrapolated to
/// `len - 1 + days_ahead`. Volatility is the Bollinger-window deviation
/// (stddev / mean of the last `window` closes, in percent) and discounts the
/// confidence: `R² * (1 - min(volatility / 50, 0.5))`.
pub struct LinearForecast {
    days_ahead: usize,
    window: usize,
}

impl Default for LinearForecast {
    fn default() -> Self {
        Self {
            days_ahead: 7,
            window: 20,
        }
    }
}

impl LinearForecast {
    pub fn new(days_ahead: usize, window: usize) -> Self {
        Self { days_ahead, window }
    }

    /// Classify a forecast change percentage.
    pub fn classify(change_percent: f64) -> TrendSignal {
        if change_percent > TREND_THRESHOLD_PCT {
            TrendSignal::Bullish
        } else if change_percent < -TREND_THRESHOLD_PCT {
            TrendSignal::Bearish
        } else {
            TrendSignal::Neutral
        }
    }
}

impl Indicator for LinearForecast {
    type Output = Forecast;

    fn min_periods(&self) -> usize {
        self.window.max(2)
    }

    fn calculate(&self, closes: &[f64]) -> Option<Forecast> {
        if closes.len() < self.min_periods() {
            return None;
        }

        let fit = LinearFit::fit(closes)?;

        let recent = &closes[closes.len() - self.window.max(2)..];
        let band_mean = mean(recent)?;
        if band_mean <= 0.0 {
            return None;
        }
        let volatility = std_dev(recent, band_mean) / band_mean * 100.0;

        let current_price = *closes.last()?;
        if current_price == 0.0 {
            return None;
        }

        let future_index = (closes.len() - 1 + self.days_ahead) as f64;
        let price = fit.at(future_index);
        let change_percent = (price - current_price) / current_price * 100.0;

        let confidence =
            (fit.r_squared * (1.0 - (volatility / 50.0).min(0.5))).clamp(0.0, 1.0);

        Some(Forecast {
            price,
            change_percent,
            confidence,
            r_squared: fit.r_squared,
            volatility,
            trend: Self::classify(change_percent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_perfect_line() {
        let values: Vec<f64> = (0..10).map(|i| 3.0 + 2.0 * i as f64).collect();
        let fit = LinearFit::fit(&values).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 3.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_needs_two_points() {
        assert!(LinearFit::fit(&[1.0]).is_none());
    }

    #[test]
    fn test_forecast_insufficient_data() {
        let closes: Vec<f64> = (0..19).map(|i| 100.0 + i as f64).collect();
        assert!(LinearForecast::default().calculate(&closes).is_none());
    }

    #[test]
    fn test_forecast_strong_uptrend() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + 3.0 * i as f64).collect();
        let forecast = LinearForecast::default().calculate(&closes).unwrap();
        // 187 → 208: +11.2%
        assert!((forecast.price - 208.0).abs() < 1e-6);
        assert_eq!(forecast.trend, TrendSignal::Bullish);
        assert!(forecast.confidence > 0.5 && forecast.confidence <= 1.0);
    }

    #[test]
    fn test_forecast_downtrend() {
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - 4.0 * i as f64).collect();
        let forecast = LinearForecast::default().calculate(&closes).unwrap();
        assert!(forecast.change_percent < -5.0);
        assert_eq!(forecast.trend, TrendSignal::Bearish);
    }

    #[test]
    fn test_forecast_flat_series() {
        let forecast = LinearForecast::default().calculate(&[10.0; 25]).unwrap();
        assert_eq!(forecast.trend, TrendSignal::Neutral);
        assert!(forecast.change_percent.abs() < 1e-9);
        assert_eq!(forecast.confidence, 1.0);
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(LinearForecast::classify(5.0), TrendSignal::Neutral);
        assert_eq!(LinearForecast::classify(5.01), TrendSignal::Bullish);
        assert_eq!(LinearForecast::classify(-5.01), TrendSignal::Bearish);
    }
}
