//! Rate-of-change momentum.

use super::Indicator;

/// Fractional price change over the last `days` bars:
/// `(last - closes[len - 1 - days]) / closes[len - 1 - days]`.
///
/// Short history is not an error; the result is 0.
pub struct Momentum {
    days: usize,
}

impl Momentum {
    pub fn new(days: usize) -> Self {
        Self { days }
    }

    /// Momentum value with the documented zero fallback.
    pub fn value(&self, closes: &[f64]) -> f64 {
        self.calculate(closes).unwrap_or(0.0)
    }
}

impl Indicator for Momentum {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.days + 1
    }

    fn calculate(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.min_periods() {
            return None;
        }
        let last = *closes.last()?;
        let reference = closes[closes.len() - 1 - self.days];
        if reference == 0.0 {
            return None;
        }
        Some((last - reference) / reference)
    }
}
