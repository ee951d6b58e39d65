//! Return volatility.

use super::{mean, std_dev, Indicator};

/// Standard deviation of day-over-day returns, in percent.
#[derive(Default)]
pub struct Volatility;

impl Volatility {
    /// Day-over-day fractional returns. Pairs with a zero base are skipped.
    pub fn returns(closes: &[f64]) -> Vec<f64> {
        closes
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect()
    }
}

impl Indicator for Volatility {
    type Output = f64;

    fn min_periods(&self) -> usize {
        3
    }

    fn calculate(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.min_periods() {
            return None;
        }
        let returns = Self::returns(closes);
        if returns.len() < 2 {
            return None;
        }
        let m = mean(&returns)?;
        Some(std_dev(&returns, m) * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatility_constant_growth_is_zero() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 * 1.02f64.powi(i)).collect();
        let value = Volatility.calculate(&closes).unwrap();
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn test_volatility_alternating() {
        // Returns: +10%, -10%, +10%, ... around 100/110
        let closes = [100.0, 110.0, 99.0, 108.9, 98.01];
        let value = Volatility.calculate(&closes).unwrap();
        assert!((value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_volatility_insufficient_data() {
        assert!(Volatility.calculate(&[1.0, 2.0]).is_none());
    }
}
