//! Exponential Moving Average (EMA) indicator.

use super::Indicator;

/// EMA (Exponential Moving Average) indicator.
///
/// Like SMA but gives more weight to recent prices. Seeded with the simple
/// average of the first `period` closes, then iterated forward with the
/// multiplier `2 / (period + 1)`.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Full EMA series; element `i` corresponds to input index `period - 1 + i`.
    /// Empty when the input is shorter than `period`.
    pub fn series(values: &[f64], period: usize) -> Vec<f64> {
        if period == 0 || values.len() < period {
            return Vec::new();
        }

        let multiplier = 2.0 / (period as f64 + 1.0);
        let mut ema = Vec::with_capacity(values.len() - period + 1);

        // First EMA is SMA
        let mut current: f64 = values.iter().take(period).sum::<f64>() / period as f64;
        ema.push(current);

        for value in &values[period..] {
            current = (value - current) * multiplier + current;
            ema.push(current);
        }

        ema
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, closes: &[f64]) -> Option<f64> {
        Self::series(closes, self.period).last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_insufficient_data() {
        assert!(Ema::new(12).calculate(&[1.0; 11]).is_none());
        assert!(Ema::new(0).calculate(&[1.0; 11]).is_none());
    }

    #[test]
    fn test_ema_seed_is_sma() {
        let closes = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(Ema::new(4).calculate(&closes), Some(2.5));
    }

    #[test]
    fn test_ema_constant_series() {
        let closes = vec![42.0; 40];
        let value = Ema::new(12).calculate(&closes).unwrap();
        assert!((value - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_ema_series_length() {
        let closes: Vec<f64> = (0..30).map(|i| i as f64).collect();
        assert_eq!(Ema::series(&closes, 12).len(), 19);
    }

    #[test]
    fn test_ema_follows_trend() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let fast = Ema::new(5).calculate(&closes).unwrap();
        let slow = Ema::new(20).calculate(&closes).unwrap();
        assert!(fast > slow);
    }
}
