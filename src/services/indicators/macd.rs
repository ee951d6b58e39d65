//! MACD (Moving Average Convergence Divergence) indicator.

use super::{Ema, Indicator};
use crate::types::MacdSnapshot;

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Indicator for Macd {
    type Output = MacdSnapshot;

    fn min_periods(&self) -> usize {
        (self.slow_period + self.signal_period).saturating_sub(1)
    }

    fn calculate(&self, closes: &[f64]) -> Option<MacdSnapshot> {
        if self.fast_period == 0
            || self.signal_period == 0
            || self.fast_period > self.slow_period
            || closes.len() < self.min_periods()
        {
            return None;
        }

        let fast_ema = Ema::series(closes, self.fast_period);
        let slow_ema = Ema::series(closes, self.slow_period);

        if fast_ema.is_empty() || slow_ema.is_empty() {
            return None;
        }

        // Align the EMAs (fast starts earlier)
        let offset = self.slow_period - self.fast_period;
        let macd_line: Vec<f64> = fast_ema
            .iter()
            .skip(offset)
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = Ema::series(&macd_line, self.signal_period);

        let line = *macd_line.last()?;
        let signal = *signal_line.last()?;

        Some(MacdSnapshot {
            line,
            signal,
            histogram: line - signal,
        })
    }
}
