//! Integration tests for the indicator library and classifier

use coinscope::services::indicators::{
    Ema, Indicator, LinearForecast, Macd, Momentum, Rsi, Volatility,
};
use coinscope::services::{ClassifierInput, SignalClassifier, TechnicalAnalyzer};
use coinscope::types::{RsiMethod, SignalRule, TrendSignal};

const SCENARIO: [f64; 15] = [
    100.0, 102.0, 101.0, 105.0, 103.0, 108.0, 107.0, 110.0, 106.0, 112.0, 109.0, 115.0, 111.0,
    118.0, 114.0,
];

/// Deterministic pseudo-random walk.
fn walk(seed: u64, len: usize) -> Vec<f64> {
    let mut state = seed;
    let mut price = 100.0;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let step = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            price = (price * (1.0 + step * 0.1)).max(0.01);
            price
        })
        .collect()
}

#[test]
fn test_scenario_rsi_in_range() {
    let rsi = Rsi::new(14, RsiMethod::Simple).calculate(&SCENARIO).unwrap();
    assert!((0.0..=100.0).contains(&rsi));
    // gains 33, losses 19
    assert!((rsi - 100.0 * 33.0 / 52.0).abs() < 1e-9);

    let wilder = Rsi::new(14, RsiMethod::Wilder).calculate(&SCENARIO).unwrap();
    assert!((0.0..=100.0).contains(&wilder));
}

#[test]
fn test_scenario_momentum() {
    let m7 = Momentum::new(7).value(&SCENARIO);
    let expected = (SCENARIO[14] - SCENARIO[7]) / SCENARIO[7];
    assert!((m7 - expected).abs() < 1e-12);
}

#[test]
fn test_rsi_null_below_period_plus_one() {
    for period in 1..=30 {
        let rsi = Rsi::new(period, RsiMethod::Simple);
        let closes = walk(period as u64, period);
        assert!(rsi.calculate(&closes).is_none(), "period {}", period);
        let closes = walk(period as u64, period + 1);
        assert!(rsi.calculate(&closes).is_some(), "period {}", period);
    }
}

#[test]
fn test_rsi_bounds_on_random_walks() {
    for seed in 0..50 {
        let closes = walk(seed, 80);
        for method in [RsiMethod::Simple, RsiMethod::Wilder] {
            let value = Rsi::new(14, method).calculate(&closes).unwrap();
            assert!((0.0..=100.0).contains(&value), "seed {} {:?}", seed, method);
        }
    }
}

#[test]
fn test_rsi_hundred_when_window_never_falls() {
    // Earlier drops fall outside the 14-transition window.
    let mut closes = vec![120.0, 110.0, 100.0];
    closes.extend((0..14).map(|i| 100.0 + i as f64 * 0.5));
    closes.push(106.5);
    let rsi = Rsi::new(14, RsiMethod::Simple).calculate(&closes).unwrap();
    assert_eq!(rsi, 100.0);
}

#[test]
fn test_ema_of_constant_series() {
    let closes = [42.0; 50];
    for period in [1, 5, 12, 26] {
        let ema = Ema::new(period).calculate(&closes).unwrap();
        assert!((ema - 42.0).abs() < 1e-9);
    }
}

#[test]
fn test_momentum_short_history_is_zero() {
    assert_eq!(Momentum::new(7).value(&[1.0, 2.0, 3.0]), 0.0);
    assert_eq!(Momentum::new(30).value(&SCENARIO), 0.0);
}

#[test]
fn test_forecast_confidence_and_trend_agree() {
    for seed in 0..50 {
        let closes = walk(seed, 60);
        let Some(forecast) = LinearForecast::default().calculate(&closes) else {
            continue;
        };
        assert!((0.0..=1.0).contains(&forecast.confidence));
        match forecast.trend {
            TrendSignal::Bullish => assert!(forecast.change_percent > 5.0),
            TrendSignal::Bearish => assert!(forecast.change_percent < -5.0),
            TrendSignal::Neutral => assert!(forecast.change_percent.abs() <= 5.0),
        }
    }
}

#[test]
fn test_short_inputs_never_panic() {
    for len in 0..40 {
        let closes = walk(7, len);
        let _ = Rsi::default().calculate(&closes);
        let _ = Ema::new(12).calculate(&closes);
        let _ = Macd::default().calculate(&closes);
        let _ = LinearForecast::default().calculate(&closes);
        let _ = Volatility.calculate(&closes);
        let _ = Momentum::new(7).value(&closes);
        let _ = TechnicalAnalyzer::default().analyze("X", &closes);
    }
}

#[test]
fn test_scenario_snapshot() {
    let snapshot = TechnicalAnalyzer::default().analyze("sol", &SCENARIO).unwrap();
    assert_eq!(snapshot.symbol, "SOL");
    assert_eq!(snapshot.price, 114.0);
    assert!(snapshot.rsi.is_some());
    assert!(snapshot.ema_fast.is_some());
    // 15 closes are too few for the slow EMA, MACD and the 20-bar forecast.
    assert!(snapshot.ema_slow.is_none());
    assert!(snapshot.macd.is_none());
    assert!(snapshot.forecast.is_none());
    assert!(snapshot.volatility.is_some());
    // RSI ~63 is neither oversold nor overbought.
    assert_eq!(snapshot.signal, TrendSignal::Neutral);
}

#[test]
fn test_classifier_bullish_checked_first() {
    let classifier = SignalClassifier::new(SignalRule::Baseline);
    let input = ClassifierInput {
        rsi: Some(35.0),
        momentum_7d: 0.03,
        ..Default::default()
    };
    assert_eq!(classifier.classify(&input), TrendSignal::Bullish);
}
