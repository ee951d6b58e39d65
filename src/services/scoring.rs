//! Composite scoring of technical, sentiment and market signals.
//!
//! Every rule is additive. Rules that fire append a factor string in
//! evaluation order, and the final score is clamped to [0, 100]. The
//! confidence value is a separate running tally of how many good signals
//! contributed, clamped to [0, 1]. A missing input category contributes
//! nothing.

use crate::types::{
    ConfidenceLevel, MarketSnapshot, PumpPolicy, ScoreResult, SentimentSnapshot,
    TechnicalSnapshot, TrendSignal,
};

/// Scoring engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    pub pump_policy: PumpPolicy,
    /// Gate technical rules on a basic data-quality check.
    pub validate_signals: bool,
    /// Forecast confidence required before the forecast trend counts.
    pub forecast_confidence_threshold: f64,
    /// Volatility (percent) above which a penalty applies.
    pub volatility_penalty_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pump_policy: PumpPolicy::Conservative,
            validate_signals: true,
            forecast_confidence_threshold: 0.5,
            volatility_penalty_threshold: 15.0,
        }
    }
}

/// Result of the technical data-quality gate.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalValidation {
    pub valid: bool,
    /// Names of the checks that failed.
    pub failed: Vec<&'static str>,
    /// Fraction of checks passed.
    pub score: f64,
}

/// Check that a technical snapshot carries enough trustworthy data.
/// At most one check may fail.
pub fn validate_signal(technical: &TechnicalSnapshot) -> SignalValidation {
    let forecast = technical.forecast.as_ref();
    let checks = [
        ("rsi", technical.rsi.is_some()),
        ("forecast fit", forecast.is_some_and(|f| f.r_squared > 0.3)),
        ("forecast confidence", forecast.is_some_and(|f| f.confidence > 0.4)),
        ("volatility", technical.volatility.is_some_and(|v| v < 20.0)),
        ("macd", technical.macd.is_some()),
    ];

    let failed: Vec<&'static str> = checks
        .iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| *name)
        .collect();
    let passed = checks.len() - failed.len();

    SignalValidation {
        valid: passed + 1 >= checks.len(),
        failed,
        score: passed as f64 / checks.len() as f64,
    }
}

/// Running totals while rules are evaluated.
#[derive(Default)]
struct Tally {
    score: f64,
    confidence: f64,
    factors: Vec<String>,
}

impl Tally {
    fn add(&mut self, points: f64, confidence: f64, factor: impl Into<String>) {
        self.score += points;
        self.confidence += confidence;
        self.factors.push(factor.into());
    }

    fn finish(self) -> ScoreResult {
        let confidence = self.confidence.clamp(0.0, 1.0);
        ScoreResult {
            score: self.score.clamp(0.0, 100.0),
            factors: self.factors,
            confidence,
            level: ConfidenceLevel::from_confidence(confidence),
        }
    }
}

/// Weighted, additive, clamped scoring engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score one symbol from whichever inputs are available.
    pub fn score(
        &self,
        technical: Option<&TechnicalSnapshot>,
        sentiment: Option<&SentimentSnapshot>,
        market: Option<&MarketSnapshot>,
    ) -> ScoreResult {
        let mut tally = Tally::default();

        if let Some(technical) = technical {
            self.score_technical(technical, &mut tally);
        }
        if let Some(sentiment) = sentiment {
            Self::score_sentiment(sentiment, &mut tally);
        }
        if let Some(market) = market {
            self.score_market(market, &mut tally);
        }

        tally.finish()
    }

    fn score_technical(&self, t: &TechnicalSnapshot, tally: &mut Tally) {
        if self.config.validate_signals {
            let validation = validate_signal(t);
            if !validation.valid {
                tally.add(
                    10.0,
                    0.2,
                    format!("Weak technical signal ({})", validation.failed.join(", ")),
                );
                return;
            }
        }

        match t.signal {
            TrendSignal::Bullish if t.data_quality > 0.5 => {
                tally.add(25.0, 0.3, "Bullish technical signal confirmed");
            }
            TrendSignal::Bearish => tally.add(-15.0, -0.1, "Bearish technical signal"),
            _ => {}
        }

        if let Some(rsi) = t.rsi {
            if rsi < 30.0 {
                tally.add(15.0, 0.2, format!("RSI oversold ({:.0})", rsi));
            } else if rsi > 70.0 {
                tally.add(-10.0, -0.1, format!("RSI overbought ({:.0})", rsi));
            } else if rsi < 50.0 {
                tally.add(5.0, 0.1, format!("RSI below 50, recharging ({:.0})", rsi));
            }
        }

        if t.momentum_7d > 0.05 && t.momentum_30d > 0.02 {
            tally.add(
                20.0,
                0.25,
                format!("Consistent momentum (7d: {:.1}%)", t.momentum_7d * 100.0),
            );
        } else if t.momentum_7d > 0.02 {
            tally.add(8.0, 0.1, "Positive 7d momentum");
        }

        if let Some(forecast) = &t.forecast {
            if forecast.confidence > self.config.forecast_confidence_threshold {
                if forecast.trend == TrendSignal::Bullish {
                    tally.add(
                        25.0,
                        0.35,
                        format!(
                            "Bullish forecast ({:.1}%, conf: {:.0}%)",
                            forecast.change_percent,
                            forecast.confidence * 100.0
                        ),
                    );
                }
            } else {
                tally.add(
                    0.0,
                    0.0,
                    format!("Weak forecast (conf: {:.0}%)", forecast.confidence * 100.0),
                );
            }
        }

        if let Some(volatility) = t.volatility {
            if volatility > self.config.volatility_penalty_threshold {
                tally.add(-10.0, -0.2, format!("High volatility ({:.1}%)", volatility));
            }
        }

        if t.macd.is_some_and(|m| m.histogram > 0.0) {
            tally.add(8.0, 0.1, "Positive MACD histogram");
        }
    }

    fn score_sentiment(s: &SentimentSnapshot, tally: &mut Tally) {
        match s.sentiment {
            TrendSignal::Bullish if s.mentions > 20 => {
                tally.add(
                    20.0,
                    0.15,
                    format!("Bullish sentiment ({} mentions)", s.mentions),
                );
            }
            TrendSignal::Bullish => tally.add(15.0, 0.1, "Bullish sentiment"),
            _ if s.sentiment_score > 1.0 => tally.add(10.0, 0.05, "Positive sentiment"),
            TrendSignal::Bearish => tally.add(-15.0, -0.1, "Bearish sentiment"),
            _ => {}
        }

        if s.mentions > 30 {
            tally.add(10.0, 0.0, "High media coverage");
        } else if s.mentions > 10 {
            tally.add(5.0, 0.0, "Moderate media coverage");
        }
    }

    fn score_market(&self, m: &MarketSnapshot, tally: &mut Tally) {
        if let Some(rank) = m.rank.filter(|r| *r > 0) {
            if rank <= 20 {
                tally.add(15.0, 0.1, format!("Top {} by market cap", rank));
            } else if rank <= 50 {
                tally.add(10.0, 0.0, format!("Top {} by market cap", rank));
            } else if rank <= 100 {
                tally.add(5.0, 0.0, format!("Top {} by market cap", rank));
            }
        }

        let change = m.price_change_24h;
        if change.is_finite() {
            match self.config.pump_policy {
                PumpPolicy::Conservative => {
                    if change >= 15.0 {
                        tally.add(
                            0.0,
                            0.0,
                            format!("24h move ignored as likely pump ({:.1}%)", change),
                        );
                    } else if change <= -15.0 {
                        tally.add(
                            0.0,
                            0.0,
                            format!("24h move ignored as extreme drop ({:.1}%)", change),
                        );
                    } else if change > 5.0 {
                        tally.add(8.0, 0.08, format!("Positive 24h move ({:.1}%)", change));
                    } else if change > 2.0 {
                        tally.add(4.0, 0.0, format!("Modest 24h gain ({:.1}%)", change));
                    }
                }
                PumpPolicy::Aggressive => {
                    if change > 20.0 {
                        tally.add(40.0, 0.0, format!("Explosive 24h gain ({:.1}%)", change));
                    } else if change > 10.0 {
                        tally.add(25.0, 0.0, format!("Strong 24h gain ({:.1}%)", change));
                    } else if change > 5.0 {
                        tally.add(10.0, 0.08, format!("Positive 24h move ({:.1}%)", change));
                    } else if change > 2.0 {
                        tally.add(5.0, 0.0, format!("Modest 24h gain ({:.1}%)", change));
                    }
                }
            }
        }

        if let Some(ratio) = m.volume_ratio() {
            if ratio > 0.1 {
                tally.add(8.0, 0.0, "High trading volume");
            } else if ratio > 0.05 {
                tally.add(4.0, 0.0, "Healthy trading volume");
            }
        }
    }
}
