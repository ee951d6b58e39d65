use crate::services::ranking::{PipelineConfig, RetryPolicy};
use crate::services::scoring::ScoringConfig;
use crate::services::technical::TechnicalAnalyzer;
use crate::types::{PumpPolicy, RsiMethod, SignalRule};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Symbols scored with price history when `SYMBOLS` is unset.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "BTC", "ETH", "SOL", "LINK", "AVAX", "ADA", "DOT", "MATIC", "LTC", "BCH", "XLM", "XRP", "TRX",
    "BNB",
];

/// Indicator and scoring knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub rsi_method: RsiMethod,
    pub signal_rule: SignalRule,
    pub pump_policy: PumpPolicy,
    /// Apply the technical data-quality gate before technical rules.
    pub validate_signals: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rsi_method: RsiMethod::Simple,
            signal_rule: SignalRule::Baseline,
            pump_policy: PumpPolicy::Conservative,
            validate_signals: true,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Universe with price history, upper-case.
    pub symbols: Vec<String>,
    /// Daily bars requested per symbol.
    pub kline_limit: usize,
    pub top_n: usize,
    /// Market-only coins must score above this to be kept.
    pub min_market_score: f64,
    pub market_pages: u32,
    pub market_per_page: u32,
    pub page_delay_ms: u64,
    pub request_delay_ms: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub history_file: String,
    /// Maximum number of history entries kept.
    pub history_cap: usize,
    /// Sentiment record file written by `scan`.
    pub sentiment_file: String,
    pub sentiment_cache_ttl_secs: u64,
    /// Directory for the on-disk market fallback cache.
    pub cache_dir: String,
    pub schedule_interval_secs: u64,
    pub analysis: AnalysisConfig,
    /// Override for the Binance REST base URL.
    pub binance_api_url: Option<String>,
    /// CoinGecko API key (optional, for pro tier).
    pub coingecko_api_key: Option<String>,
    /// NewsData.io API key, required by `scan`.
    pub newsdata_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            kline_limit: 60,
            top_n: 15,
            min_market_score: 20.0,
            market_pages: 3,
            market_per_page: 100,
            page_delay_ms: 2_000,
            request_delay_ms: 100,
            max_attempts: 3,
            retry_backoff_ms: 1_000,
            history_file: "prediction_history.json".to_string(),
            history_cap: 100,
            sentiment_file: "sentiment_history.json".to_string(),
            sentiment_cache_ttl_secs: 300,
            cache_dir: ".coinscope_cache".to_string(),
            schedule_interval_secs: 900,
            analysis: AnalysisConfig::default(),
            binance_api_url: None,
            coingecko_api_key: None,
            newsdata_api_key: None,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn flag_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup. Unset or unparseable values
    /// fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();

        // Format: "BTC,ETH,SOL"
        let symbols: Vec<String> = lookup("SYMBOLS")
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_uppercase())
                    .filter(|sym| !sym.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            symbols: if symbols.is_empty() { d.symbols } else { symbols },
            kline_limit: parse_or(&lookup, "KLINE_LIMIT", d.kline_limit),
            top_n: parse_or(&lookup, "TOP_N", d.top_n),
            min_market_score: parse_or(&lookup, "MIN_MARKET_SCORE", d.min_market_score),
            market_pages: parse_or(&lookup, "MARKET_PAGES", d.market_pages),
            market_per_page: parse_or(&lookup, "MARKET_PER_PAGE", d.market_per_page),
            page_delay_ms: parse_or(&lookup, "PAGE_DELAY_MS", d.page_delay_ms),
            request_delay_ms: parse_or(&lookup, "REQUEST_DELAY_MS", d.request_delay_ms),
            max_attempts: parse_or(&lookup, "MAX_ATTEMPTS", d.max_attempts).max(1),
            retry_backoff_ms: parse_or(&lookup, "RETRY_BACKOFF_MS", d.retry_backoff_ms),
            history_file: non_empty("HISTORY_FILE").unwrap_or(d.history_file),
            history_cap: parse_or(&lookup, "HISTORY_CAP", d.history_cap).max(1),
            sentiment_file: non_empty("SENTIMENT_FILE").unwrap_or(d.sentiment_file),
            sentiment_cache_ttl_secs: parse_or(
                &lookup,
                "SENTIMENT_CACHE_TTL_SECS",
                d.sentiment_cache_ttl_secs,
            ),
            cache_dir: non_empty("CACHE_DIR").unwrap_or(d.cache_dir),
            schedule_interval_secs: parse_or(
                &lookup,
                "SCHEDULE_INTERVAL_SECS",
                d.schedule_interval_secs,
            )
            .max(1),
            analysis: AnalysisConfig {
                rsi_method: lookup("RSI_METHOD")
                    .and_then(|v| RsiMethod::from_str(v.trim()))
                    .unwrap_or(d.analysis.rsi_method),
                signal_rule: lookup("SIGNAL_RULE")
                    .and_then(|v| SignalRule::from_str(v.trim()))
                    .unwrap_or(d.analysis.signal_rule),
                pump_policy: lookup("PUMP_POLICY")
                    .and_then(|v| PumpPolicy::from_str(v.trim()))
                    .unwrap_or(d.analysis.pump_policy),
                validate_signals: flag_or(
                    &lookup,
                    "VALIDATE_SIGNALS",
                    d.analysis.validate_signals,
                ),
            },
            binance_api_url: non_empty("BINANCE_API_URL"),
            coingecko_api_key: non_empty("COINGECKO_API_KEY"),
            newsdata_api_key: non_empty("NEWSDATA_API_KEY"),
        }
    }

    pub fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            pump_policy: self.analysis.pump_policy,
            validate_signals: self.analysis.validate_signals,
            ..ScoringConfig::default()
        }
    }

    pub fn analyzer(&self) -> TechnicalAnalyzer {
        TechnicalAnalyzer::new(self.analysis.rsi_method, self.analysis.signal_rule)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            symbols: self.symbols.clone(),
            kline_limit: self.kline_limit,
            top_n: self.top_n,
            min_market_score: self.min_market_score,
            market_pages: self.market_pages,
            market_per_page: self.market_per_page,
            page_delay: Duration::from_millis(self.page_delay_ms),
            request_delay: Duration::from_millis(self.request_delay_ms),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                backoff: Duration::from_millis(self.retry_backoff_ms),
            },
        }
    }

    pub fn sentiment_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.sentiment_cache_ttl_secs)
    }

    pub fn schedule_interval(&self) -> Duration {
        Duration::from_secs(self.schedule_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.symbols.len(), 14);
        assert_eq!(config.top_n, 15);
        assert_eq!(config.history_cap, 100);
        assert_eq!(config.schedule_interval(), Duration::from_secs(900));
        assert_eq!(config.analysis.pump_policy, PumpPolicy::Conservative);
        assert!(config.analysis.validate_signals);
    }

    #[test]
    fn test_config_overrides() {
        let config = config_from(&[
            ("SYMBOLS", " btc, eth ,,sol"),
            ("TOP_N", "5"),
            ("MIN_MARKET_SCORE", "12.5"),
            ("RSI_METHOD", "wilder"),
            ("SIGNAL_RULE", "ema"),
            ("PUMP_POLICY", "aggressive"),
            ("VALIDATE_SIGNALS", "false"),
            ("COINGECKO_API_KEY", "cg-key"),
            ("HISTORY_FILE", "/tmp/h.json"),
        ]);
        assert_eq!(config.symbols, vec!["BTC", "ETH", "SOL"]);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.min_market_score, 12.5);
        assert_eq!(config.analysis.rsi_method, RsiMethod::Wilder);
        assert_eq!(config.analysis.signal_rule, SignalRule::EmaConfirmed);
        assert_eq!(config.analysis.pump_policy, PumpPolicy::Aggressive);
        assert!(!config.analysis.validate_signals);
        assert_eq!(config.coingecko_api_key.as_deref(), Some("cg-key"));
        assert_eq!(config.history_file, "/tmp/h.json");
    }

    #[test]
    fn test_config_invalid_values_fall_back() {
        let config = config_from(&[
            ("TOP_N", "many"),
            ("MAX_ATTEMPTS", "0"),
            ("RSI_METHOD", "magic"),
            ("NEWSDATA_API_KEY", "  "),
        ]);
        assert_eq!(config.top_n, 15);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.analysis.rsi_method, RsiMethod::Simple);
        assert!(config.newsdata_api_key.is_none());
    }

    #[test]
    fn test_derived_configs() {
        let config = config_from(&[("PAGE_DELAY_MS", "0"), ("PUMP_POLICY", "momentum")]);
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.page_delay, Duration::ZERO);
        assert_eq!(pipeline.retry.max_attempts, 3);
        assert_eq!(pipeline.retry.backoff, Duration::from_secs(1));

        let scoring = config.scoring_config();
        assert_eq!(scoring.pump_policy, PumpPolicy::Aggressive);
        assert!(scoring.validate_signals);
    }
}
