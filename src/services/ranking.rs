//! One ranking run: gather inputs, score every symbol, sort, truncate.
//!
//! External calls are strictly sequential with fixed sleeps in between.
//! A symbol that keeps failing is dropped from the run; it never aborts it.

use crate::error::{AppError, Result};
use crate::services::file_cache::FileCache;
use crate::services::history::HistoryStore;
use crate::services::report;
use crate::services::scoring::ScoringEngine;
use crate::services::sentiment::{SentimentAggregator, SnapshotMap};
use crate::services::technical::TechnicalAnalyzer;
use crate::sources::{MarketDataProvider, PriceHistoryProvider};
use crate::types::{
    MarketSnapshot, Prediction, PredictionCategory, ReportRow, RunResult, TechnicalSnapshot,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(
                    "{}: attempt {}/{} failed: {}",
                    label, attempt, max_attempts, e
                );
                if !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Knobs for one ranking run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Universe fetched with price history.
    pub symbols: Vec<String>,
    pub kline_limit: usize,
    pub top_n: usize,
    /// Market-only predictions need a score strictly above this.
    pub min_market_score: f64,
    pub market_pages: u32,
    pub market_per_page: u32,
    pub page_delay: Duration,
    pub request_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            kline_limit: 60,
            top_n: 15,
            min_market_score: 20.0,
            market_pages: 3,
            market_per_page: 100,
            page_delay: Duration::from_secs(2),
            request_delay: Duration::from_millis(100),
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome of one ranking run.
#[derive(Debug, Clone)]
pub struct RankingReport {
    /// Sorted by descending score, at most `top_n` long.
    pub predictions: Vec<Prediction>,
    /// Universe symbols whose price history could not be used.
    pub failed_symbols: Vec<String>,
    pub technical_count: usize,
    pub market_count: usize,
    /// Predictions built before the market-only filter and truncation.
    pub scored_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl RankingReport {
    pub fn rows(&self) -> Vec<ReportRow> {
        self.predictions
            .iter()
            .enumerate()
            .map(|(i, p)| ReportRow::from_prediction(i + 1, p))
            .collect()
    }
}

fn market_cache_key(page: u32, per_page: u32) -> String {
    format!("markets_p{}_n{}", page, per_page)
}

/// Fetches, scores and ranks the configured universe.
pub struct RankingPipeline<P, M> {
    prices: P,
    markets: M,
    analyzer: TechnicalAnalyzer,
    engine: ScoringEngine,
    sentiment: Option<SentimentAggregator>,
    market_cache: Option<FileCache>,
    config: PipelineConfig,
}

impl<P, M> RankingPipeline<P, M>
where
    P: PriceHistoryProvider,
    M: MarketDataProvider,
{
    pub fn new(
        prices: P,
        markets: M,
        analyzer: TechnicalAnalyzer,
        engine: ScoringEngine,
        config: PipelineConfig,
    ) -> Self {
        Self {
            prices,
            markets,
            analyzer,
            engine,
            sentiment: None,
            market_cache: None,
            config,
        }
    }

    pub fn with_sentiment(mut self, sentiment: SentimentAggregator) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Cache successful market pages on disk and serve them when the
    /// provider fails.
    pub fn with_market_cache(mut self, cache: FileCache) -> Self {
        self.market_cache = Some(cache);
        self
    }

    /// Fetch price history for every universe symbol, in order.
    async fn collect_technical(&self) -> (Vec<TechnicalSnapshot>, Vec<String>) {
        let mut seen = HashSet::new();
        let mut snapshots = Vec::new();
        let mut failed = Vec::new();

        let symbols = self
            .config
            .symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()));

        for (i, symbol) in symbols.enumerate() {
            if i > 0 && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }

            let fetched = with_retry(&self.config.retry, &symbol, || {
                self.prices.daily_closes(&symbol, self.config.kline_limit)
            })
            .await;

            match fetched {
                Ok(closes) => match self.analyzer.analyze(&symbol, &closes) {
                    Some(snapshot) => snapshots.push(snapshot),
                    None => {
                        warn!("{}: empty price history, skipping", symbol);
                        failed.push(symbol);
                    }
                },
                Err(e) => {
                    warn!("{}: price history unavailable, skipping: {}", symbol, e);
                    failed.push(symbol);
                }
            }
        }

        (snapshots, failed)
    }

    async fn fetch_market_page(&self, page: u32) -> Option<Vec<MarketSnapshot>> {
        let per_page = self.config.market_per_page;
        let key = market_cache_key(page, per_page);
        let label = format!("market page {}", page);

        match with_retry(&self.config.retry, &label, || {
            self.markets.top_markets(page, per_page)
        })
        .await
        {
            Ok(rows) => {
                if let Some(cache) = &self.market_cache {
                    cache.set(&key, &rows);
                }
                Some(rows)
            }
            Err(e) => {
                warn!("{} unavailable: {}", label, e);
                let stale = self
                    .market_cache
                    .as_ref()
                    .and_then(|c| c.get_stale::<Vec<MarketSnapshot>>(&key));
                if let Some(rows) = &stale {
                    info!("Using cached {} ({} coins)", label, rows.len());
                }
                stale
            }
        }
    }

    /// Market rows in rank order, first occurrence of each symbol kept.
    async fn collect_markets(&self) -> Vec<MarketSnapshot> {
        let mut rows: Vec<MarketSnapshot> = Vec::new();
        let mut seen = HashSet::new();

        for page in 1..=self.config.market_pages {
            if page > 1 && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }
            let Some(page_rows) = self.fetch_market_page(page).await else {
                continue;
            };
            if page_rows.is_empty() {
                debug!("Market page {} empty, stopping", page);
                break;
            }
            for row in page_rows {
                if seen.insert(row.symbol.clone()) {
                    rows.push(row);
                }
            }
        }

        rows
    }

    /// Execute one full ranking run.
    pub async fn run(&self) -> Result<RankingReport> {
        let started = Instant::now();
        info!(
            "Ranking run started: {} symbols, {} market pages",
            self.config.symbols.len(),
            self.config.market_pages
        );

        let (technical, failed_symbols) = self.collect_technical().await;
        let news: SnapshotMap = self
            .sentiment
            .as_ref()
            .map(|s| s.snapshots())
            .unwrap_or_default();
        let markets = self.collect_markets().await;

        let market_by_symbol: HashMap<&str, &MarketSnapshot> =
            markets.iter().map(|m| (m.symbol.as_str(), m)).collect();
        let technical_symbols: HashSet<&str> =
            technical.iter().map(|t| t.symbol.as_str()).collect();

        let mut predictions = Vec::new();
        let mut scored_count = 0;

        for snapshot in &technical {
            let sentiment = news.get(&snapshot.symbol);
            let market = market_by_symbol.get(snapshot.symbol.as_str()).copied();
            let result = self.engine.score(Some(snapshot), sentiment, market);
            scored_count += 1;
            predictions.push(Prediction::new(
                snapshot.symbol.clone(),
                result,
                Some(snapshot.clone()),
                sentiment.cloned(),
                market.cloned(),
                PredictionCategory::Technical,
            ));
        }

        for market in markets.iter().filter(|m| !technical_symbols.contains(m.symbol.as_str())) {
            let sentiment = news.get(&market.symbol);
            let result = self.engine.score(None, sentiment, Some(market));
            scored_count += 1;
            if result.score > self.config.min_market_score {
                predictions.push(Prediction::new(
                    market.symbol.clone(),
                    result,
                    None,
                    sentiment.cloned(),
                    Some(market.clone()),
                    PredictionCategory::Market,
                ));
            }
        }

        if technical.is_empty() && predictions.is_empty() {
            return Err(AppError::NoData(format!(
                "no usable price history ({} symbols failed) and no market data",
                failed_symbols.len()
            )));
        }

        // Stable: equal scores keep fetch order.
        predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
        predictions.truncate(self.config.top_n);

        info!(
            "Ranking run finished in {:?}: {} predictions ({} technical, {} market rows, {} failed)",
            started.elapsed(),
            predictions.len(),
            technical.len(),
            markets.len(),
            failed_symbols.len()
        );

        Ok(RankingReport {
            predictions,
            failed_symbols,
            technical_count: technical.len(),
            market_count: markets.len(),
            scored_count,
            generated_at: Utc::now(),
        })
    }

    /// Run once and record the outcome, success or failure, in `history`.
    /// A history write failure overrides the run's own result.
    pub async fn run_and_record(&self, history: &HistoryStore) -> Result<RankingReport> {
        history.validate_last_run();
        match self.run().await {
            Ok(ranking) => {
                history.append(report::run_result(&ranking))?;
                Ok(ranking)
            }
            Err(e) => {
                warn!("Ranking run failed: {}", e);
                history.append(RunResult::failure(e.to_string()))?;
                Err(e)
            }
        }
    }
}
