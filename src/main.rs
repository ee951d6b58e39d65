use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use coinscope::services::{
    report, Cache, FileCache, HistoryStore, RankingPipeline, Scheduler, ScoringEngine,
    SentimentAggregator,
};
use coinscope::sources::{BinanceClient, CoinGeckoClient, NewsDataClient};
use coinscope::{AppError, Config, SentimentRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type LivePipeline = RankingPipeline<BinanceClient, CoinGeckoClient>;

#[derive(Parser)]
#[command(name = "coinscope")]
#[command(about = "Composite crypto scoring and ranking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one ranking, print it and append it to the history
    Predict {
        /// Number of coins to keep
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Rank periodically until Ctrl-C
    Schedule {
        /// Seconds between runs
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Show recent runs and coin statistics
    History {
        /// Number of runs to show
        #[arg(short, long, default_value_t = 3)]
        limit: usize,
    },
    /// Collect news sentiment for keywords into the sentiment file
    Scan {
        /// Symbols or keywords, e.g. BTC SOL
        #[arg(required = true)]
        keywords: Vec<String>,
    },
}

fn sentiment_aggregator(config: &Config) -> SentimentAggregator {
    let cache = Arc::new(Cache::new(config.sentiment_cache_ttl()));
    SentimentAggregator::new(&config.sentiment_file, cache)
}

fn build_pipeline(config: &Config) -> LivePipeline {
    RankingPipeline::new(
        BinanceClient::new(config.binance_api_url.clone()),
        CoinGeckoClient::new(config.coingecko_api_key.clone()),
        config.analyzer(),
        ScoringEngine::new(config.scoring_config()),
        config.pipeline_config(),
    )
    .with_sentiment(sentiment_aggregator(config))
    .with_market_cache(FileCache::new(&config.cache_dir))
}

fn history_store(config: &Config) -> HistoryStore {
    HistoryStore::new(&config.history_file, config.history_cap)
}

async fn predict(config: Config) -> anyhow::Result<()> {
    let pipeline = build_pipeline(&config);
    let history = history_store(&config);
    let ranking = pipeline.run_and_record(&history).await?;
    print!("{}", report::render_report(&ranking));
    info!("Saved run to {:?}", history.path());
    Ok(())
}

async fn schedule(config: Config) -> anyhow::Result<()> {
    let pipeline = Arc::new(build_pipeline(&config));
    let history = Arc::new(history_store(&config));
    let scheduler = Scheduler::new(config.schedule_interval());

    scheduler
        .run(move || {
            let pipeline = pipeline.clone();
            let history = history.clone();
            async move {
                match pipeline.run_and_record(&history).await {
                    Ok(ranking) => print!("{}", report::render_report(&ranking)),
                    Err(e) => error!("Scheduled run failed: {}", e),
                }
            }
        })
        .await;
    Ok(())
}

fn show_history(config: &Config, limit: usize) {
    let history = history_store(config);
    let entries = history.load();
    let recent: Vec<_> = entries.iter().take(limit).cloned().collect();
    print!("{}", report::render_history(&recent, entries.len()));

    let now = Utc::now();
    let today_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .unwrap_or(now);
    let today = coinscope::services::history::coin_stats(&entries, today_start);
    let week = coinscope::services::history::coin_stats(&entries, today_start - ChronoDuration::days(7));

    println!();
    print!("{}", report::render_stats("Today", &today, 10));
    print!("{}", report::render_stats("Last 7 days", &week, 10));
}

async fn scan(config: &Config, keywords: &[String]) -> anyhow::Result<()> {
    let api_key = config
        .newsdata_api_key
        .clone()
        .ok_or_else(|| AppError::Config("NEWSDATA_API_KEY is not set".into()))?;
    let client = NewsDataClient::new(api_key);
    let delay = Duration::from_millis(config.request_delay_ms);

    let mut records = Vec::new();
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match client.analyze(keyword).await {
            Ok(analysis) => {
                println!(
                    "{:<8} {:>4} mentions | score {:>6.1} | {}",
                    keyword.to_uppercase(),
                    analysis.mentions,
                    analysis.score,
                    analysis.verdict
                );
                records.push(SentimentRecord {
                    symbol: keyword.to_uppercase(),
                    timestamp: Utc::now().timestamp_millis(),
                    analysis,
                });
            }
            Err(e) => warn!("Sentiment scan for {} failed: {}", keyword, e),
        }
    }

    if records.is_empty() {
        return Err(AppError::NoData("no keyword could be scanned".into()).into());
    }
    let aggregator = sentiment_aggregator(config);
    aggregator.append(&records)?;
    info!(
        "Appended {} sentiment records to {:?}",
        records.len(),
        aggregator.path()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Commands::Predict { top } => {
            if let Some(top) = top {
                config.top_n = top;
            }
            predict(config).await
        }
        Commands::Schedule { interval } => {
            if let Some(secs) = interval {
                config.schedule_interval_secs = secs.max(1);
            }
            schedule(config).await
        }
        Commands::History { limit } => {
            show_history(&config, limit);
            Ok(())
        }
        Commands::Scan { keywords } => scan(&config, &keywords).await,
    }
}
