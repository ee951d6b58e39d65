//! News sentiment: keyword scoring and aggregation of the cached record file.
//!
//! Ranking runs never call the news provider. They read the record file the
//! `scan` command maintains and average it per symbol.

use crate::error::{AppError, Result};
use crate::services::cache::Cache;
use crate::types::{SentimentAnalysis, SentimentRecord, SentimentSnapshot, TrendSignal};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Net score above which a batch of articles reads as bullish.
pub const BULLISH_THRESHOLD: f64 = 2.0;
/// Net score below which a batch of articles reads as bearish.
pub const BEARISH_THRESHOLD: f64 = -2.0;

/// Verdict recorded when the provider returned no articles.
pub const NO_NEWS_VERDICT: &str = "NO NEWS";

/// Word polarities on a -5..=5 scale.
const LEXICON: &[(&str, i32)] = &[
    ("adopt", 2),
    ("adoption", 2),
    ("all-time", 2),
    ("approval", 2),
    ("approve", 2),
    ("approved", 2),
    ("ban", -2),
    ("bankrupt", -3),
    ("bankruptcy", -3),
    ("banned", -2),
    ("bearish", -2),
    ("boom", 2),
    ("boost", 1),
    ("breakout", 2),
    ("bullish", 2),
    ("collapse", -2),
    ("crash", -3),
    ("crisis", -3),
    ("decline", -1),
    ("drop", -1),
    ("dump", -2),
    ("exploit", -2),
    ("fail", -2),
    ("failed", -2),
    ("fear", -2),
    ("fraud", -4),
    ("gain", 2),
    ("gains", 2),
    ("good", 3),
    ("great", 3),
    ("grow", 1),
    ("growth", 2),
    ("hack", -2),
    ("hacked", -2),
    ("high", 1),
    ("innovation", 2),
    ("lawsuit", -2),
    ("loss", -3),
    ("losses", -3),
    ("optimism", 2),
    ("optimistic", 2),
    ("panic", -3),
    ("partnership", 2),
    ("plunge", -2),
    ("positive", 2),
    ("profit", 2),
    ("rally", 2),
    ("record", 1),
    ("rise", 1),
    ("risk", -2),
    ("scam", -2),
    ("selloff", -2),
    ("soar", 2),
    ("soars", 2),
    ("strong", 2),
    ("success", 2),
    ("surge", 2),
    ("theft", -2),
    ("uncertainty", -1),
    ("upgrade", 1),
    ("warning", -3),
    ("weak", -2),
    ("win", 4),
    ("worst", -3),
];

fn polarity(word: &str) -> i32 {
    LEXICON
        .binary_search_by(|(w, _)| (*w).cmp(word))
        .map(|i| LEXICON[i].1)
        .unwrap_or(0)
}

/// Sum of word polarities in `text`. Unknown words score zero.
pub fn score_text(text: &str) -> f64 {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
        .map(|w| polarity(&w.to_lowercase()))
        .sum::<i32>() as f64
}

/// Classify a net sentiment score.
pub fn verdict(score: f64) -> TrendSignal {
    if score > BULLISH_THRESHOLD {
        TrendSignal::Bullish
    } else if score < BEARISH_THRESHOLD {
        TrendSignal::Bearish
    } else {
        TrendSignal::Neutral
    }
}

/// Score a batch of article texts. `total_results` is the provider's own
/// hit count when it reports one.
pub fn analyze_texts<S: AsRef<str>>(texts: &[S], total_results: Option<u64>) -> SentimentAnalysis {
    if texts.is_empty() {
        return SentimentAnalysis {
            score: 0.0,
            mentions: 0,
            verdict: NO_NEWS_VERDICT.to_string(),
        };
    }
    let score: f64 = texts.iter().map(|t| score_text(t.as_ref())).sum();
    SentimentAnalysis {
        score,
        mentions: total_results.unwrap_or(texts.len() as u64),
        verdict: verdict(score).label().to_string(),
    }
}

/// Average records per upper-cased symbol. The verdict comes from the last
/// record seen for the symbol; output keeps first-seen order.
pub fn aggregate(records: &[SentimentRecord]) -> Vec<SentimentSnapshot> {
    struct Acc {
        symbol: String,
        total_score: f64,
        total_mentions: u64,
        count: u64,
        latest: TrendSignal,
    }

    let mut order: Vec<Acc> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let symbol = record.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        let latest = TrendSignal::from_str(&record.analysis.verdict).unwrap_or_default();
        let slot = *index.entry(symbol.clone()).or_insert_with(|| {
            order.push(Acc {
                symbol,
                total_score: 0.0,
                total_mentions: 0,
                count: 0,
                latest,
            });
            order.len() - 1
        });
        let acc = &mut order[slot];
        acc.total_score += record.analysis.score;
        acc.total_mentions += record.analysis.mentions;
        acc.count += 1;
        acc.latest = latest;
    }

    order
        .into_iter()
        .map(|acc| SentimentSnapshot {
            symbol: acc.symbol,
            sentiment_score: acc.total_score / acc.count as f64,
            mentions: (acc.total_mentions as f64 / acc.count as f64).round() as u64,
            sentiment: acc.latest,
        })
        .collect()
}

/// Sentiment snapshots keyed by upper-case symbol.
pub type SnapshotMap = HashMap<String, SentimentSnapshot>;

/// Reads the sentiment record file and serves per-symbol snapshots through
/// an injected TTL cache.
pub struct SentimentAggregator {
    path: PathBuf,
    cache: Arc<Cache<SnapshotMap>>,
}

impl SentimentAggregator {
    pub fn new(path: impl Into<PathBuf>, cache: Arc<Cache<SnapshotMap>>) -> Self {
        Self {
            path: path.into(),
            cache,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cache_key(&self) -> String {
        format!("sentiment:{}", self.path.display())
    }

    /// Raw records. A missing or unreadable file yields no records.
    pub fn load_records(&self) -> Vec<SentimentRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!("No sentiment file at {:?}: {}", self.path, e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!("Ignoring unreadable sentiment file {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Aggregated snapshots keyed by upper-case symbol.
    pub fn snapshots(&self) -> SnapshotMap {
        let key = self.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            debug!("Sentiment cache hit ({} symbols)", hit.len());
            return hit;
        }

        let snapshots: SnapshotMap = aggregate(&self.load_records())
            .into_iter()
            .map(|s| (s.symbol.clone(), s))
            .collect();
        info!("Loaded sentiment for {} symbols", snapshots.len());
        self.cache.put_default(key, snapshots.clone());
        snapshots
    }

    /// Append records to the file and drop the cached aggregate.
    pub fn append(&self, records: &[SentimentRecord]) -> Result<()> {
        let mut all = self.load_records();
        all.extend_from_slice(records);

        let json = serde_json::to_string_pretty(&all)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Persistence(format!("{:?}: {}", parent, e)))?;
        }
        fs::write(&self.path, json)
            .map_err(|e| AppError::Persistence(format!("{:?}: {}", self.path, e)))?;

        self.cache.remove(&self.cache_key());
        Ok(())
    }
}
