//! Capped, newest-first JSON log of ranking runs.
//!
//! The whole file is rewritten on every append. Writes go to a sibling temp
//! file that is then renamed over the log, so a crash mid-write leaves the
//! previous log intact. There is no cross-process locking.

use crate::error::{AppError, Result};
use crate::types::{CoinStats, HistoryEntry, RunResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Summary of the most recent stored run.
#[derive(Debug, Clone, PartialEq)]
pub struct LastRunCheck {
    pub entries: usize,
    pub hours_since: i64,
    pub success: bool,
    pub top_symbol: Option<String>,
}

pub struct HistoryStore {
    path: PathBuf,
    cap: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap: cap.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored entries, newest first. A missing file is an empty history;
    /// an unreadable one is logged and treated as empty.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history at {:?} yet", self.path);
                return Vec::new();
            }
            Err(e) => {
                warn!("Cannot read history {:?}, starting fresh: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Corrupt history {:?}, starting fresh: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Prepend `result`, evict beyond the cap and rewrite the file.
    pub fn append(&self, result: RunResult) -> Result<HistoryEntry> {
        let entry = HistoryEntry::new(result);
        let mut entries = self.load();
        entries.insert(0, entry.clone());
        entries.truncate(self.cap);

        self.write(&entries)?;
        debug!(
            "History {:?} now holds {} entries",
            self.path,
            entries.len()
        );
        Ok(entry)
    }

    fn write(&self, entries: &[HistoryEntry]) -> Result<()> {
        let persist = |e: std::io::Error, what: &str| {
            AppError::Persistence(format!("{} {:?}: {}", what, self.path, e))
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persist(e, "create dir for"))?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(|e| persist(e, "write"))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            persist(e, "replace")
        })
    }

    /// Log how long ago the last run was and what it ranked first. Purely
    /// informational.
    pub fn validate_last_run(&self) -> Option<LastRunCheck> {
        let entries = self.load();
        let Some(last) = entries.first() else {
            info!("No previous runs in history");
            return None;
        };

        let check = LastRunCheck {
            entries: entries.len(),
            hours_since: (Utc::now() - last.timestamp).num_hours(),
            success: last.result.success,
            top_symbol: last.result.top_symbol().map(str::to_string),
        };

        match &check.top_symbol {
            Some(top) => info!(
                "Last run {}h ago ranked {} first ({} runs stored)",
                check.hours_since, top, check.entries
            ),
            None => info!(
                "Last run {}h ago produced no ranking ({} runs stored)",
                check.hours_since, check.entries
            ),
        }
        Some(check)
    }
}

/// Per-symbol appearance and score statistics over successful entries at
/// or after `since`. Most frequent first, then by average score.
pub fn coin_stats(entries: &[HistoryEntry], since: DateTime<Utc>) -> Vec<CoinStats> {
    let mut scores: HashMap<&str, Vec<f64>> = HashMap::new();

    for entry in entries
        .iter()
        .filter(|e| e.result.success && e.timestamp >= since)
    {
        for row in &entry.result.ranked {
            scores.entry(row.symbol.as_str()).or_default().push(row.score);
        }
    }

    let mut stats: Vec<CoinStats> = scores
        .into_iter()
        .map(|(symbol, s)| CoinStats {
            symbol: symbol.to_string(),
            appearances: s.len() as u32,
            avg_score: s.iter().sum::<f64>() / s.len() as f64,
            max_score: s.iter().copied().fold(f64::MIN, f64::max),
            min_score: s.iter().copied().fold(f64::MAX, f64::min),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.appearances
            .cmp(&a.appearances)
            .then(b.avg_score.total_cmp(&a.avg_score))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PredictionCategory, ReportRow};
    use chrono::Duration;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("coinscope_hist_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("history.json")
    }

    fn row(rank: usize, symbol: &str, score: f64) -> ReportRow {
        ReportRow {
            rank,
            symbol: symbol.to_string(),
            score,
            category: PredictionCategory::Technical,
            forecast_percent: None,
            factors: Vec::new(),
        }
    }

    fn entry_at(hours_ago: i64, rows: Vec<ReportRow>) -> HistoryEntry {
        let mut entry = HistoryEntry::new(RunResult::success(rows, Vec::new()));
        entry.timestamp = Utc::now() - Duration::hours(hours_ago);
        entry
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = HistoryStore::new(scratch("missing"), 10);
        assert!(store.load().is_empty());
        assert!(store.validate_last_run().is_none());
    }

    #[test]
    fn test_append_prepends_and_caps() {
        let path = scratch("cap");
        let store = HistoryStore::new(&path, 3);
        for i in 0..5 {
            store
                .append(RunResult::success(vec![row(1, &format!("C{}", i), 50.0)], Vec::new()))
                .unwrap();
        }
        let entries = store.load();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].result.top_symbol(), Some("C4"));
        assert_eq!(entries[2].result.top_symbol(), Some("C2"));
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let path = scratch("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[{broken").unwrap();
        let store = HistoryStore::new(&path, 10);
        assert!(store.load().is_empty());

        store.append(RunResult::failure("boom")).unwrap();
        assert_eq!(store.load().len(), 1);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_validate_last_run() {
        let path = scratch("validate");
        let store = HistoryStore::new(&path, 10);
        store
            .append(RunResult::success(vec![row(1, "SOL", 80.0)], vec!["SOL".into()]))
            .unwrap();
        let check = store.validate_last_run().unwrap();
        assert_eq!(check.entries, 1);
        assert_eq!(check.hours_since, 0);
        assert!(check.success);
        assert_eq!(check.top_symbol.as_deref(), Some("SOL"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_coin_stats_window() {
        let entries = vec![
            entry_at(1, vec![row(1, "SOL", 80.0), row(2, "BTC", 60.0)]),
            entry_at(5, vec![row(1, "SOL", 70.0)]),
            entry_at(24 * 10, vec![row(1, "ETH", 99.0)]),
        ];
        let stats = coin_stats(&entries, Utc::now() - Duration::days(7));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].symbol, "SOL");
        assert_eq!(stats[0].appearances, 2);
        assert_eq!(stats[0].avg_score, 75.0);
        assert_eq!(stats[0].max_score, 80.0);
        assert_eq!(stats[0].min_score, 70.0);
        assert_eq!(stats[1].symbol, "BTC");
    }

    #[test]
    fn test_coin_stats_skips_failures() {
        let mut failed = entry_at(1, vec![row(1, "DOGE", 90.0)]);
        failed.result.success = false;
        let stats = coin_stats(&[failed], Utc::now() - Duration::days(1));
        assert!(stats.is_empty());
    }
}
