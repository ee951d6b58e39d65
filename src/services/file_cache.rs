//! JSON-on-disk cache.
//!
//! Market pages are written here after every successful fetch so a run can
//! fall back to the last good copy when the provider is down.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct Stored<T> {
    data: T,
    /// Unix seconds at write time.
    timestamp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Directory of `<key>.json` files.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open (and create if needed) a cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(&dir) {
                warn!("Failed to create cache directory {:?}: {}", dir, e);
            }
        }
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        self.dir.join(format!("{}.json", safe_key))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<Stored<T>> {
        let content = fs::read_to_string(self.path_for(key)).ok()?;
        match serde_json::from_str(&content) {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!("Failed to parse cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Entry for `key` regardless of age.
    pub fn get_stale<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let stored = self.read::<T>(key)?;
        debug!(
            "Using stale cache for {} ({}s old)",
            key,
            now_secs().saturating_sub(stored.timestamp)
        );
        Some(stored.data)
    }

    /// Best effort: failures are logged, never returned.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        let stored = Stored {
            data,
            timestamp: now_secs(),
        };
        match serde_json::to_string(&stored) {
            Ok(content) => match fs::write(self.path_for(key), content) {
                Ok(()) => debug!("Cached {} to disk", key),
                Err(e) => warn!("Failed to write cache {}: {}", key, e),
            },
            Err(e) => warn!("Failed to serialize cache {}: {}", key, e),
        }
    }
}
