//! In-memory key/value cache with per-entry expiry.
//!
//! Components that want caching receive a `Cache` (usually behind an `Arc`)
//! at construction; there is no process-wide instance.

use dashmap::DashMap;
use std::time::{Duration, Instant};

struct Slot<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe string-keyed cache. Expired entries are evicted lazily on
/// read.
pub struct Cache<V> {
    slots: DashMap<String, Slot<V>>,
    default_ttl: Duration,
}

impl<V: Clone> Cache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            default_ttl,
        }
    }

    /// Live value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<V> {
        let slot = self.slots.get(key)?;
        if slot.expires_at > Instant::now() {
            return Some(slot.value.clone());
        }
        drop(slot);
        self.slots.remove(key);
        None
    }

    /// Store `value` under `key` for `ttl`.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.slots.insert(
            key.into(),
            Slot {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Store `value` with the cache's default TTL.
    pub fn put_default(&self, key: impl Into<String>, value: V) {
        self.put(key, value, self.default_ttl);
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.slots.remove(key).map(|(_, slot)| slot.value)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache = Cache::new(Duration::from_secs(60));
        cache.put("sentiment", 3.5, Duration::from_secs(60));
        assert_eq!(cache.get("sentiment"), Some(3.5));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_entry_expires() {
        let cache = Cache::new(Duration::from_secs(60));
        cache.put("short", "a".to_string(), Duration::from_millis(10));
        cache.put("long", "b".to_string(), Duration::from_secs(60));

        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some("b".to_string()));
    }

    #[test]
    fn test_default_ttl() {
        let cache = Cache::new(Duration::from_millis(10));
        cache.put_default("k", 1u32);
        assert_eq!(cache.get("k"), Some(1));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_expired_read_evicts() {
        let cache = Cache::new(Duration::from_millis(10));
        cache.put_default("old", 1);
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get("old"), None);
        assert_eq!(cache.remove("old"), None);
    }

    #[test]
    fn test_overwrite_and_remove() {
        let cache = Cache::new(Duration::from_secs(60));
        cache.put_default("key", "v1");
        cache.put_default("key", "v2");
        assert_eq!(cache.get("key"), Some("v2"));

        assert_eq!(cache.remove("key"), Some("v2"));
        assert_eq!(cache.get("key"), None);
        assert_eq!(cache.remove("key"), None);
    }
}
