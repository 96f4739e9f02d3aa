//! Time-to-live cache

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use super::CacheStrategy;

/// Cache whose entries expire `ttl` after they were last written
///
/// A `ttl` too large to represent as a deadline never expires.
/// Expiry is checked lazily: an expired entry is dropped the first time it
/// is read or checked. Entries nobody asks about again stay in memory until
/// [`TimeBasedCache::evict_expired`] is called.
pub struct TimeBasedCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (V, Option<Instant>)>,
}

impl<K: Hash + Eq, V> TimeBasedCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn evict_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, (_, expires_at)| !is_expired(*expires_at, now));
        before - self.entries.len()
    }

    /// Look up a live entry, evicting it if it has expired
    fn live(&mut self, key: &K) -> Option<&V> {
        let expired = match self.entries.get(key) {
            Some((_, expires_at)) => is_expired(*expires_at, Instant::now()),
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|(value, _)| value)
    }
}

fn is_expired(expires_at: Option<Instant>, now: Instant) -> bool {
    expires_at.is_some_and(|deadline| deadline <= now)
}

impl<K, V> CacheStrategy<K, V> for TimeBasedCache<K, V>
where
    K: Hash + Eq + Send,
    V: Clone + Send,
{
    fn write(&mut self, key: K, value: V) {
        let expires_at = Instant::now().checked_add(self.ttl);
        self.entries.insert(key, (value, expires_at));
    }

    fn read(&mut self, key: &K) -> Option<V> {
        self.live(key).cloned()
    }

    fn has_key(&mut self, key: &K) -> bool {
        self.live(key).is_some()
    }

    fn remove(&mut self, key: &K) {
        self.entries.remove(key);
    }
}
