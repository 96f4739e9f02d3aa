//! Least-recently-used cache

use std::hash::Hash;
use std::num::NonZeroUsize;

use super::CacheStrategy;

/// Cache that evicts the least recently used key when full
///
/// Both `read` and `write` count as a use. `has_key` does not.
pub struct LruCache<K: Hash + Eq, V> {
    inner: ::lru::LruCache<K, V>,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries
    ///
    /// A capacity of zero is treated as one. Storage grows with use rather
    /// than being reserved up front, so very large capacities are fine.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        let mut inner = ::lru::LruCache::unbounded();
        inner.resize(capacity);
        Self { inner }
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K, V> CacheStrategy<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Send,
    V: Clone + Send,
{
    fn write(&mut self, key: K, value: V) {
        self.inner.put(key, value);
    }

    fn read(&mut self, key: &K) -> Option<V> {
        self.inner.get(key).cloned()
    }

    fn has_key(&mut self, key: &K) -> bool {
        self.inner.contains(key)
    }

    fn remove(&mut self, key: &K) {
        self.inner.pop(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(i: u32) -> String {
        format!("key{}", i)
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut cache = LruCache::new(usize::MAX);
        assert_eq!(cache.capacity(), usize::MAX);

        for i in 1..=4 {
            cache.write(key(i), i);
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.read(&key(1)), Some(1));
    }

    #[test]
    fn test_resized_capacity_still_evicts() {
        let mut cache = LruCache::new(2);
        for i in 1..=3 {
            cache.write(key(i), i);
        }
        assert_eq!(cache.capacity(), 2);
        assert!(!cache.has_key(&key(1)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_evicts_least_recently_written() {
        let mut cache = LruCache::new(3);
        for i in 1..=4 {
            cache.write(key(i), i);
        }

        assert!(!cache.has_key(&key(1)));
        assert_eq!(cache.read(&key(2)), Some(2));
        assert_eq!(cache.read(&key(4)), Some(4));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_read_refreshes_recency() {
        let mut cache = LruCache::new(3);
        cache.write(key(1), 1);
        cache.write(key(2), 2);
        cache.write(key(3), 3);

        assert_eq!(cache.read(&key(1)), Some(1));
        cache.write(key(4), 4);

        assert!(cache.has_key(&key(1)));
        assert!(!cache.has_key(&key(2)));
        assert!(cache.has_key(&key(3)));
    }

    #[test]
    fn test_rewrite_updates_value_without_eviction() {
        let mut cache = LruCache::new(3);
        cache.write(key(1), 1);
        cache.write(key(2), 2);
        cache.write(key(3), 3);
        cache.write(key(1), 10);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.read(&key(1)), Some(10));

        // key1 is now most recent, so key2 goes first
        cache.write(key(4), 4);
        assert!(!cache.has_key(&key(2)));
        assert!(cache.has_key(&key(1)));
    }

    #[test]
    fn test_remove() {
        let mut cache = LruCache::new(2);
        cache.write(key(1), 1);
        cache.remove(&key(1));
        cache.remove(&key(9));

        assert!(!cache.has_key(&key(1)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut cache = LruCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.write(key(1), 1);
        cache.write(key(2), 2);
        assert!(!cache.has_key(&key(1)));
        assert!(cache.has_key(&key(2)));
    }
}
