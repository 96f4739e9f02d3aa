//! Size-limited FIFO cache

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use super::CacheStrategy;

/// Cache that evicts the oldest inserted key once `max_size` is reached
///
/// Reads never change eviction order. Writing an existing key moves it to
/// the back of the queue, as if it were newly inserted.
pub struct SizeLimitedCache<K, V> {
    max_size: usize,
    entries: HashMap<K, V>,
    /// Insertion order, oldest at the front
    order: VecDeque<K>,
}

impl<K: Hash + Eq + Clone, V> SizeLimitedCache<K, V> {
    /// Create a cache holding at most `max_size` entries
    ///
    /// A cache with `max_size` zero stores nothing.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn forget(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        Some(value)
    }
}

impl<K, V> CacheStrategy<K, V> for SizeLimitedCache<K, V>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
{
    fn write(&mut self, key: K, value: V) {
        if self.max_size == 0 {
            return;
        }

        self.forget(&key);
        while self.entries.len() >= self.max_size {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    fn read(&mut self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn has_key(&mut self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&mut self, key: &K) {
        self.forget(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(i: u32) -> String {
        format!("key{}", i)
    }

    #[test]
    fn test_evicts_oldest_inserted() {
        let mut cache = SizeLimitedCache::new(3);
        for i in 1..=4 {
            cache.write(key(i), i);
        }

        assert!(!cache.has_key(&key(1)));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_reads_do_not_reorder() {
        let mut cache = SizeLimitedCache::new(3);
        cache.write(key(1), 1);
        cache.write(key(2), 2);
        cache.write(key(3), 3);

        assert_eq!(cache.read(&key(1)), Some(1));
        assert_eq!(cache.read(&key(1)), Some(1));
        cache.write(key(4), 4);

        assert!(!cache.has_key(&key(1)));
        assert!(cache.has_key(&key(2)));
    }

    #[test]
    fn test_rewrite_moves_to_newest() {
        let mut cache = SizeLimitedCache::new(3);
        cache.write(key(1), 1);
        cache.write(key(2), 2);
        cache.write(key(3), 3);
        cache.write(key(1), 100);
        assert_eq!(cache.len(), 3);

        cache.write(key(4), 4);
        assert_eq!(cache.read(&key(1)), Some(100));
        assert!(!cache.has_key(&key(2)));
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut cache = SizeLimitedCache::new(2);
        cache.write(key(1), 1);
        cache.write(key(2), 2);
        cache.remove(&key(1));
        cache.write(key(3), 3);

        assert!(cache.has_key(&key(2)));
        assert!(cache.has_key(&key(3)));
    }

    #[test]
    fn test_zero_size_stores_nothing() {
        let mut cache = SizeLimitedCache::new(0);
        cache.write(key(1), 1);
        assert!(cache.is_empty());
        assert_eq!(cache.read(&key(1)), None);
    }
}
