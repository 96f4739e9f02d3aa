//! Cache strategies
//!
//! An optional in-memory layer between the engine and its backend. The
//! engine keys entries by document name; the strategies themselves are
//! generic and usable as plain key-value caches.
//!
//! - [`LruCache`]: evicts the least recently read or written key
//! - [`SizeLimitedCache`]: evicts the oldest inserted key (FIFO)
//! - [`TimeBasedCache`]: entries expire a fixed time after they were written

mod lru;
mod size_limited;
mod time_based;

pub use self::lru::LruCache;
pub use self::size_limited::SizeLimitedCache;
pub use self::time_based::TimeBasedCache;

/// A pluggable cache eviction policy
///
/// `read` takes `&mut self` because reading may reorder (LRU) or evict
/// (TTL) entries.
pub trait CacheStrategy<K, V>: Send {
    /// Store `value` under `key`, evicting according to the policy
    fn write(&mut self, key: K, value: V);

    /// Get a copy of the value under `key`
    fn read(&mut self, key: &K) -> Option<V>;

    /// Check whether `key` is currently cached
    fn has_key(&mut self, key: &K) -> bool;

    /// Drop `key` from the cache
    fn remove(&mut self, key: &K);
}
