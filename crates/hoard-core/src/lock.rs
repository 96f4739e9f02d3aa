//! Per-document locking
//!
//! Every mutating engine operation runs its load-mutate-persist sequence
//! inside the lock for its document name. Waiters are served in arrival
//! order, and a lock is released when its action finishes, fails, panics or
//! is dropped.
//!
//! Locks live in a [`LockTable`] owned by the engine. Entries are created on
//! first use and removed again once no task holds or waits on them, so the
//! table only grows with the number of documents currently being mutated.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

/// Mutual exclusion for a single document
#[derive(Debug, Default)]
pub struct DocumentLock {
    inner: AsyncMutex<()>,
}

impl DocumentLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once every earlier caller on this lock has finished
    pub async fn run_exclusive<F, Fut, T>(&self, action: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.inner.lock().await;
        action().await
    }
}

/// Registry of document locks, keyed by document name
#[derive(Debug, Default)]
pub struct LockTable {
    locks: Mutex<HashMap<String, Arc<DocumentLock>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` exclusively with respect to other actions on `name`
    pub async fn run_exclusive<F, Fut, T>(&self, name: &str, action: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lease = self.lease(name);
        lease.lock.run_exclusive(action).await
    }

    /// Number of documents with an active or pending lock holder
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lease<'a>(&'a self, name: &'a str) -> Lease<'a> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(DocumentLock::new()))
            .clone();
        Lease {
            table: self,
            name,
            lock,
        }
    }

    fn release(&self, name: &str, lock: &Arc<DocumentLock>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // New leases are only handed out under the table mutex, so a count of
        // two (table + this lease) means nobody else holds or awaits the lock.
        if Arc::strong_count(lock) == 2 {
            if let Some(existing) = locks.get(name) {
                if Arc::ptr_eq(existing, lock) {
                    locks.remove(name);
                }
            }
        }
    }
}

/// A claim on a table entry, returned to the table on drop
struct Lease<'a> {
    table: &'a LockTable,
    name: &'a str,
    lock: Arc<DocumentLock>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.table.release(self.name, &self.lock);
    }
}
