//! hoard Core Library
//!
//! An embedded, document-oriented key-value store. Each named document is a
//! flat JSON object persisted as one unit, optionally encrypted with a
//! password, optionally cached in memory, and mutated under a per-document
//! lock.
//!
//! # Quick Start
//!
//! ```text
//! let engine = StorageEngine::new(FileBackend::new()).with_cache(LruCache::new(32));
//! engine.init("/var/lib/myapp/hoard").await?;
//!
//! engine.write("settings", "theme", "dark", None).await?;
//! let theme: Option<String> = engine.read("settings", "theme", None).await?;
//! ```
//!
//! # Modules
//!
//! - `engine`: Storage engine (main entry point)
//! - `document`: Document values and typed access
//! - `batch`: Batched mutation handle
//! - `cache`: Cache strategies (LRU, FIFO, TTL)
//! - `codec`: Payload encoding and AES encryption
//! - `lock`: Per-document locking
//! - `storage`: Backends (file, memory) and storage errors
//! - `config`: Store configuration

pub mod batch;
pub mod cache;
pub mod codec;
pub mod config;
pub mod document;
pub mod engine;
pub mod lock;
pub mod storage;

pub use batch::BatchOperation;
pub use cache::{CacheStrategy, LruCache, SizeLimitedCache, TimeBasedCache};
pub use codec::CodecError;
pub use config::{CacheConfig, Config};
pub use document::{Document, DocumentError};
pub use engine::StorageEngine;
pub use lock::{DocumentLock, LockTable};
pub use storage::{
    Backend, DocumentKey, FileBackend, MemoryBackend, StorageError, StorageResult,
};
