//! Storage engine
//!
//! The `StorageEngine` is the main entry point. It owns the backend, the
//! optional document cache and the per-document lock table, and drives the
//! codec between them.
//!
//! ## Pipeline
//!
//! ```text
//! operation ─→ lock(doc) ─→ load ─→ mutate ─→ persist ─→ unlock
//!                            │                  │
//!                 cache hit? ┤                  ├─→ encode (+ encrypt)
//!                            └─→ backend read   ├─→ backend write
//!                                 + decode      └─→ cache update
//! ```
//!
//! Mutating operations on the same document run one after another in
//! arrival order. `read` and `get_keys` skip the lock, so while a mutation
//! of the same document is in flight they may see either the old or the new
//! state.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = StorageEngine::new(FileBackend::new())
//!     .with_cache(LruCache::new(32));
//! engine.init("/var/lib/myapp/hoard").await?;
//!
//! engine.write("settings", "theme", "dark", None).await?;
//! let theme: Option<String> = engine.read("settings", "theme", None).await?;
//!
//! engine
//!     .batch("settings", None, |batch| {
//!         batch.write("font_size", 14)?;
//!         batch.remove("legacy_flag");
//!         Ok::<_, StorageError>(())
//!     })
//!     .await?;
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::batch::BatchOperation;
use crate::cache::CacheStrategy;
use crate::codec;
use crate::config::Config;
use crate::document::Document;
use crate::lock::LockTable;
use crate::storage::{Backend, DocumentKey, FileBackend, StorageError, StorageResult};

type DocumentCache = Box<dyn CacheStrategy<String, Document>>;

/// Embedded document store
pub struct StorageEngine {
    backend: Box<dyn Backend>,
    cache: Option<Mutex<DocumentCache>>,
    locks: LockTable,
    /// Base location, set once by `init`
    base: OnceCell<PathBuf>,
}

impl StorageEngine {
    /// Create an engine over `backend` with no cache
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            cache: None,
            locks: LockTable::new(),
            base: OnceCell::new(),
        }
    }

    /// Use `cache` to hold loaded documents in memory
    pub fn with_cache(self, cache: impl CacheStrategy<String, Document> + 'static) -> Self {
        self.with_boxed_cache(Some(Box::new(cache)))
    }

    /// Replace the cache with an already boxed strategy, or disable it
    pub fn with_boxed_cache(mut self, cache: Option<DocumentCache>) -> Self {
        self.cache = cache.map(Mutex::new);
        self
    }

    /// Create a file-backed engine with the configured cache
    ///
    /// The engine still has to be initialized.
    pub fn from_config(config: &Config) -> Self {
        Self::new(FileBackend::new()).with_boxed_cache(config.cache.build())
    }

    /// Create a file-backed engine and initialize it at `config.data_dir`
    pub async fn open_with_config(config: &Config) -> StorageResult<Self> {
        let engine = Self::from_config(config);
        engine.init(&config.data_dir).await?;
        Ok(engine)
    }

    /// Prepare the engine for use
    ///
    /// For backends with a directory, creates `path` (and its parents) if
    /// needed and records it as the base location. Backends without one
    /// ignore `path`. Only the first call has any effect.
    pub async fn init(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path.as_ref();
        self.base
            .get_or_try_init(|| async move {
                if !self.backend.needs_directory() {
                    info!("Initialized {} store", self.backend.name());
                    return Ok::<_, StorageError>(PathBuf::new());
                }

                tokio::fs::create_dir_all(path).await.map_err(|e| {
                    StorageError::CreateDirectory {
                        path: path.to_path_buf(),
                        source: e,
                    }
                })?;
                info!("Initialized {} store at {:?}", self.backend.name(), path);
                Ok(path.to_path_buf())
            })
            .await?;
        Ok(())
    }

    /// Whether `init` has completed
    pub fn is_initialized(&self) -> bool {
        self.base.initialized()
    }

    /// The base location recorded by `init`
    pub fn base_path(&self) -> Option<&Path> {
        self.base.get().map(PathBuf::as_path)
    }

    // ==================== Document Operations ====================

    /// Store `value` under `key`, unless `key` already exists
    ///
    /// An existing value is left untouched; the document is persisted either
    /// way. Use [`StorageEngine::batch`] to overwrite.
    pub async fn write<T: Serialize>(
        &self,
        doc: &str,
        key: &str,
        value: T,
        password: Option<&str>,
    ) -> StorageResult<()> {
        let base = self.base()?;
        let value = serde_json::to_value(value)?;

        self.locks
            .run_exclusive(doc, move || async move {
                let mut document = self.load(base, doc, password).await?;
                if !document.insert_if_absent(key, value) {
                    debug!("Key '{}' already set in '{}', keeping existing value", key, doc);
                }
                self.persist(base, doc, &document, password).await
            })
            .await
    }

    /// Read `key` as `T`
    ///
    /// Returns `None` if the key is missing or holds a value of another type.
    pub async fn read<T: DeserializeOwned>(
        &self,
        doc: &str,
        key: &str,
        password: Option<&str>,
    ) -> StorageResult<Option<T>> {
        let base = self.base()?;
        let document = self.load(base, doc, password).await?;
        Ok(document.get(key))
    }

    /// Remove `key` from the document
    ///
    /// The document is persisted even when the key was not present.
    pub async fn remove(&self, doc: &str, key: &str, password: Option<&str>) -> StorageResult<()> {
        let base = self.base()?;

        self.locks
            .run_exclusive(doc, move || async move {
                let mut document = self.load(base, doc, password).await?;
                document.remove(key);
                self.persist(base, doc, &document, password).await
            })
            .await
    }

    /// Replace the document with an empty one without loading it
    pub async fn clear_document(&self, doc: &str) -> StorageResult<()> {
        let base = self.base()?;

        self.locks
            .run_exclusive(doc, move || async move {
                self.persist(base, doc, &Document::new(), None).await
            })
            .await
    }

    /// Drop the document from the cache and the backend
    pub async fn delete_document(&self, doc: &str, password: Option<&str>) -> StorageResult<()> {
        let base = self.base()?;

        self.locks
            .run_exclusive(doc, move || async move {
                self.cache_remove(doc);
                let key = DocumentKey::for_password(doc, password);
                self.backend.delete(base, &key).await?;
                debug!("Deleted document '{}'", doc);
                Ok::<_, StorageError>(())
            })
            .await
    }

    /// All keys of the document
    pub async fn get_keys(&self, doc: &str) -> StorageResult<HashSet<String>> {
        let base = self.base()?;
        let document = self.load(base, doc, None).await?;
        Ok(document.keys().cloned().collect())
    }

    /// Apply several mutations to one document with a single write
    ///
    /// `body` receives a [`BatchOperation`] over the loaded document. The
    /// document is persisted once after `body` returns, and only if `body`
    /// changed it. If `body` fails, nothing is persisted and its error is
    /// returned.
    pub async fn batch<T, E, F>(&self, doc: &str, password: Option<&str>, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut BatchOperation<'_>) -> Result<T, E>,
        E: From<StorageError>,
    {
        let base = self.base()?;

        self.locks
            .run_exclusive(doc, move || async move {
                let mut document = self.load(base, doc, password).await?;

                let mut batch = BatchOperation::new(&mut document);
                let output = body(&mut batch)?;
                let modified = batch.is_modified();

                if modified {
                    self.persist(base, doc, &document, password).await?;
                } else {
                    debug!("Batch on '{}' made no changes, skipping persist", doc);
                }
                Ok::<T, E>(output)
            })
            .await
    }

    // ==================== Load / Persist ====================

    fn base(&self) -> StorageResult<&Path> {
        self.base_path().ok_or(StorageError::NotInitialized)
    }

    /// Load a document from the cache, falling back to the backend
    ///
    /// Payloads that cannot be decoded or parsed load as an empty document
    /// that is not cached.
    async fn load(&self, base: &Path, doc: &str, password: Option<&str>) -> StorageResult<Document> {
        if let Some(document) = self.cache_read(doc) {
            debug!("Cache hit for '{}'", doc);
            return Ok(document);
        }

        let key = DocumentKey::for_password(doc, password);
        let document = match self.backend.read(base, &key).await? {
            Some(payload) => match decode_document(doc, &payload, password) {
                Some(document) => document,
                None => return Ok(Document::new()),
            },
            None => Document::new(),
        };

        self.cache_write(doc, &document);
        Ok(document)
    }

    /// Encode and write a document, then cache it
    async fn persist(
        &self,
        base: &Path,
        doc: &str,
        document: &Document,
        password: Option<&str>,
    ) -> StorageResult<()> {
        let json = document.to_json()?;
        let payload = codec::encode(&json, password);
        let key = DocumentKey::for_password(doc, password);

        if let Err(e) = self.backend.write(base, &key, &payload).await {
            // Whatever is cached may no longer match the backend
            self.cache_remove(doc);
            return Err(e);
        }

        self.cache_write(doc, document);
        debug!("Persisted '{}' ({} keys)", doc, document.len());
        Ok(())
    }

    // ==================== Cache ====================

    fn cache_read(&self, doc: &str) -> Option<Document> {
        let cache = self.cache.as_ref()?;
        let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.read(&doc.to_string())
    }

    fn cache_write(&self, doc: &str, document: &Document) {
        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.write(doc.to_string(), document.clone());
        }
    }

    fn cache_remove(&self, doc: &str) {
        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.remove(&doc.to_string());
        }
    }
}

/// Decode a stored payload, logging any failure
fn decode_document(doc: &str, payload: &str, password: Option<&str>) -> Option<Document> {
    let json = match codec::decode(payload, password) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to decode document '{}': {}", doc, e);
            return None;
        }
    };

    match Document::from_json(&json) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!("Failed to parse document '{}': {}", doc, e);
            None
        }
    }
}
