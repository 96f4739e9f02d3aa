//! In-memory backend
//!
//! A key-value store in the style of browser local storage: payloads are
//! kept under the bare document name with no plaintext/encrypted
//! distinction, and there is no directory to prepare. Data is lost on drop.
//! Useful for tests and ephemeral stores.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{Backend, DocumentKey};
use super::StorageResult;

/// Backend keeping payloads in a shared map
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored payload for a document name
    pub async fn contents(&self, name: &str) -> Option<String> {
        self.data.read().await.get(name).cloned()
    }

    /// Store a raw payload, bypassing the engine
    pub async fn insert_raw(&self, name: &str, payload: &str) {
        self.data
            .write()
            .await
            .insert(name.to_string(), payload.to_string());
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn needs_directory(&self) -> bool {
        false
    }

    async fn read(&self, _base: &Path, key: &DocumentKey) -> StorageResult<Option<String>> {
        Ok(self.contents(key.name()).await)
    }

    async fn write(&self, _base: &Path, key: &DocumentKey, contents: &str) -> StorageResult<()> {
        self.insert_raw(key.name(), contents).await;
        Ok(())
    }

    async fn delete(&self, _base: &Path, key: &DocumentKey) -> StorageResult<()> {
        self.data.write().await.remove(key.name());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
