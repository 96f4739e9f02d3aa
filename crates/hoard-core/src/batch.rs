//! Batched mutation
//!
//! A [`BatchOperation`] is the handle passed to the body of
//! [`StorageEngine::batch`](crate::StorageEngine::batch). It edits the loaded
//! document in place and records whether anything changed, so the engine
//! writes the document back at most once per batch.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::Document;
use crate::storage::StorageResult;

/// Mutation handle over a document loaded for a batch
pub struct BatchOperation<'a> {
    document: &'a mut Document,
    modified: bool,
}

impl<'a> BatchOperation<'a> {
    pub fn new(document: &'a mut Document) -> Self {
        Self {
            document,
            modified: false,
        }
    }

    /// Set `key` to `value`, overwriting any existing value
    pub fn write<T: Serialize>(&mut self, key: &str, value: T) -> StorageResult<()> {
        let value = serde_json::to_value(value)?;
        self.document.insert(key, value);
        self.modified = true;
        Ok(())
    }

    /// Read `key` as `T`, including values written earlier in this batch
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.document.get(key)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.document.contains_key(key)
    }

    /// Remove `key` if present
    pub fn remove(&mut self, key: &str) {
        if self.document.remove(key).is_some() {
            self.modified = true;
        }
    }

    /// Remove every key
    pub fn clear(&mut self) {
        if !self.document.is_empty() {
            self.document.clear();
            self.modified = true;
        }
    }

    /// Keys currently in the document
    pub fn keys(&self) -> Vec<String> {
        self.document.keys().cloned().collect()
    }

    /// Whether any call in this batch changed the document
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}
