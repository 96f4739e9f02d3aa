//! Backend adapter trait
//!
//! A backend moves encoded document text in and out of some persistent
//! medium. It knows nothing about caching, locking or encryption; the engine
//! hands it already-encoded payloads keyed by [`DocumentKey`].

use std::path::Path;

use async_trait::async_trait;

use super::StorageResult;

/// Extension for plaintext documents
pub const PLAIN_EXTENSION: &str = "json";

/// Extension for password-protected documents
pub const ENCRYPTED_EXTENSION: &str = "txt";

/// Identifies one stored document artifact
///
/// The same document name maps to different artifacts depending on whether
/// it is stored encrypted, for backends that distinguish the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    name: String,
    encrypted: bool,
}

impl DocumentKey {
    pub fn new(name: impl Into<String>, encrypted: bool) -> Self {
        Self {
            name: name.into(),
            encrypted,
        }
    }

    /// Key for a document accessed with an optional password
    pub fn for_password(name: &str, password: Option<&str>) -> Self {
        Self::new(name, password.is_some())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// File name for this artifact: `<name>.json` or `<name>.txt`
    pub fn file_name(&self) -> String {
        let extension = if self.encrypted {
            ENCRYPTED_EXTENSION
        } else {
            PLAIN_EXTENSION
        };
        format!("{}.{}", self.name, extension)
    }
}

/// Persistence adapter for encoded documents
///
/// `base` is the location recorded by `init`. Backends without a directory
/// concept ignore it.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Whether `init` must create `base` before the backend can be used
    fn needs_directory(&self) -> bool {
        true
    }

    /// Fetch the stored payload, or `None` if the document does not exist
    async fn read(&self, base: &Path, key: &DocumentKey) -> StorageResult<Option<String>>;

    /// Store `contents`, replacing any previous payload
    async fn write(&self, base: &Path, key: &DocumentKey, contents: &str) -> StorageResult<()>;

    /// Delete the stored payload. Deleting a missing document is not an error.
    async fn delete(&self, base: &Path, key: &DocumentKey) -> StorageResult<()>;

    /// A human-readable name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(DocumentKey::new("settings", false).file_name(), "settings.json");
        assert_eq!(DocumentKey::new("vault", true).file_name(), "vault.txt");
    }

    #[test]
    fn test_for_password() {
        let plain = DocumentKey::for_password("notes", None);
        let secret = DocumentKey::for_password("notes", Some("pw"));

        assert!(!plain.is_encrypted());
        assert!(secret.is_encrypted());
        assert_ne!(plain, secret);
        assert_eq!(secret.name(), "notes");
    }
}
