//! File-system backend
//!
//! Stores each document as one file under the base directory:
//!
//! - `<base>/<name>.json` - plaintext JSON
//! - `<base>/<name>.txt` - encrypted payload
//!
//! Writes are atomic (write to temp file, sync, then rename) so a crash
//! never leaves a half-written document behind.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::backend::{Backend, DocumentKey};
use super::{StorageError, StorageResult};

/// Backend storing one file per document
#[derive(Debug, Clone, Default)]
pub struct FileBackend;

impl FileBackend {
    pub fn new() -> Self {
        Self
    }

    /// Path of the artifact for `key` under `base`
    ///
    /// Rejects names that would resolve outside `base` or into a
    /// subdirectory of it.
    pub fn path_for(base: &Path, key: &DocumentKey) -> StorageResult<PathBuf> {
        let name = key.name();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
        {
            return Err(StorageError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(base.join(key.file_name()))
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn read(&self, base: &Path, key: &DocumentKey) -> StorageResult<Option<String>> {
        let path = Self::path_for(base, key)?;

        match fs::read(&path).await {
            // Invalid UTF-8 is left for the decoder to reject
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError {
                path,
                source: e,
            }),
        }
    }

    async fn write(&self, base: &Path, key: &DocumentKey, contents: &str) -> StorageResult<()> {
        let path = Self::path_for(base, key)?;
        atomic_write(&path, contents.as_bytes()).await?;
        debug!("Wrote {} bytes to {:?}", contents.len(), path);
        Ok(())
    }

    async fn delete(&self, base: &Path, key: &DocumentKey) -> StorageResult<()> {
        let path = Self::path_for(base, key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteError {
                path,
                source: e,
            }),
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file next to the target
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
async fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = File::create(&temp_path)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    drop(file);

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| StorageError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source: e,
        })
}
