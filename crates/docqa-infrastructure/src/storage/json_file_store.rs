//! File-backed KeyValueStore implementation.

use super::atomic_file::AtomicFile;
use async_trait::async_trait;
use docqa_core::error::{DocQaError, Result};
use docqa_core::storage::KeyValueStore;
use std::path::{Path, PathBuf};

/// A key-value store keeping one JSON file per key.
///
/// ```text
/// base_dir/
/// ├── chatHistory.json
/// └── otherKey.json
/// ```
///
/// Writes go through [`AtomicFile`], so a crash mid-write leaves either the
/// previous value or the new one, never a truncated file. Blocking file I/O
/// runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `base_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir).map_err(|e| {
            DocQaError::io(format!(
                "Failed to create store directory '{}': {}",
                base_dir.display(),
                e
            ))
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the file path for a given key.
    ///
    /// Characters outside `[A-Za-z0-9_-]` are replaced so a key can never
    /// escape the base directory.
    fn file_for(&self, key: &str) -> AtomicFile {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        AtomicFile::new(self.base_dir.join(format!("{}.json", sanitized)))
    }
}

async fn run_blocking<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| DocQaError::internal(format!("Failed to join task: {}", e)))?
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.file_for(key);
        run_blocking(move || Ok(file.load()?)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key);
        let value = value.to_string();
        tracing::debug!("[JsonFileStore] Writing {}", file.path().display());
        run_blocking(move || Ok(file.save(&value)?)).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file = self.file_for(key);
        tracing::debug!("[JsonFileStore] Removing {}", file.path().display());
        run_blocking(move || Ok(file.remove()?)).await
    }
}
