//! Durable provider storing one JSON file per key.

use std::path::{Path, PathBuf};

use crate::error::{PersistenceError, Result};
use crate::io::{list_with_extension, read_if_exists, remove_if_exists, write_atomic};
use crate::provider::PersistenceProvider;

const EXTENSION: &str = "json";

/// Provider that keeps each key in `<root>/<key>.json`.
///
/// Writes are atomic (temp file + rename). Blocking file I/O runs on the
/// blocking thread pool so callers can await it from the async runtime.
#[derive(Debug, Clone)]
pub struct FileProvider {
    root: PathBuf,
}

impl FileProvider {
    /// Create a provider rooted at `root`. The directory is created on the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }
}

/// Keys become file names, so they are limited to a portable character set
/// and may not start with a dot.
fn validate_key(key: &str) -> Result<()> {
    let invalid = |reason| PersistenceError::InvalidKey {
        key: key.to_string(),
        reason,
    };
    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.starts_with('.') {
        return Err(invalid("key may not start with '.'"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid("key contains characters outside [A-Za-z0-9_.-]"));
    }
    Ok(())
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|source| PersistenceError::TaskFailed { source })?
}

impl PersistenceProvider for FileProvider {
    async fn save(&self, key: &str, data: String) -> Result<()> {
        let path = self.path_for(key)?;
        run_blocking(move || write_atomic(&path, data.as_bytes())).await?;
        tracing::info!(key, "Saved entry to {}", self.root.display());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        run_blocking(move || read_if_exists(&path)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        run_blocking(move || remove_if_exists(&path)).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        let root = self.root.clone();
        let paths = run_blocking(move || list_with_extension(&root, EXTENSION)).await?;
        Ok(paths
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        let root = self.root.clone();
        run_blocking(move || {
            for path in list_with_extension(&root, EXTENSION)? {
                remove_if_exists(&path)?;
            }
            Ok(())
        })
        .await?;
        tracing::info!("Cleared all entries in {}", self.root.display());
        Ok(())
    }
}
