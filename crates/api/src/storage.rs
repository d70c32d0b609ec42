//! Object storage for uploaded image files.
//!
//! Handlers talk to the [`ObjectStorage`] trait; [`LocalStorage`] keeps files
//! in a directory that the router also serves statically.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Failure to store or remove an object.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The object name is empty or contains path components.
    #[error("Invalid object name: {0}")]
    InvalidName(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat namespace of named binary objects.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write `bytes` under `name`, replacing any existing object.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove `name`. Removing a missing object succeeds.
    async fn delete(&self, name: &str) -> Result<(), StorageError>;
}

/// [`ObjectStorage`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(&['/', '\\'][..]);
        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Delete objects after the rows referencing them are gone.
///
/// Failures are logged and otherwise ignored; an orphaned file is harmless.
pub async fn delete_best_effort(storage: &dyn ObjectStorage, names: &[String]) {
    for name in names {
        if let Err(e) = storage.delete(name).await {
            tracing::warn!(object = %name, error = %e, "Failed to delete stored object");
        }
    }
}
