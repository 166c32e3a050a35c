//! Local-filesystem storage: keys are paths relative to a root directory.

use crate::error::FileError;
use crate::storage::Storage;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A local directory treated as a disk. Never staged: the orchestrator reads
/// and writes keys under `root` directly.
pub struct LocalDisk {
    name: String,
    root: PathBuf,
}

impl LocalDisk {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }

    /// The root directory keys resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Storage for LocalDisk {
    fn disk_name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &str) -> Result<bool, FileError> {
        Ok(self.resolve(key).is_file())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve(key);
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FileError::RemoteMissing {
                    key: key.to_string(),
                }
            } else {
                FileError::StorageFailed {
                    key: key.to_string(),
                    detail: format!("read failed: {e}"),
                }
            }
        })
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), FileError> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FileError::StorageFailed {
                    key: key.to_string(),
                    detail: format!("failed to create parent directory: {e}"),
                })?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| FileError::StorageFailed {
                key: key.to_string(),
                detail: format!("write failed: {e}"),
            })
    }
}
