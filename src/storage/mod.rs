//! Storage abstraction for staged batches.
//!
//! A [`Storage`] names a disk (local or remote) that inputs come from and
//! outputs go to. The batch orchestrator only asks three questions: does a
//! key exist, give me its bytes, store these bytes — everything else
//! (buckets, HTTP, auth) lives behind the trait.
//!
//! [`StagingArea`] is the scratch space remote inputs are downloaded into.
//! It is a `TempDir` plus an artifact ledger, so staged files are removed
//! both on the orderly [`StagingArea::cleanup`] path and, as a backstop, when
//! the area is dropped.

use crate::error::FileError;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tracing::debug;

pub mod http;
pub mod local;

pub use http::HttpStorage;
pub use local::LocalDisk;

/// A disk that batch inputs are read from and outputs written to.
///
/// Implementations decide remoteness via [`Storage::is_remote`]; the default
/// is local, so a disk only gets staging behaviour by opting in.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Human-readable identifier for this disk, used in results and logs.
    fn disk_name(&self) -> &str;

    /// Whether keys on this disk need downloading/uploading. Remote inputs
    /// are staged to local scratch before conversion; remote destinations
    /// receive uploads after conversion.
    fn is_remote(&self) -> bool {
        false
    }

    /// Whether `key` exists on this disk.
    async fn exists(&self, key: &str) -> Result<bool, FileError>;

    /// Fetch the object at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, FileError>;

    /// Store `bytes` at `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), FileError>;
}

/// What kind of artifact a staging entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactKind {
    File,
    Directory,
}

#[derive(Debug)]
struct StagingArtifact {
    path: PathBuf,
    kind: ArtifactKind,
}

/// Scratch space for staged downloads, removed on cleanup or drop.
pub struct StagingArea {
    root: TempDir,
    artifacts: Mutex<Vec<StagingArtifact>>,
}

impl StagingArea {
    /// Create a fresh staging directory under the system temp dir.
    pub fn new() -> io::Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("doc2pdf-staging-")
            .tempdir()?;
        debug!(root = %root.path().display(), "staging area created");
        Ok(Self {
            root,
            artifacts: Mutex::new(Vec::new()),
        })
    }

    /// The staging root directory.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write `bytes` as `name` inside the staging area and record it for
    /// cleanup. `name` must be a bare file name, not a path.
    pub fn write_file(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, FileError> {
        let path = self.root.path().join(name);
        std::fs::write(&path, bytes).map_err(|e| FileError::WriteFailed {
            path: path.clone(),
            detail: format!("failed to stage input: {e}"),
        })?;
        self.track(path.clone(), ArtifactKind::File);
        Ok(path)
    }

    /// Create a subdirectory inside the staging area and record it.
    pub fn create_dir(&self, name: &str) -> Result<PathBuf, FileError> {
        let path = self.root.path().join(name);
        std::fs::create_dir_all(&path).map_err(|e| FileError::WriteFailed {
            path: path.clone(),
            detail: format!("failed to create staging directory: {e}"),
        })?;
        self.track(path.clone(), ArtifactKind::Directory);
        Ok(path)
    }

    fn track(&self, path: PathBuf, kind: ArtifactKind) {
        if let Ok(mut artifacts) = self.artifacts.lock() {
            artifacts.push(StagingArtifact { path, kind });
        }
    }

    /// Number of artifacts currently tracked.
    pub fn artifact_count(&self) -> usize {
        self.artifacts.lock().map(|a| a.len()).unwrap_or(0)
    }

    /// Remove every tracked artifact, then the staging root itself.
    ///
    /// Consumes the area; the `TempDir` drop is the backstop for anything
    /// this misses.
    pub fn cleanup(self) -> io::Result<()> {
        if let Ok(artifacts) = self.artifacts.lock() {
            for artifact in artifacts.iter() {
                let removed = match artifact.kind {
                    ArtifactKind::File => std::fs::remove_file(&artifact.path),
                    ArtifactKind::Directory => std::fs::remove_dir_all(&artifact.path),
                };
                if let Err(e) = removed {
                    if e.kind() != io::ErrorKind::NotFound {
                        debug!(path = %artifact.path.display(), error = %e, "artifact removal failed");
                    }
                }
            }
        }
        self.root.close()
    }
}
