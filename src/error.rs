//! Error types for the doc2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the conversion (or the whole batch) cannot
//!   proceed at all (invalid configuration, batch output directory cannot be
//!   created). Returned as `Err(ConvertError)` from the top-level `convert*`
//!   functions.
//!
//! * [`FileError`] — **Per-file**: one input failed (missing file, renderer
//!   crash, timeout, upload miss) but all sibling inputs are fine. Stored
//!   inside [`crate::output::ConversionOutcome`] so callers can inspect
//!   partial success rather than losing the whole batch to one bad file.
//!
//! Every [`FileError`] maps onto one of three coarse categories via
//! [`FileError::kind`]: `FileNotFound`, `WriteFailed`, or `ConversionFailed`.
//! Tests and callers that only care about the category match on the kind;
//! callers that need the offending path, key, or the renderer's captured
//! diagnostics match on the variant.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2pdf library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::ConversionOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input file was not found at the given path.
    #[error("input file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Could not create or populate an output location.
    #[error("failed to write output at '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external renderer failed or produced no usable output.
    ///
    /// `detail` carries the renderer's combined stdout/stderr when available.
    #[error("conversion failed for '{path}': {detail}")]
    ConversionFailed { path: PathBuf, detail: String },

    /// The renderer exceeded the per-file deadline and was terminated.
    #[error("renderer timed out after {secs}s on '{path}'")]
    Timeout { path: PathBuf, secs: u64 },

    /// A remote storage operation failed for the given key.
    #[error("storage operation failed for '{key}': {detail}")]
    StorageFailed { key: String, detail: String },

    /// Builder or orchestrator validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A per-file error, recorded inside a [`crate::output::ConversionOutcome`].
///
/// Cloneable and serialisable so outcomes can be reported over the wire or
/// written as JSON. The batch never aborts because one of these occurred.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum FileError {
    /// Local input file does not exist.
    #[error("file not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Remote input key does not exist on the source disk.
    #[error("remote object not found: '{key}'")]
    RemoteMissing { key: String },

    /// Output directory creation or final placement failed.
    #[error("failed to write '{path}': {detail}")]
    WriteFailed { path: PathBuf, detail: String },

    /// Renderer subprocess failed, or exited zero without producing the
    /// expected output. `detail` includes the captured diagnostics.
    #[error("conversion failed for '{path}': {detail}")]
    ConversionFailed { path: PathBuf, detail: String },

    /// Renderer exceeded the per-file deadline and was terminated.
    #[error("renderer timed out after {secs}s on '{path}'")]
    Timeout { path: PathBuf, secs: u64 },

    /// Staging download or upload failed for the given key.
    #[error("storage operation failed for '{key}': {detail}")]
    StorageFailed { key: String, detail: String },
}

/// The coarse failure taxonomy: which category a [`FileError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing local file or missing remote key.
    FileNotFound,
    /// Cannot create or populate an output location.
    WriteFailed,
    /// Subprocess non-zero exit, missing expected output, or timeout.
    ConversionFailed,
}

impl FileError {
    /// Map this error onto the coarse taxonomy.
    ///
    /// Timeouts count as `ConversionFailed`; staging failures count as
    /// `WriteFailed` (a location could not be populated).
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileError::NotFound { .. } | FileError::RemoteMissing { .. } => ErrorKind::FileNotFound,
            FileError::WriteFailed { .. } | FileError::StorageFailed { .. } => ErrorKind::WriteFailed,
            FileError::ConversionFailed { .. } | FileError::Timeout { .. } => {
                ErrorKind::ConversionFailed
            }
        }
    }
}

impl From<FileError> for ConvertError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound { path } => ConvertError::FileNotFound { path },
            FileError::RemoteMissing { key } => ConvertError::FileNotFound {
                path: PathBuf::from(key),
            },
            FileError::WriteFailed { path, detail } => ConvertError::WriteFailed {
                path,
                source: std::io::Error::other(detail),
            },
            FileError::ConversionFailed { path, detail } => {
                ConvertError::ConversionFailed { path, detail }
            }
            FileError::Timeout { path, secs } => ConvertError::Timeout { path, secs },
            FileError::StorageFailed { key, detail } => ConvertError::StorageFailed { key, detail },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_path() {
        let e = FileError::NotFound {
            path: PathBuf::from("/tmp/missing.docx"),
        };
        assert!(e.to_string().contains("/tmp/missing.docx"));
        assert_eq!(e.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn remote_missing_is_file_not_found_class() {
        let e = FileError::RemoteMissing {
            key: "reports/q3.xlsx".into(),
        };
        assert_eq!(e.kind(), ErrorKind::FileNotFound);
        assert!(e.to_string().contains("reports/q3.xlsx"));
    }

    #[test]
    fn timeout_is_conversion_failed_class() {
        let e = FileError::Timeout {
            path: PathBuf::from("deck.pptx"),
            secs: 30,
        };
        assert_eq!(e.kind(), ErrorKind::ConversionFailed);
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn conversion_failed_keeps_diagnostics() {
        let e = FileError::ConversionFailed {
            path: PathBuf::from("broken.doc"),
            detail: "Error: source file could not be loaded".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("broken.doc"), "got: {msg}");
        assert!(msg.contains("could not be loaded"), "got: {msg}");
    }

    #[test]
    fn fatal_error_from_per_file_error() {
        let fatal: ConvertError = FileError::NotFound {
            path: PathBuf::from("a.odt"),
        }
        .into();
        assert!(matches!(fatal, ConvertError::FileNotFound { .. }));

        let fatal: ConvertError = FileError::Timeout {
            path: PathBuf::from("a.odt"),
            secs: 5,
        }
        .into();
        assert!(matches!(fatal, ConvertError::Timeout { secs: 5, .. }));
    }

    #[test]
    fn file_error_round_trips_through_json() {
        let e = FileError::StorageFailed {
            key: "out/report.pdf".into(),
            detail: "HTTP 503".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: FileError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), ErrorKind::WriteFailed);
        assert_eq!(back.to_string(), e.to_string());
    }
}
