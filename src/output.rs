//! Result types: per-file outcomes and the aggregated batch result.

use crate::error::{ErrorKind, FileError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The outcome of converting one input file.
///
/// A batch never discards outcomes: every submitted request produces exactly
/// one of these, success or failure, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// The input as submitted: a local path, or the remote key for staged
    /// batches.
    pub input: PathBuf,

    /// Final local output path. `None` when the conversion failed.
    pub output: Option<PathBuf>,

    /// Remote key the output was uploaded to, for staged batches with a
    /// remote destination.
    pub remote_key: Option<String>,

    /// Raw renderer diagnostics (combined stdout/stderr), kept for failure
    /// triage. `None` when the renderer was silent.
    pub diagnostic: Option<String>,

    /// Wall-clock time spent on this file.
    pub duration_ms: u64,

    /// The per-file error, if the conversion failed.
    pub error: Option<FileError>,
}

impl ConversionOutcome {
    /// Build a failed outcome before any renderer work happened
    /// (missing remote key, staging download failure).
    pub(crate) fn failed(input: PathBuf, error: FileError) -> Self {
        Self {
            input,
            output: None,
            remote_key: None,
            diagnostic: None,
            duration_ms: 0,
            error: Some(error),
        }
    }

    /// True when the file converted (and, for staged batches, uploaded)
    /// without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The coarse error category, if this outcome failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(FileError::kind)
    }
}

/// The aggregated result of a batch conversion.
///
/// `outcomes` preserves submission order regardless of which worker finished
/// first. The batch-level call only errors for shared setup failures; an
/// all-failed batch is still `Ok(BatchResult)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// One outcome per submitted request, in submission order.
    pub outcomes: Vec<ConversionOutcome>,

    /// Number of requests submitted.
    pub total: usize,

    /// Number of successful outcomes.
    pub succeeded: usize,

    /// Number of failed outcomes.
    pub failed: usize,

    /// The local output directory the batch wrote into.
    pub output_dir: PathBuf,

    /// Identifier of the remote disk involved, if the batch was staged.
    pub disk: Option<String>,

    /// Whether inputs or outputs were staged through remote storage.
    pub staged: bool,

    /// Wall-clock time for the whole batch.
    pub duration_ms: u64,
}

impl BatchResult {
    /// True when every outcome succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Recompute `succeeded`/`failed` after outcomes were amended
    /// (e.g. an upload failure flipped a success to a failure).
    pub(crate) fn retally(&mut self) {
        self.succeeded = self.outcomes.iter().filter(|o| o.is_success()).count();
        self.failed = self.outcomes.len() - self.succeeded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcome_reports_kind() {
        let o = ConversionOutcome::failed(
            PathBuf::from("q3.xlsx"),
            FileError::RemoteMissing {
                key: "in/q3.xlsx".into(),
            },
        );
        assert!(!o.is_success());
        assert_eq!(o.error_kind(), Some(ErrorKind::FileNotFound));
    }

    #[test]
    fn retally_counts_amended_outcomes() {
        let mut result = BatchResult {
            outcomes: vec![
                ConversionOutcome {
                    input: PathBuf::from("a.docx"),
                    output: Some(PathBuf::from("a.pdf")),
                    remote_key: None,
                    diagnostic: None,
                    duration_ms: 10,
                    error: None,
                },
                ConversionOutcome::failed(
                    PathBuf::from("b.docx"),
                    FileError::NotFound {
                        path: PathBuf::from("b.docx"),
                    },
                ),
            ],
            total: 2,
            succeeded: 2,
            failed: 0,
            output_dir: PathBuf::from("out"),
            disk: None,
            staged: false,
            duration_ms: 0,
        };
        result.retally();
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 1);
        assert!(!result.all_succeeded());
    }

    #[test]
    fn batch_result_serialises_to_json() {
        let result = BatchResult {
            outcomes: vec![],
            total: 0,
            succeeded: 0,
            failed: 0,
            output_dir: PathBuf::from("out"),
            disk: Some("s3-reports".into()),
            staged: true,
            duration_ms: 42,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: BatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.disk.as_deref(), Some("s3-reports"));
        assert!(back.staged);
    }
}
