//! Staged batches: remote inputs downloaded to scratch, outputs uploaded,
//! scratch removed afterwards no matter what.

#![cfg(unix)]

mod common;

use async_trait::async_trait;
use doc2pdf::{
    convert_batch_staged, ConversionRequest, ConvertOptions, ErrorKind, FileError, LocalDisk,
    Storage,
};
use serial_test::serial;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// In-memory remote disk for exercising the staging paths without a network.
struct MemoryStorage {
    name: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_puts: bool,
}

impl MemoryStorage {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            objects: Mutex::new(HashMap::new()),
            fail_puts: false,
        }
    }

    fn failing_uploads(name: &str) -> Self {
        Self {
            fail_puts: true,
            ..Self::new(name)
        }
    }

    fn insert(&self, key: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn disk_name(&self) -> &str {
        &self.name
    }

    fn is_remote(&self) -> bool {
        true
    }

    async fn exists(&self, key: &str) -> Result<bool, FileError> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, FileError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| FileError::RemoteMissing {
                key: key.to_string(),
            })
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), FileError> {
        if self.fail_puts {
            return Err(FileError::StorageFailed {
                key: key.to_string(),
                detail: "HTTP 503".to_string(),
            });
        }
        self.insert(key, bytes);
        Ok(())
    }
}

fn options_with(script: PathBuf) -> ConvertOptions {
    ConvertOptions::builder()
        .soffice_path(script)
        .workers(2)
        .timeout_secs(20)
        .build()
        .unwrap()
}

#[tokio::test]
async fn remote_inputs_are_staged_converted_and_uploaded() {
    let dir = tempfile::tempdir().unwrap();
    let script = common::ok_renderer(dir.path());

    let source = Arc::new(MemoryStorage::new("inbox"));
    source.insert("in/report.docx", b"fake docx");
    source.insert("in/deck.pptx", b"fake pptx");
    let dest = Arc::new(MemoryStorage::new("outbox"));

    let requests = vec![
        ConversionRequest::new("in/report.docx"),
        ConversionRequest::new("in/deck.pptx"),
    ];
    let result = convert_batch_staged(
        requests,
        source.clone(),
        dest.clone(),
        dir.path().join("out"),
        "converted/",
        &options_with(script),
    )
    .await
    .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.succeeded, 2);
    assert!(result.staged);
    assert_eq!(result.disk.as_deref(), Some("outbox"));

    // Outcomes name the remote keys, not staged scratch paths.
    assert_eq!(result.outcomes[0].input, PathBuf::from("in/report.docx"));
    assert_eq!(result.outcomes[1].input, PathBuf::from("in/deck.pptx"));

    // Output basenames keep the original stems, not staging uuids.
    assert_eq!(
        result.outcomes[0].remote_key.as_deref(),
        Some("converted/report.pdf")
    );
    assert_eq!(
        result.outcomes[1].remote_key.as_deref(),
        Some("converted/deck.pdf")
    );
    assert_eq!(dest.keys(), vec!["converted/deck.pdf", "converted/report.pdf"]);
}

#[tokio::test]
async fn missing_remote_key_fails_only_that_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = common::ok_renderer(dir.path());

    let source = Arc::new(MemoryStorage::new("inbox"));
    source.insert("in/present.docx", b"fake docx");
    let dest = Arc::new(MemoryStorage::new("outbox"));

    let result = convert_batch_staged(
        vec![
            ConversionRequest::new("in/absent.docx"),
            ConversionRequest::new("in/present.docx"),
        ],
        source,
        dest,
        dir.path().join("out"),
        "converted",
        &options_with(script),
    )
    .await
    .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);

    // Submission order holds even with a prerecorded staging failure first.
    assert_eq!(result.outcomes[0].input, PathBuf::from("in/absent.docx"));
    assert_eq!(result.outcomes[0].error_kind(), Some(ErrorKind::FileNotFound));
    assert!(matches!(
        result.outcomes[0].error,
        Some(FileError::RemoteMissing { .. })
    ));
    assert!(result.outcomes[1].is_success());
}

#[tokio::test]
#[serial]
async fn upload_failure_flips_outcome_and_scratch_is_removed() {
    let scratch_root = tempfile::tempdir().unwrap();
    std::env::set_var("TMPDIR", scratch_root.path());

    let dir = tempfile::tempdir().unwrap();
    let script = common::ok_renderer(dir.path());

    let source = Arc::new(MemoryStorage::new("inbox"));
    source.insert("in/report.docx", b"fake docx");
    let dest = Arc::new(MemoryStorage::failing_uploads("outbox"));

    let result = convert_batch_staged(
        vec![ConversionRequest::new("in/report.docx")],
        source,
        dest,
        dir.path().join("out"),
        "converted",
        &options_with(script),
    )
    .await
    .unwrap();

    std::env::remove_var("TMPDIR");

    // The conversion succeeded locally, but the batch reports the upload
    // failure as this file's outcome.
    assert_eq!(result.succeeded, 0);
    assert_eq!(result.failed, 1);
    assert!(matches!(
        result.outcomes[0].error,
        Some(FileError::StorageFailed { .. })
    ));
    assert_eq!(result.outcomes[0].error_kind(), Some(ErrorKind::WriteFailed));
    assert!(result.outcomes[0].remote_key.is_none());

    // No staging or profile scratch left behind despite the failure.
    let leftovers: Vec<_> = std::fs::read_dir(scratch_root.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("doc2pdf-"))
        .collect();
    assert!(leftovers.is_empty(), "leftover scratch: {leftovers:?}");
}

#[tokio::test]
async fn progress_totals_stay_at_batch_size_despite_staging_failures() {
    use doc2pdf::BatchProgress;
    use std::path::Path;

    struct TotalRecorder {
        totals: Mutex<Vec<usize>>,
    }
    impl TotalRecorder {
        fn record(&self, total: usize) {
            self.totals.lock().unwrap().push(total);
        }
    }
    impl BatchProgress for TotalRecorder {
        fn on_file_start(&self, _i: usize, _input: &Path, total: usize) {
            self.record(total);
        }
        fn on_file_complete(&self, _i: usize, _input: &Path, _output: &Path, total: usize) {
            self.record(total);
        }
        fn on_file_error(&self, _i: usize, _input: &Path, total: usize, _error: String) {
            self.record(total);
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let script = common::ok_renderer(dir.path());

    let source = Arc::new(MemoryStorage::new("inbox"));
    source.insert("in/a.docx", b"fake docx");
    source.insert("in/b.docx", b"fake docx");
    // The trailing key is missing, so it never reaches the worker pool.
    let dest = Arc::new(MemoryStorage::new("outbox"));

    let recorder = Arc::new(TotalRecorder {
        totals: Mutex::new(Vec::new()),
    });
    let options = ConvertOptions::builder()
        .soffice_path(script)
        .workers(2)
        .progress(recorder.clone())
        .build()
        .unwrap();

    let result = convert_batch_staged(
        vec![
            ConversionRequest::new("in/a.docx"),
            ConversionRequest::new("in/b.docx"),
            ConversionRequest::new("in/gone.docx"),
        ],
        source,
        dest,
        dir.path().join("out"),
        "converted",
        &options,
    )
    .await
    .unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.failed, 1);

    // Every callback saw the real batch size, not the post-staging pool size.
    let totals = recorder.totals.lock().unwrap();
    assert!(!totals.is_empty());
    assert!(
        totals.iter().all(|&t| t == 3),
        "expected every reported total to be 3, got {totals:?}"
    );
}

#[tokio::test]
async fn local_disks_skip_staging_entirely() {
    let dir = tempfile::tempdir().unwrap();
    let script = common::ok_renderer(dir.path());
    let input = common::sample_doc(dir.path(), "plain.docx");

    let source = Arc::new(LocalDisk::new("local-in", dir.path()));
    let dest = Arc::new(LocalDisk::new("local-out", dir.path()));

    let result = convert_batch_staged(
        vec![ConversionRequest::new(&input)],
        source,
        dest,
        dir.path().join("out"),
        "unused",
        &options_with(script),
    )
    .await
    .unwrap();

    assert!(!result.staged);
    assert!(result.disk.is_none());
    assert!(result.all_succeeded());
    assert!(dir.path().join("out/plain.pdf").is_file());
}
