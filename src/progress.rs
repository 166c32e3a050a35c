//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgress>`] via
//! [`crate::config::ConvertOptionsBuilder::progress`] to receive real-time
//! events as the orchestrator works through a batch.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a job-queue status record, or
//! a terminal progress bar — without the library knowing anything about how
//! the host application communicates. The trait is `Send + Sync` because
//! files are converted concurrently by the worker pool.

use std::path::Path;
use std::sync::Arc;

/// Called by the batch orchestrator as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `on_file_*` methods may be called concurrently from
/// different workers; implementations must protect shared mutable state.
pub trait BatchProgress: Send + Sync {
    /// Called once before any file is converted.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a file's renderer invocation starts.
    ///
    /// `index` is the file's submission position (0-based).
    fn on_file_start(&self, index: usize, input: &Path, total: usize) {
        let _ = (index, input, total);
    }

    /// Called when a file converted successfully.
    fn on_file_complete(&self, index: usize, input: &Path, output: &Path, total: usize) {
        let _ = (index, input, output, total);
    }

    /// Called when a file failed.
    ///
    /// The error is passed as an owned `String` so the callback can be moved
    /// into spawned tasks without lifetime friction.
    fn on_file_error(&self, index: usize, input: &Path, total: usize, error: String) {
        let _ = (index, input, total, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl BatchProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::ConvertOptions`].
pub type ProgressHook = Arc<dyn BatchProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracking {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        batch_total: AtomicUsize,
        batch_succeeded: AtomicUsize,
    }

    impl BatchProgress for Tracking {
        fn on_batch_start(&self, total: usize) {
            self.batch_total.store(total, Ordering::SeqCst);
        }
        fn on_file_start(&self, _index: usize, _input: &Path, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_file_complete(&self, _index: usize, _input: &Path, _output: &Path, _total: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_file_error(&self, _index: usize, _input: &Path, _total: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
        fn on_batch_complete(&self, _total: usize, succeeded: usize) {
            self.batch_succeeded.store(succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_progress_does_not_panic() {
        let cb = NoopProgress;
        cb.on_batch_start(3);
        cb.on_file_start(0, Path::new("a.docx"), 3);
        cb.on_file_complete(0, Path::new("a.docx"), Path::new("a.pdf"), 3);
        cb.on_file_error(1, Path::new("b.docx"), 3, "boom".to_string());
        cb.on_batch_complete(3, 2);
    }

    #[test]
    fn tracking_receives_events() {
        let t = Tracking {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            batch_total: AtomicUsize::new(0),
            batch_succeeded: AtomicUsize::new(0),
        };

        t.on_batch_start(2);
        t.on_file_start(0, Path::new("a.docx"), 2);
        t.on_file_complete(0, Path::new("a.docx"), Path::new("a.pdf"), 2);
        t.on_file_start(1, Path::new("b.docx"), 2);
        t.on_file_error(1, Path::new("b.docx"), 2, "renderer exited 1".to_string());
        t.on_batch_complete(2, 1);

        assert_eq!(t.starts.load(Ordering::SeqCst), 2);
        assert_eq!(t.completes.load(Ordering::SeqCst), 1);
        assert_eq!(t.errors.load(Ordering::SeqCst), 1);
        assert_eq!(t.batch_total.load(Ordering::SeqCst), 2);
        assert_eq!(t.batch_succeeded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_progress_moves_into_spawn() {
        let cb: ProgressHook = Arc::new(NoopProgress);
        let input = PathBuf::from("deck.pptx");
        std::thread::spawn(move || {
            cb.on_file_error(0, &input, 1, "timed out".to_string());
        })
        .join()
        .unwrap();
    }
}
