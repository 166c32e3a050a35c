//! Batch orchestration: a bounded worker pool over single-file conversions.
//!
//! The orchestrator guarantees:
//!
//! * at most `options.workers` renderer subprocesses run at once,
//! * results come back in submission order regardless of completion order,
//! * one bad file never aborts its siblings — per-file failures are recorded
//!   in the outcome list, and the batch call only errors for shared setup
//!   failures (unusable output directory, invalid configuration).
//!
//! [`convert_batch_staged`] adds remote staging around the same pool:
//! remote inputs are downloaded into a scratch staging area first, and
//! outputs are uploaded to the destination disk after conversion. Staged
//! scratch files are removed whether the batch succeeds or fails.

use crate::config::ConvertOptions;
use crate::convert::{render_and_place, resolve_renderer};
use crate::error::{ConvertError, FileError};
use crate::output::{BatchResult, ConversionOutcome};
use crate::pipeline::filter::filter_for_path;
use crate::pipeline::soffice::Renderer;
use crate::storage::{StagingArea, Storage};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// One unit of work in a batch.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Local input path, or the remote source key for staged batches.
    pub input: PathBuf,

    /// Explicit output path. Defaults to `<output_dir>/<stem>.<ext>` where
    /// `<ext>` follows the target format (`pdf` unless overridden).
    pub output: Option<PathBuf>,

    /// Explicit export filter or target format, passed to the renderer
    /// verbatim. Defaults to the filter resolved from the input extension.
    pub format: Option<String>,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            format: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Convert a batch of local files into `output_dir`.
///
/// Returns one [`ConversionOutcome`] per request, in submission order. An
/// empty request list yields an empty, successful result.
///
/// # Example
/// ```rust,no_run
/// use doc2pdf::{convert_batch, ConversionRequest, ConvertOptions};
///
/// # async fn run() -> Result<(), doc2pdf::ConvertError> {
/// let requests = vec![
///     ConversionRequest::new("report.docx"),
///     ConversionRequest::new("deck.pptx"),
/// ];
/// let result = convert_batch(requests, "out", &ConvertOptions::default()).await?;
/// println!("{}/{} succeeded", result.succeeded, result.total);
/// # Ok(())
/// # }
/// ```
pub async fn convert_batch(
    requests: Vec<ConversionRequest>,
    output_dir: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<BatchResult, ConvertError> {
    let output_dir = output_dir.as_ref();
    let started = Instant::now();

    std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::WriteFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    let renderer = resolve_renderer(options)?;

    let total = requests.len();
    if let Some(progress) = &options.progress {
        progress.on_batch_start(total);
    }

    let entries: Vec<PoolEntry> = requests
        .into_iter()
        .enumerate()
        .map(|(index, request)| PoolEntry {
            index,
            display_input: request.input.clone(),
            request,
        })
        .collect();

    let outcomes = run_pool(entries, total, renderer, output_dir, options).await;

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    if let Some(progress) = &options.progress {
        progress.on_batch_complete(total, succeeded);
    }
    info!(total, succeeded, "batch complete");

    Ok(BatchResult {
        failed: total - succeeded,
        outcomes,
        total,
        succeeded,
        output_dir: output_dir.to_path_buf(),
        disk: None,
        staged: false,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// Convert a batch whose inputs and/or outputs live on remote storage.
///
/// Remote source inputs are named by key in `ConversionRequest::input`; they
/// are downloaded into a staging area before conversion. When `dest` is
/// remote, each successful output is additionally uploaded under
/// `<remote_dir>/<output basename>`, and the outcome records the remote key.
/// An upload failure flips that file's outcome to a failure.
///
/// Staged scratch files are deleted before this function returns, on success
/// and on failure alike.
pub async fn convert_batch_staged(
    requests: Vec<ConversionRequest>,
    source: Arc<dyn Storage>,
    dest: Arc<dyn Storage>,
    output_dir: impl AsRef<Path>,
    remote_dir: &str,
    options: &ConvertOptions,
) -> Result<BatchResult, ConvertError> {
    let output_dir = output_dir.as_ref();
    let started = Instant::now();

    // Fatal setup happens before the staging area exists so there is nothing
    // to clean up when it fails.
    std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::WriteFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    let renderer = resolve_renderer(options)?;

    let staging = StagingArea::new().map_err(|e| {
        ConvertError::Internal(format!("failed to create staging area: {e}"))
    })?;

    let total = requests.len();
    if let Some(progress) = &options.progress {
        progress.on_batch_start(total);
    }

    // Download remote inputs first. A failed download becomes a prerecorded
    // per-file failure; the rest of the batch proceeds.
    let mut prerecorded: Vec<(usize, ConversionOutcome)> = Vec::new();
    let mut entries: Vec<PoolEntry> = Vec::new();
    for (index, request) in requests.into_iter().enumerate() {
        if source.is_remote() {
            match stage_input(source.as_ref(), &request, &staging, output_dir).await {
                Ok(staged_request) => entries.push(PoolEntry {
                    index,
                    display_input: request.input.clone(),
                    request: staged_request,
                }),
                Err(error) => {
                    if let Some(progress) = &options.progress {
                        progress.on_file_error(index, &request.input, total, error.to_string());
                    }
                    prerecorded.push((index, ConversionOutcome::failed(request.input, error)));
                }
            }
        } else {
            entries.push(PoolEntry {
                index,
                display_input: request.input.clone(),
                request,
            });
        }
    }

    // run_pool returns entries in index order; their indices are the ones
    // not claimed by prerecorded failures.
    let pool_indices: Vec<usize> = entries.iter().map(|e| e.index).collect();
    let pooled = run_pool(entries, total, renderer, output_dir, options).await;

    let mut indexed = prerecorded;
    indexed.extend(pool_indices.into_iter().zip(pooled));
    indexed.sort_by_key(|(index, _)| *index);
    let mut outcomes: Vec<ConversionOutcome> = indexed.into_iter().map(|(_, o)| o).collect();

    // Commit successful outputs to the destination disk.
    if dest.is_remote() {
        commit_outputs(dest.as_ref(), remote_dir, &mut outcomes).await;
    }

    let cleanup = staging.cleanup();
    if let Err(e) = cleanup {
        warn!(error = %e, "failed to remove staged scratch files");
    }

    let mut result = BatchResult {
        outcomes,
        total,
        succeeded: 0,
        failed: 0,
        output_dir: output_dir.to_path_buf(),
        disk: if dest.is_remote() {
            Some(dest.disk_name().to_string())
        } else if source.is_remote() {
            Some(source.disk_name().to_string())
        } else {
            None
        },
        staged: source.is_remote() || dest.is_remote(),
        duration_ms: started.elapsed().as_millis() as u64,
    };
    result.retally();

    if let Some(progress) = &options.progress {
        progress.on_batch_complete(total, result.succeeded);
    }
    info!(
        total,
        succeeded = result.succeeded,
        staged = result.staged,
        "staged batch complete"
    );

    Ok(result)
}

struct PoolEntry {
    index: usize,
    /// The input as the caller named it: restored into the outcome so staged
    /// batches report remote keys, not scratch paths.
    display_input: PathBuf,
    request: ConversionRequest,
}

/// Run the bounded worker pool and return outcomes in submission order.
///
/// `total` is the full batch size, including requests that never reached the
/// pool (prerecorded staging failures), so progress callbacks always report
/// positions against the real batch total.
async fn run_pool(
    entries: Vec<PoolEntry>,
    total: usize,
    renderer: Arc<dyn Renderer>,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Vec<ConversionOutcome> {
    let mut results: Vec<(usize, ConversionOutcome)> = stream::iter(entries)
        .map(|entry| {
            let renderer = Arc::clone(&renderer);
            let output_dir = output_dir.to_path_buf();
            async move {
                if let Some(progress) = &options.progress {
                    progress.on_file_start(entry.index, &entry.display_input, total);
                }

                let mut outcome =
                    run_request(renderer.as_ref(), &entry.request, &output_dir, options).await;
                outcome.input = entry.display_input.clone();

                if let Some(progress) = &options.progress {
                    match (&outcome.output, &outcome.error) {
                        (Some(output), None) => progress.on_file_complete(
                            entry.index,
                            &entry.display_input,
                            output,
                            total,
                        ),
                        (_, Some(error)) => progress.on_file_error(
                            entry.index,
                            &entry.display_input,
                            total,
                            error.to_string(),
                        ),
                        _ => {}
                    }
                }

                (entry.index, outcome)
            }
        })
        .buffer_unordered(options.workers)
        .collect()
        .await;

    // Workers finish in arbitrary order; callers see submission order.
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, outcome)| outcome).collect()
}

/// Convert one request, recording timing and diagnostics.
async fn run_request(
    renderer: &dyn Renderer,
    request: &ConversionRequest,
    output_dir: &Path,
    options: &ConvertOptions,
) -> ConversionOutcome {
    let started = Instant::now();

    let filter = match &request.format {
        Some(format) => format.as_str(),
        None => filter_for_path(&request.input),
    };
    let dest = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(output_dir, &request.input, filter));

    match render_and_place(renderer, &request.input, &dest, filter, options).await {
        Ok((output, diagnostic)) => ConversionOutcome {
            input: request.input.clone(),
            output: Some(output),
            remote_key: None,
            diagnostic,
            duration_ms: started.elapsed().as_millis() as u64,
            error: None,
        },
        Err(error) => {
            warn!(input = %request.input.display(), error = %error, "file failed");
            ConversionOutcome {
                input: request.input.clone(),
                output: None,
                remote_key: None,
                diagnostic: None,
                duration_ms: started.elapsed().as_millis() as u64,
                error: Some(error),
            }
        }
    }
}

/// `<output_dir>/<input stem>.<format extension>`.
fn default_output_path(output_dir: &Path, input: &Path, filter: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{stem}.{}", format_extension(filter)))
}

/// The file extension for a target format: the part before `:` in a filter
/// specification (`pdf:writer_pdf_Export` → `pdf`), or the format itself.
fn format_extension(filter: &str) -> &str {
    match filter.split(':').next() {
        Some(ext) if !ext.is_empty() => ext,
        _ => "pdf",
    }
}

/// Download one remote input into the staging area and rewrite the request
/// to point at the staged local file. The output default is fixed from the
/// *original* key so results keep the caller's basenames.
async fn stage_input(
    source: &dyn Storage,
    request: &ConversionRequest,
    staging: &StagingArea,
    output_dir: &Path,
) -> Result<ConversionRequest, FileError> {
    let key = request.input.to_string_lossy().into_owned();

    if !source.exists(&key).await? {
        return Err(FileError::RemoteMissing { key });
    }
    let bytes = source.get(&key).await?;

    let ext = request
        .input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bin".to_string());
    let staged = staging.write_file(&format!("{}.{ext}", Uuid::new_v4()), &bytes)?;

    let mut staged_request = request.clone();
    if staged_request.output.is_none() {
        // Fix the output from the remote key's stem; the staged uuid name
        // must never leak into the output basename.
        let filter = staged_request
            .format
            .clone()
            .unwrap_or_else(|| filter_for_path(&request.input).to_string());
        staged_request.output = Some(default_output_path(output_dir, &request.input, &filter));
    }
    staged_request.input = staged;
    Ok(staged_request)
}

/// Upload each successful output to the destination disk. Upload failures
/// flip the corresponding outcome to a failure.
async fn commit_outputs(dest: &dyn Storage, remote_dir: &str, outcomes: &mut [ConversionOutcome]) {
    let prefix = remote_dir.trim_matches('/');
    for outcome in outcomes.iter_mut() {
        let Some(output) = outcome.output.clone() else {
            continue;
        };
        if outcome.error.is_some() {
            continue;
        }

        let basename = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.pdf".to_string());
        let key = if prefix.is_empty() {
            basename
        } else {
            format!("{prefix}/{basename}")
        };

        let upload = match std::fs::read(&output) {
            Ok(bytes) => dest.put(&key, &bytes).await,
            Err(e) => Err(FileError::StorageFailed {
                key: key.clone(),
                detail: format!("failed to read local output: {e}"),
            }),
        };

        match upload {
            Ok(()) => outcome.remote_key = Some(key),
            Err(error) => {
                warn!(key = %key, error = %error, "upload failed");
                outcome.output = None;
                outcome.error = Some(error);
            }
        }
    }
}
