//! # doc2pdf
//!
//! Convert office documents (Word, Excel, PowerPoint, OpenDocument and
//! friends) to PDF by driving a headless LibreOffice subprocess, with batch
//! orchestration and optional remote-storage staging.
//!
//! ## Pipeline
//!
//! ```text
//! input ──▶ filter ──▶ profile ──▶ soffice ──▶ place ──▶ output.pdf
//!           (export    (isolated   (headless   (atomic
//!            filter)    scratch)    render)     move)
//! ```
//!
//! Every invocation gets its own throw-away LibreOffice profile, so batch
//! workers run genuinely in parallel, and scratch space is removed on every
//! exit path. Output discovery is strict: after a successful exit the scratch
//! directory must contain exactly one qualifying file, otherwise the file is
//! recorded as failed with the renderer's diagnostics attached.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use doc2pdf::{convert, convert_batch, ConversionRequest, ConvertOptions};
//!
//! # async fn run() -> Result<(), doc2pdf::ConvertError> {
//! // One file.
//! let pdf = convert("report.docx", "out/report.pdf", &ConvertOptions::default()).await?;
//!
//! // A batch, four subprocesses at a time, 60s per file.
//! let options = ConvertOptions::builder()
//!     .workers(4)
//!     .timeout_secs(60)
//!     .build()?;
//! let result = convert_batch(
//!     vec![
//!         ConversionRequest::new("deck.pptx"),
//!         ConversionRequest::new("budget.xlsx"),
//!     ],
//!     "out",
//!     &options,
//! )
//! .await?;
//! for outcome in &result.outcomes {
//!     match &outcome.error {
//!         None => println!("ok   {}", outcome.input.display()),
//!         Some(e) => println!("fail {}: {e}", outcome.input.display()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error model
//!
//! Fatal problems (bad configuration, unusable output directory) are
//! [`ConvertError`]s returned from the top-level calls. Per-file problems
//! (missing input, renderer crash, timeout, upload miss) are [`FileError`]s
//! recorded inside [`ConversionOutcome`] — a batch with failures still
//! returns `Ok`, and siblings are unaffected.

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod storage;

pub use batch::{convert_batch, convert_batch_staged, ConversionRequest};
pub use config::{ConvertOptions, ConvertOptionsBuilder, Orientation, PageSize};
pub use convert::{convert, convert_sync, convert_to};
pub use error::{ConvertError, ErrorKind, FileError};
pub use output::{BatchResult, ConversionOutcome};
pub use pipeline::filter::{filter_for_extension, filter_for_path};
pub use pipeline::soffice::{Renderer, RenderedOutput, SofficeRenderer};
pub use progress::{BatchProgress, NoopProgress, ProgressHook};
pub use storage::{HttpStorage, LocalDisk, StagingArea, Storage};
