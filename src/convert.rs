//! Single-file conversion entry points.
//!
//! [`convert`] is the minimal API: one input, one output, options. Batch
//! callers use [`crate::batch::convert_batch`], which runs this same
//! render-and-place sequence per file under a bounded worker pool.

use crate::config::ConvertOptions;
use crate::error::{ConvertError, FileError};
use crate::pipeline::filter::filter_for_path;
use crate::pipeline::place::place_output;
use crate::pipeline::soffice::{Renderer, SofficeRenderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Convert one document to PDF.
///
/// The export filter is resolved from the input's extension. Returns the
/// output path on success.
///
/// # Example
/// ```rust,no_run
/// use doc2pdf::{convert, ConvertOptions};
///
/// # async fn run() -> Result<(), doc2pdf::ConvertError> {
/// let pdf = convert("report.docx", "out/report.pdf", &ConvertOptions::default()).await?;
/// println!("wrote {}", pdf.display());
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<PathBuf, ConvertError> {
    let input = input.as_ref();
    convert_to(input, output, filter_for_path(input), options).await
}

/// Convert one document with an explicit export filter or format name.
///
/// `format` is passed to the renderer verbatim, so both plain target formats
/// (`"pdf"`, `"docx"`) and full filter specifications
/// (`"pdf:writer_pdf_Export"`) work.
pub async fn convert_to(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    format: &str,
    options: &ConvertOptions,
) -> Result<PathBuf, ConvertError> {
    let input = input.as_ref();
    let output = output.as_ref();
    let renderer = resolve_renderer(options)?;

    let (placed, _) = render_and_place(renderer.as_ref(), input, output, format, options).await?;
    info!(input = %input.display(), output = %placed.display(), "conversion complete");
    Ok(placed)
}

/// Blocking wrapper around [`convert`] for callers without an async runtime.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<PathBuf, ConvertError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("failed to start async runtime: {e}")))?;
    runtime.block_on(convert(input, output, options))
}

/// Pick the renderer for this run: an injected one wins, otherwise the
/// soffice subprocess renderer. `native` without an injected renderer is
/// rejected here as well, for options constructed without the builder.
pub(crate) fn resolve_renderer(
    options: &ConvertOptions,
) -> Result<Arc<dyn Renderer>, ConvertError> {
    if let Some(renderer) = &options.renderer {
        return Ok(Arc::clone(renderer));
    }
    if options.native {
        return Err(ConvertError::InvalidConfig(
            "native conversion requested but no in-process renderer was supplied".into(),
        ));
    }
    Ok(Arc::new(SofficeRenderer::from_options(options)))
}

/// Render `input` and relocate the result to `dest`.
///
/// Returns the final path and the renderer's diagnostics (if any). The
/// renderer's scratch directory is dropped — and therefore deleted — after
/// placement, on every path through this function.
pub(crate) async fn render_and_place(
    renderer: &dyn Renderer,
    input: &Path,
    dest: &Path,
    filter: &str,
    options: &ConvertOptions,
) -> Result<(PathBuf, Option<String>), FileError> {
    let rendered = renderer.render(input, filter, options).await?;
    place_output(&rendered.path, dest)?;
    let diagnostic = if rendered.diagnostic.is_empty() {
        None
    } else {
        Some(rendered.diagnostic.clone())
    };
    Ok((dest.to_path_buf(), diagnostic))
}
