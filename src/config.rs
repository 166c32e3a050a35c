//! Configuration types for document-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConvertOptions`], built
//! via its [`ConvertOptionsBuilder`]. Keeping every knob in one immutable
//! record makes it trivial to share options across workers and to diff two
//! runs to understand why their outputs differ. The builder carries no
//! behaviour of its own — it is pure data assembly with validation at the end.

use crate::error::ConvertError;
use crate::pipeline::soffice::Renderer;
use crate::progress::BatchProgress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Page size forwarded to renderer implementations that honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

/// Page orientation forwarded to renderer implementations that honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Options for a single conversion or a whole batch.
///
/// Built via [`ConvertOptions::builder()`] or [`ConvertOptions::default()`].
///
/// # Example
/// ```rust
/// use doc2pdf::{ConvertOptions, PageSize, Orientation};
///
/// let options = ConvertOptions::builder()
///     .page_size(PageSize::A4)
///     .orientation(Orientation::Landscape)
///     .workers(4)
///     .timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConvertOptions {
    /// Page size hint. Default: A4.
    ///
    /// The soffice renderer takes the page geometry from the document itself;
    /// in-process renderers supplied via [`ConvertOptionsBuilder::renderer`]
    /// may honour this field instead.
    pub page_size: PageSize,

    /// Page orientation hint. Default: portrait.
    pub orientation: Orientation,

    /// Page margin in millimetres, where the renderer supports it.
    pub margin_mm: Option<f32>,

    /// Base font size in points, where the renderer supports it.
    pub font_size: Option<u32>,

    /// Treat the first spreadsheet row as a header row. Default: false.
    pub header_row: bool,

    /// Header text placed on every page, where the renderer supports it.
    pub header_text: Option<String>,

    /// Footer text placed on every page, where the renderer supports it.
    pub footer_text: Option<String>,

    /// Number of concurrent renderer invocations in a batch.
    /// Default: host parallelism, clamped to 1..=8.
    ///
    /// Each worker drives one subprocess with its own isolated profile, so
    /// conversions parallelise safely. LibreOffice start-up is heavyweight;
    /// beyond ~8 workers the host is usually saturated rather than sped up.
    pub workers: usize,

    /// Per-file deadline in seconds. Default: 120.
    ///
    /// On expiry the subprocess is terminated (not orphaned) and the file is
    /// recorded as a timeout; sibling conversions are unaffected.
    pub timeout_secs: u64,

    /// Bypass the external renderer and use the in-process renderer supplied
    /// via [`ConvertOptionsBuilder::renderer`]. Default: false.
    pub native: bool,

    /// Explicit path to the soffice binary. Falls back to the `SOFFICE_PATH`
    /// environment variable, then to `soffice` on `PATH`.
    pub soffice_path: Option<PathBuf>,

    /// Pre-constructed renderer. Takes precedence over the soffice default.
    pub renderer: Option<Arc<dyn Renderer>>,

    /// Progress callback invoked per file and per batch.
    pub progress: Option<Arc<dyn BatchProgress>>,

    /// Free-form pass-through options for forward compatibility.
    /// The built-in renderers ignore keys they do not understand.
    pub extra: BTreeMap<String, String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            orientation: Orientation::default(),
            margin_mm: None,
            font_size: None,
            header_row: false,
            header_text: None,
            footer_text: None,
            workers: default_workers(),
            timeout_secs: 120,
            native: false,
            soffice_path: None,
            renderer: None,
            progress: None,
            extra: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("page_size", &self.page_size)
            .field("orientation", &self.orientation)
            .field("margin_mm", &self.margin_mm)
            .field("font_size", &self.font_size)
            .field("header_row", &self.header_row)
            .field("header_text", &self.header_text)
            .field("footer_text", &self.footer_text)
            .field("workers", &self.workers)
            .field("timeout_secs", &self.timeout_secs)
            .field("native", &self.native)
            .field("soffice_path", &self.soffice_path)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn Renderer>"))
            .field("progress", &self.progress.as_ref().map(|_| "<dyn BatchProgress>"))
            .field("extra", &self.extra)
            .finish()
    }
}

impl ConvertOptions {
    /// Create a new builder for `ConvertOptions`.
    pub fn builder() -> ConvertOptionsBuilder {
        ConvertOptionsBuilder {
            options: Self::default(),
        }
    }
}

/// Host parallelism, clamped to 1..=8.
pub(crate) fn default_workers() -> usize {
    num_cpus::get().clamp(1, 8)
}

/// Builder for [`ConvertOptions`].
#[derive(Debug)]
pub struct ConvertOptionsBuilder {
    options: ConvertOptions,
}

impl ConvertOptionsBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.options.page_size = size;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.options.orientation = orientation;
        self
    }

    pub fn margin_mm(mut self, mm: f32) -> Self {
        self.options.margin_mm = Some(mm.max(0.0));
        self
    }

    pub fn font_size(mut self, pt: u32) -> Self {
        self.options.font_size = Some(pt);
        self
    }

    pub fn header_row(mut self, v: bool) -> Self {
        self.options.header_row = v;
        self
    }

    pub fn header_text(mut self, text: impl Into<String>) -> Self {
        self.options.header_text = Some(text.into());
        self
    }

    pub fn footer_text(mut self, text: impl Into<String>) -> Self {
        self.options.footer_text = Some(text.into());
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.options.workers = n.max(1);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.options.timeout_secs = secs.max(1);
        self
    }

    pub fn native(mut self, v: bool) -> Self {
        self.options.native = v;
        self
    }

    pub fn soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.soffice_path = Some(path.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.options.renderer = Some(renderer);
        self
    }

    pub fn progress(mut self, progress: Arc<dyn BatchProgress>) -> Self {
        self.options.progress = Some(progress);
        self
    }

    /// Add a free-form pass-through option.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.extra.insert(key.into(), value.into());
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ConvertOptions, ConvertError> {
        let o = &self.options;
        if o.workers == 0 {
            return Err(ConvertError::InvalidConfig("workers must be ≥ 1".into()));
        }
        if o.timeout_secs == 0 {
            return Err(ConvertError::InvalidConfig(
                "timeout_secs must be ≥ 1".into(),
            ));
        }
        if o.native && o.renderer.is_none() {
            return Err(ConvertError::InvalidConfig(
                "native conversion requested but no in-process renderer was supplied".into(),
            ));
        }
        Ok(self.options)
    }
}
