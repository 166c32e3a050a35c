//! doc2pdf command-line interface.
//!
//! Converts one or more office documents to PDF via headless LibreOffice,
//! with a progress bar, per-file error reporting, and optional JSON output.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use doc2pdf::{
    convert_batch, BatchProgress, ConversionRequest, ConvertOptions, Orientation, PageSize,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A3 => PageSize::A3,
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::A5 => PageSize::A5,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(v: OrientationArg) -> Self {
        match v {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

/// Convert office documents to PDF with headless LibreOffice.
#[derive(Parser, Debug)]
#[command(name = "doc2pdf", version, about)]
struct Cli {
    /// Input documents (doc, docx, odt, xls, xlsx, ods, ppt, pptx, odp, ...).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for the generated PDFs.
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Explicit export filter or target format (e.g. pdf:writer_pdf_Export).
    #[arg(long)]
    format: Option<String>,

    /// Concurrent renderer subprocesses. Defaults to host parallelism (max 8).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-file timeout in seconds.
    #[arg(short, long, default_value_t = 120)]
    timeout: u64,

    /// Path to the soffice binary.
    #[arg(long, env = "SOFFICE_PATH")]
    soffice: Option<PathBuf>,

    /// Page size hint.
    #[arg(long, value_enum)]
    page_size: Option<PageSizeArg>,

    /// Page orientation hint.
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Page margin in millimetres.
    #[arg(long)]
    margin: Option<f32>,

    /// Base font size in points.
    #[arg(long)]
    font_size: Option<u32>,

    /// Treat the first spreadsheet row as a header row.
    #[arg(long)]
    header_row: bool,

    /// Header text placed on every page.
    #[arg(long)]
    header_text: Option<String>,

    /// Footer text placed on every page.
    #[arg(long)]
    footer_text: Option<String>,

    /// Print the batch result as JSON instead of a summary.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl BatchProgress for BarProgress {
    fn on_file_start(&self, _index: usize, input: &Path, _total: usize) {
        self.bar.set_message(format!("{}", input.display()));
    }

    fn on_file_complete(&self, _index: usize, _input: &Path, _output: &Path, _total: usize) {
        self.bar.inc(1);
    }

    fn on_file_error(&self, _index: usize, input: &Path, _total: usize, error: String) {
        self.bar
            .println(format!("✗ {}: {error}", input.display()));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _succeeded: usize) {
        self.bar.finish_and_clear();
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "off"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_options(cli: &Cli) -> Result<ConvertOptions> {
    let mut builder = ConvertOptions::builder().timeout_secs(cli.timeout);
    if let Some(workers) = cli.workers {
        builder = builder.workers(workers);
    }
    if let Some(path) = &cli.soffice {
        builder = builder.soffice_path(path.clone());
    }
    if let Some(size) = cli.page_size {
        builder = builder.page_size(size.into());
    }
    if let Some(orientation) = cli.orientation {
        builder = builder.orientation(orientation.into());
    }
    if let Some(margin) = cli.margin {
        builder = builder.margin_mm(margin);
    }
    if let Some(pt) = cli.font_size {
        builder = builder.font_size(pt);
    }
    if cli.header_row {
        builder = builder.header_row(true);
    }
    if let Some(text) = &cli.header_text {
        builder = builder.header_text(text.as_str());
    }
    if let Some(text) = &cli.footer_text {
        builder = builder.footer_text(text.as_str());
    }
    if !cli.no_progress && !cli.json {
        builder = builder.progress(Arc::new(BarProgress::new(cli.inputs.len())));
    }
    builder.build().context("invalid options")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let options = build_options(&cli)?;

    let requests: Vec<ConversionRequest> = cli
        .inputs
        .iter()
        .map(|input| {
            let mut request = ConversionRequest::new(input.clone());
            if let Some(format) = &cli.format {
                request = request.with_format(format.clone());
            }
            request
        })
        .collect();

    let result = convert_batch(requests, &cli.output_dir, &options)
        .await
        .context("batch conversion failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for outcome in &result.outcomes {
            match (&outcome.output, &outcome.error) {
                (Some(output), None) => {
                    println!(
                        "✓ {} → {} ({} ms)",
                        outcome.input.display(),
                        output.display(),
                        outcome.duration_ms
                    );
                }
                (_, Some(error)) => {
                    eprintln!("✗ {}: {error}", outcome.input.display());
                }
                _ => {}
            }
        }
        println!(
            "{}/{} converted in {} ms",
            result.succeeded, result.total, result.duration_ms
        );
    }

    if !result.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}
