//! Renderer invocation: drive headless LibreOffice and discover its output.
//!
//! The rest of the crate never sees soffice flags — everything renderer-
//! specific lives behind the [`Renderer`] trait, so an in-process renderer
//! can be substituted for the `native` bypass option without touching the
//! orchestration layer.
//!
//! ## Output discovery
//!
//! soffice writes the converted file into `--outdir` under a name it picks
//! itself, and its exit code alone does not prove an output exists. Discovery
//! scans the scratch directory's top level and requires **exactly one**
//! qualifying entry: zero means the renderer lied about success, more than
//! one means the result is ambiguous (e.g. auxiliary files), and both are
//! reported as conversion failures with the captured diagnostics attached.

use crate::config::ConvertOptions;
use crate::error::FileError;
use crate::pipeline::profile::{ExecutionProfile, PROFILE_DIR};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Environment variable overridden to the scratch directory so the renderer
/// cannot fall back to the real user profile.
#[cfg(windows)]
const HOME_VAR: &str = "USERPROFILE";
#[cfg(not(windows))]
const HOME_VAR: &str = "HOME";

/// The output of one successful renderer invocation.
///
/// Holds the [`ExecutionProfile`] so the scratch directory stays alive until
/// the caller has relocated `path` out of it; dropping this value deletes
/// the scratch tree.
pub struct RenderedOutput {
    /// The generated file, still inside the scratch directory.
    pub path: PathBuf,
    /// Combined stdout/stderr captured from the renderer.
    pub diagnostic: String,
    _profile: ExecutionProfile,
}

/// A document renderer: converts one input file to the requested format.
///
/// [`SofficeRenderer`] is the default implementation. An in-process renderer
/// can be injected via [`crate::config::ConvertOptionsBuilder::renderer`] for
/// the `native` bypass path; the orchestration algorithm is identical either
/// way.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `input` with the given export filter, returning the generated
    /// file inside renderer-owned scratch space.
    async fn render(
        &self,
        input: &Path,
        filter: &str,
        options: &ConvertOptions,
    ) -> Result<RenderedOutput, FileError>;
}

/// Drives a headless `soffice` subprocess with per-invocation isolation.
pub struct SofficeRenderer {
    binary: PathBuf,
}

impl SofficeRenderer {
    /// Use an explicit soffice binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Resolve the binary from options, then the `SOFFICE_PATH` environment
    /// variable, then `soffice` on `PATH`.
    pub fn from_options(options: &ConvertOptions) -> Self {
        let binary = options
            .soffice_path
            .clone()
            .or_else(|| std::env::var_os("SOFFICE_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("soffice"));
        Self { binary }
    }
}

#[async_trait]
impl Renderer for SofficeRenderer {
    async fn render(
        &self,
        input: &Path,
        filter: &str,
        options: &ConvertOptions,
    ) -> Result<RenderedOutput, FileError> {
        if !input.exists() {
            return Err(FileError::NotFound {
                path: input.to_path_buf(),
            });
        }

        let profile = ExecutionProfile::create().map_err(|e| FileError::ConversionFailed {
            path: input.to_path_buf(),
            detail: format!("failed to create scratch profile: {e}"),
        })?;

        // Canonicalisation is best-effort: soffice resolves relative paths
        // against its own cwd, so prefer absolute, but never abort here.
        let abs_input = input
            .canonicalize()
            .unwrap_or_else(|_| input.to_path_buf());

        let mut cmd = Command::new(&self.binary);
        cmd.arg(format!(
            "-env:UserInstallation={}",
            profile.installation_url()
        ))
        .arg("--headless")
        .arg("--invisible")
        .arg("--nologo")
        .arg("--nofirststartwizard")
        .arg("--convert-to")
        .arg(filter)
        .arg("--outdir")
        .arg(profile.output_dir())
        .arg(&abs_input)
        .env(HOME_VAR, profile.output_dir())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        debug!(
            input = %abs_input.display(),
            filter,
            scratch = %profile.output_dir().display(),
            "invoking renderer"
        );

        let child = cmd.spawn().map_err(|e| FileError::ConversionFailed {
            path: input.to_path_buf(),
            detail: format!("failed to launch renderer '{}': {e}", self.binary.display()),
        })?;

        // Dropping the wait future on timeout kills the child via
        // kill_on_drop; the subprocess is never left running.
        let deadline = Duration::from_secs(options.timeout_secs);
        let output = match timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(FileError::ConversionFailed {
                    path: input.to_path_buf(),
                    detail: format!("failed to collect renderer output: {e}"),
                });
            }
            Err(_) => {
                warn!(input = %input.display(), secs = options.timeout_secs, "renderer timed out, terminating");
                return Err(FileError::Timeout {
                    path: input.to_path_buf(),
                    secs: options.timeout_secs,
                });
            }
        };

        let diagnostic = combine_output(&output.stdout, &output.stderr);

        if !output.status.success() {
            return Err(FileError::ConversionFailed {
                path: input.to_path_buf(),
                detail: format!("renderer exited with {}: {diagnostic}", output.status),
            });
        }

        let generated = discover_output(profile.output_dir(), filter).map_err(|detail| {
            FileError::ConversionFailed {
                path: input.to_path_buf(),
                detail: if diagnostic.is_empty() {
                    detail
                } else {
                    format!("{detail}: {diagnostic}")
                },
            }
        })?;

        debug!(generated = %generated.display(), "renderer output discovered");

        Ok(RenderedOutput {
            path: generated,
            diagnostic,
            _profile: profile,
        })
    }
}

/// Join captured stdout and stderr into one diagnostic string.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut out = String::from_utf8_lossy(stdout).trim().to_string();
    let err = String::from_utf8_lossy(stderr);
    let err = err.trim();
    if !err.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(err);
    }
    out
}

/// Find the single generated output in the scratch directory's top level.
///
/// PDF-producing filters require a `.pdf` suffix; arbitrary-format filters
/// accept any non-hidden file that is not the profile directory. Zero or
/// multiple qualifying entries are both failures — exit code zero proves
/// nothing about the output.
fn discover_output(scratch: &Path, filter: &str) -> Result<PathBuf, String> {
    let want_pdf = filter == "pdf" || filter.starts_with("pdf:");

    let entries = std::fs::read_dir(scratch)
        .map_err(|e| format!("failed to scan renderer output directory: {e}"))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("failed to scan renderer output directory: {e}"))?;
        let file_type = entry
            .file_type()
            .map_err(|e| format!("failed to scan renderer output directory: {e}"))?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || name == PROFILE_DIR {
            continue;
        }
        if want_pdf && !name.to_ascii_lowercase().ends_with(".pdf") {
            continue;
        }
        found.push(entry.path());
    }

    if found.len() > 1 {
        return Err(format!(
            "ambiguous renderer output: {} candidate files",
            found.len()
        ));
    }
    found
        .pop()
        .ok_or_else(|| "renderer exited successfully but produced no output".to_string())
}
