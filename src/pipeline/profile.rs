//! Per-invocation execution profiles and the `file://` locator they require.
//!
//! ## Why a fresh profile per invocation?
//!
//! LibreOffice serialises access to a user profile: two headless instances
//! pointed at the same `UserInstallation` silently queue behind a profile
//! lock (or corrupt it). Giving every invocation a throw-away profile inside
//! a `TempDir` makes concurrent conversions genuinely parallel, and RAII
//! guarantees the scratch directory is removed on every exit path — success,
//! error, panic, or task cancellation.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the profile subdirectory inside the scratch directory.
pub const PROFILE_DIR: &str = "profile";

/// Convert an absolute filesystem path to the `file://` URL form the
/// renderer's `UserInstallation` argument requires.
///
/// Pure string transform, no filesystem access. Backslashes are normalised
/// to forward slashes; a Windows drive-letter path gets the
/// `file:///C:/...` form, everything else `file:///...`.
pub fn path_to_file_url(path: &Path) -> String {
    let p = path.to_string_lossy().replace('\\', "/");
    let bytes = p.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        format!("file:///{p}")
    } else {
        format!("file://{p}")
    }
}

/// An isolated scratch directory for exactly one renderer invocation.
///
/// Layout:
/// ```text
/// <tmp>/doc2pdf-XXXXXX/          scratch root: renderer --outdir, HOME override
/// <tmp>/doc2pdf-XXXXXX/profile/  fresh UserInstallation profile
/// ```
///
/// Dropping the profile deletes the whole tree. Profiles are never pooled or
/// reused across invocations.
pub struct ExecutionProfile {
    scratch: TempDir,
    profile: PathBuf,
}

impl ExecutionProfile {
    /// Create a fresh scratch directory with its profile subdirectory.
    pub fn create() -> io::Result<Self> {
        let scratch = tempfile::Builder::new().prefix("doc2pdf-").tempdir()?;
        let profile = scratch.path().join(PROFILE_DIR);
        std::fs::create_dir(&profile)?;
        Ok(Self { scratch, profile })
    }

    /// The scratch root: the renderer's output directory and home override.
    pub fn output_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// The `file://` locator for the `UserInstallation` argument.
    pub fn installation_url(&self) -> String {
        path_to_file_url(&self.profile)
    }
}
