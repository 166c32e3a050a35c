//! Atomic relocation of a rendered output to its final destination.
//!
//! Rename first; when that fails (typically a cross-device move from the
//! scratch tempdir to the destination filesystem), fall back to copying into
//! a hidden sibling of the destination and renaming it into place. Readers of
//! the destination path never observe a partially written file.

use crate::error::FileError;
use std::fs;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Move `src` to `dest`, creating parent directories as needed.
///
/// `src` is gone afterwards on success. On failure the destination is left
/// untouched and any intermediate temp file is removed.
pub fn place_output(src: &Path, dest: &Path) -> Result<(), FileError> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| FileError::WriteFailed {
                path: dest.to_path_buf(),
                detail: format!("failed to create output directory: {e}"),
            })?;
        }
    }

    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                src = %src.display(),
                dest = %dest.display(),
                error = %rename_err,
                "rename failed, copying via temp file"
            );
            copy_via_tmp(src, dest)
        }
    }
}

/// Copy into a uniquely named hidden sibling of `dest`, then rename. The
/// sibling lives on the destination filesystem, so the final rename is
/// atomic.
fn copy_via_tmp(src: &Path, dest: &Path) -> Result<(), FileError> {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tmp = dest.with_file_name(format!(".{name}.tmp-{}", Uuid::new_v4()));

    fs::copy(src, &tmp).map_err(|e| FileError::WriteFailed {
        path: dest.to_path_buf(),
        detail: format!("failed to copy output into place: {e}"),
    })?;

    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(FileError::WriteFailed {
            path: dest.to_path_buf(),
            detail: format!("failed to move output into place: {e}"),
        });
    }

    // Source removal is best-effort; the scratch directory it lives in is
    // deleted when the execution profile drops.
    let _ = fs::remove_file(src);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("out.pdf");
        let dest = dir.path().join("final.pdf");
        fs::write(&src, b"%PDF-1.4 content").unwrap();

        place_output(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"%PDF-1.4 content");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("out.pdf");
        let dest = dir.path().join("a/b/c/final.pdf");
        fs::write(&src, b"%PDF-1.4").unwrap();

        place_output(&src, &dest).unwrap();
        assert!(dest.is_file());
    }

    #[test]
    fn copy_fallback_is_byte_identical_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("out.pdf");
        let dest = dir.path().join("final.pdf");
        let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
        fs::write(&src, &payload).unwrap();

        copy_via_tmp(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), payload);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty(), "temp siblings must be cleaned up");
    }

    #[test]
    fn overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("out.pdf");
        let dest = dir.path().join("final.pdf");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        place_output(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }
}
