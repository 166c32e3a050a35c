//! Shared helpers: stub renderer scripts standing in for soffice.
//!
//! Each script speaks just enough of the soffice CLI for the library —
//! it finds the `--outdir` value and the trailing input path — and then
//! behaves like one failure mode of the real renderer.

#![cfg(unix)]
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Parses `--outdir <dir>` and the trailing input path, like soffice does.
const ARG_PARSE: &str = r#"#!/bin/sh
outdir=""
prev=""
input=""
for a in "$@"; do
  if [ "$prev" = "--outdir" ]; then outdir="$a"; fi
  prev="$a"
  input="$a"
done
base=$(basename "$input")
stem="${base%.*}"
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Renderer that converts successfully: writes `<stem>.pdf` into --outdir.
pub fn ok_renderer(dir: &Path) -> PathBuf {
    let body = format!("{ARG_PARSE}printf '%%PDF-1.4 stub for %s\\n' \"$base\" > \"$outdir/$stem.pdf\"\n");
    write_script(dir, "soffice-ok", &body)
}

/// Renderer that exits non-zero with a diagnostic on stderr.
pub fn failing_renderer(dir: &Path) -> PathBuf {
    let body = "#!/bin/sh\necho 'Error: source file could not be loaded' >&2\nexit 1\n";
    write_script(dir, "soffice-fail", body)
}

/// Renderer that exits zero without producing any output.
pub fn silent_renderer(dir: &Path) -> PathBuf {
    let body = format!("{ARG_PARSE}exit 0\n");
    write_script(dir, "soffice-silent", &body)
}

/// Renderer that produces two PDFs, making discovery ambiguous.
pub fn ambiguous_renderer(dir: &Path) -> PathBuf {
    let body = format!(
        "{ARG_PARSE}printf '%%PDF-1.4 a\\n' > \"$outdir/$stem.pdf\"\nprintf '%%PDF-1.4 b\\n' > \"$outdir/extra.pdf\"\n"
    );
    write_script(dir, "soffice-ambiguous", &body)
}

/// Renderer that drops a `started-<pid>` marker in `sync_dir`, then blocks
/// until `sync_dir/release` appears. Lets tests observe workers mid-flight.
pub fn gated_renderer(dir: &Path, sync_dir: &Path) -> PathBuf {
    let sync = sync_dir.display();
    let body = format!(
        "{ARG_PARSE}touch \"{sync}/started-$$\"\nwhile [ ! -f \"{sync}/release\" ]; do sleep 0.1; done\nprintf '%%PDF-1.4\\n' > \"$outdir/$stem.pdf\"\n"
    );
    write_script(dir, "soffice-gated", &body)
}

/// Renderer that hangs well past any short test timeout.
pub fn sleepy_renderer(dir: &Path) -> PathBuf {
    let body = format!("{ARG_PARSE}sleep 30\nprintf '%%PDF-1.4\\n' > \"$outdir/$stem.pdf\"\n");
    write_script(dir, "soffice-sleepy", &body)
}

/// Create a plausible input document.
pub fn sample_doc(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("fake office document: {name}")).unwrap();
    path
}
