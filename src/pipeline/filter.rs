//! Format resolution: map a file extension to a LibreOffice export filter.
//!
//! The mapping is a fixed table. Unrecognised extensions fall back to the
//! generic `pdf` filter — LibreOffice picks its own export path for anything
//! it can open, so an unknown extension is a permissive default, not an
//! error.

use std::path::Path;

/// Presentation export filter (ppt, pptx, odp).
pub const IMPRESS_PDF: &str = "pdf:impress_pdf_Export";

/// Spreadsheet export filter (xls, xlsx, ods).
pub const CALC_PDF: &str = "pdf:calc_pdf_Export";

/// Word-processing export filter (doc, docx, odt).
pub const WRITER_PDF: &str = "pdf:writer_pdf_Export";

/// Generic PDF filter for everything else.
pub const GENERIC_PDF: &str = "pdf";

/// Resolve an extension to its export filter.
///
/// Case-insensitive; a leading dot is accepted and ignored.
pub fn filter_for_extension(ext: &str) -> &'static str {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "ppt" | "pptx" | "odp" => IMPRESS_PDF,
        "xls" | "xlsx" | "ods" => CALC_PDF,
        "doc" | "docx" | "odt" => WRITER_PDF,
        _ => GENERIC_PDF,
    }
}

/// Resolve a path's extension to its export filter.
///
/// Paths without an extension get the generic filter.
pub fn filter_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(filter_for_extension)
        .unwrap_or(GENERIC_PDF)
}
