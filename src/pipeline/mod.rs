//! Pipeline stages for one document-to-PDF conversion.
//!
//! Each submodule implements exactly one step. Keeping stages separate makes
//! each independently testable and lets us swap implementations (e.g. an
//! in-process renderer behind the same trait) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! filter ──▶ profile ──▶ soffice ──▶ place
//! (export    (isolated   (headless   (rename or
//!  filter)    scratch)    subprocess)  copy fallback)
//! ```
//!
//! 1. [`filter`]  — map the input extension to the renderer's export filter
//! 2. [`profile`] — create the per-invocation isolated profile directory and
//!    its `file://` locator; profiles are never shared because the renderer
//!    treats a profile as a single-writer lock domain
//! 3. [`soffice`] — drive the subprocess and discover the generated output
//! 4. [`place`]   — relocate the output to its final destination atomically

pub mod filter;
pub mod place;
pub mod profile;
pub mod soffice;
