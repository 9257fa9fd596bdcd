//! Error types for the midnight-pdf library.
//!
//! Every error here is **fatal to the export invocation that raised it**: a
//! page that cannot be rasterised aborts the whole export rather than leaving
//! a hole in the output document. There is deliberately no per-page "soft
//! failure" channel — a dark-mode copy with silently missing pages is worse
//! than no copy at all, so the contract is all-or-nothing.
//!
//! Viewer-side page failures are a different story: the interactive viewer
//! rasterises pages lazily and independently, so a single bad page only
//! affects that page's view and never reaches this enum.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the midnight-pdf library.
#[derive(Debug, Error)]
pub enum MidnightError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input was readable but does not carry the PDF header.
    #[error("Not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The document parsed successfully but contains no pages.
    #[error("PDF '{path}' has no pages — nothing to export")]
    EmptyDocument { path: PathBuf },

    /// pdfium-render returned an error while rasterising a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// The output writer rejected a page or failed to finalise the document.
    #[error("Output document assembly failed: {detail}")]
    AssemblyFailed { detail: String },

    // ── Cancellation ──────────────────────────────────────────────────────
    /// The export was cancelled cooperatively between pages.
    ///
    /// Any assembler state accumulated for pages `1..=after_pages` has been
    /// discarded; no output artifact exists.
    #[error("Export cancelled after {after_pages} pages — no output produced")]
    Cancelled { after_pages: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
midnight-pdf needs the pdfium shared library at runtime.\n\
  • Install libpdfium and make sure it is on the loader path, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
