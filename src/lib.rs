//! # midnight-pdf
//!
//! Re-render PDF documents for low-light reading.
//!
//! ## Why this crate?
//!
//! PDF viewers that "invert colors" at the window level make every embedded
//! image a photographic negative and leave pure-white text glowing on pure
//! black. Instead this crate re-rasterises each page and applies a tuned
//! per-pixel recoloring: inversion, glare softening for what was near-black,
//! and a dark blue-gray tint for what was page background — then assembles
//! the result into a fresh PDF with the same page count and reading order.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate a local file or stage an in-memory buffer
//!  ├─ 2. Render   rasterise one page via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Recolor  per-pixel dark-mode transform (pure, no I/O)
//!  ├─ 4. Assemble place the page into the output PDF (printpdf)
//!  └─ 5. Output   finalized bytes + metadata + per-stage stats
//! ```
//!
//! Pages run strictly in order and one at a time: a single render surface and
//! a single page buffer exist at any moment, so peak memory is bounded by one
//! page regardless of document length. The first failure aborts the export
//! with no partial output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use midnight_pdf::{export, ExportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::default();
//!     let output = export("document.pdf", &config).await?;
//!     std::fs::write("document-dark.pdf", &output.pdf_bytes)?;
//!     eprintln!("{} pages in {}ms",
//!         output.stats.page_count,
//!         output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfdark` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! midnight-pdf = { version = "0.3", default-features = false }
//! ```
//!
//! ## Runtime requirement
//!
//! The pdfium shared library must be available at runtime (system loader path
//! or `PDFIUM_LIB_PATH`). Binding failures surface as
//! [`MidnightError::PdfiumBindingFailed`] with setup hints.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod viewer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CancelToken, ExportConfig, ExportConfigBuilder, PaperSize, RecolorPalette};
pub use error::MidnightError;
pub use export::{
    dark_output_path, export, export_from_bytes, export_sync, export_to_file, inspect,
};
pub use output::{DocumentMetadata, ExportOutput, ExportState, ExportStats};
pub use pipeline::render::render_single_page;
pub use progress::{
    ExportProgressCallback, NoopProgressCallback, ProgressCallback, StateTrackingCallback,
};
pub use viewer::{LoadState, ViewerState};
