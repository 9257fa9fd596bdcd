//! Pipeline stages for dark-mode PDF export.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ───▶ render ──▶ recolor ──▶ assemble
//! (path/bytes) (pdfium)  (pixels)   (printpdf)
//! ```
//!
//! 1. [`input`]    — validate the source and stage in-memory buffers to disk
//!    for the engine
//! 2. [`render`]   — rasterise one page at a time; runs on a blocking thread
//!    because pdfium is not async-safe
//! 3. [`recolor`]  — pure per-pixel dark-mode transform, no I/O
//! 4. [`assemble`] — composite recolored pages into a fresh output PDF in
//!    call order
//!
//! Page buffers move linearly through the stages: each `RgbaImage` is owned
//! by exactly one stage at a time and is dropped once the assembler has
//! placed it, so peak memory is one page regardless of document length.

pub mod assemble;
pub mod input;
pub mod recolor;
pub mod render;
