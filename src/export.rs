//! Dark-mode export entry points and the sequential page-pipeline driver.
//!
//! ## Why eager, sequential, all-or-nothing?
//!
//! The export either produces a complete dark-mode copy or nothing. Pages are
//! processed strictly in order inside one blocking section, so a single render
//! surface and a single page buffer are alive at any moment — peak memory is
//! one page regardless of document length. The first page failure aborts the
//! run and the accumulated assembler state is dropped unfinalized; there is
//! no partial artifact to clean up and no retry logic to reason about.

use crate::config::{CancelToken, ExportConfig, RecolorPalette};
use crate::error::MidnightError;
use crate::output::{DocumentMetadata, ExportOutput, ExportStats};
use crate::pipeline::assemble::DarkPdfAssembler;
use crate::pipeline::input::SourcePdf;
use crate::pipeline::{recolor, render};
use crate::progress::ProgressCallback;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Export a PDF file as a dark-mode copy.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input`  — Local file path to a PDF
/// * `config` — Export configuration
///
/// # Errors
/// Any [`MidnightError`] aborts the whole export: there is no partial output.
/// Cancellation surfaces as [`MidnightError::Cancelled`].
pub async fn export(
    input: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportOutput, MidnightError> {
    let path = input.as_ref();
    let total_start = Instant::now();
    info!("Starting dark-mode export: {}", path.display());

    let result = match SourcePdf::from_path(path) {
        Ok(source) => run_export(source, config, total_start).await,
        Err(e) => Err(e),
    };
    notify_outcome(&result, config);
    result
}

/// Export PDF bytes held in memory.
///
/// This is the API the surrounding UI's file-selection flow uses: it hands
/// over the document buffer it already read, and the library stages it into
/// a managed temp file that is cleaned up automatically on return or panic.
pub async fn export_from_bytes(
    bytes: &[u8],
    config: &ExportConfig,
) -> Result<ExportOutput, MidnightError> {
    let total_start = Instant::now();
    info!("Starting dark-mode export from a {}-byte buffer", bytes.len());

    let result = match SourcePdf::from_bytes(bytes) {
        Ok(source) => run_export(source, config, total_start).await,
        Err(e) => Err(e),
    };
    notify_outcome(&result, config);
    result
}

/// Report the terminal outcome to the configured observer.
fn notify_outcome(result: &Result<ExportOutput, MidnightError>, config: &ExportConfig) {
    if let Some(ref cb) = config.progress_callback {
        match result {
            Ok(output) => cb.on_export_complete(output.stats.page_count),
            Err(MidnightError::Cancelled { after_pages }) => {
                cb.on_export_cancelled(*after_pages)
            }
            Err(e) => cb.on_export_error(e.to_string()),
        }
    }
}

/// Shared tail of the entry points: drive the pipeline over a staged source.
async fn run_export(
    source: SourcePdf,
    config: &ExportConfig,
    total_start: Instant,
) -> Result<ExportOutput, MidnightError> {
    // pdfium is not async-safe; the whole page loop lives in one
    // spawn_blocking so exactly one render surface exists at a time.
    let pdf_path = source.path().to_path_buf();
    let cfg = config.clone();
    let result = tokio::task::spawn_blocking(move || export_blocking(&pdf_path, &cfg))
        .await
        .map_err(|e| MidnightError::Internal(format!("Export task panicked: {}", e)))?;

    // A staged temp file must outlive every engine read.
    drop(source);

    let (pdf_bytes, metadata, timings) = result?;

    let stats = ExportStats {
        page_count: metadata.page_count,
        render_duration_ms: timings.render_ms,
        recolor_duration_ms: timings.recolor_ms,
        assemble_duration_ms: timings.assemble_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        output_bytes: pdf_bytes.len(),
    };

    info!(
        "Export complete: {} pages, {} bytes, {}ms total",
        stats.page_count, stats.output_bytes, stats.total_duration_ms
    );

    Ok(ExportOutput {
        pdf_bytes,
        metadata,
        stats,
    })
}

/// Blocking implementation: open, iterate, finalize.
fn export_blocking(
    pdf_path: &Path,
    config: &ExportConfig,
) -> Result<(Vec<u8>, DocumentMetadata, StageTimings), MidnightError> {
    let pdfium = render::bind_pdfium()?;
    let document = render::open_document(&pdfium, pdf_path, config.password.as_deref())?;
    let metadata = render::metadata_from_document(&document);
    let total_pages = metadata.page_count;

    if total_pages == 0 {
        return Err(MidnightError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }
    info!("PDF loaded: {} pages", total_pages);

    if let Some(ref cb) = config.progress_callback {
        cb.on_export_start(total_pages);
    }

    let title = config.title.as_deref().or(metadata.title.as_deref());
    let mut assembler = DarkPdfAssembler::new(config.paper, title);

    let scale = config.render_scale;
    let mut timings = run_pipeline(
        total_pages,
        |page| render::render_page(&document, page, scale),
        &mut assembler,
        &config.palette,
        &config.cancel,
        config.progress_callback.as_ref(),
    )?;

    let finalize_start = Instant::now();
    let bytes = assembler.finalize()?;
    timings.assemble_ms += finalize_start.elapsed().as_millis() as u64;

    Ok((bytes, metadata, timings))
}

/// Per-stage wall-clock accumulators for one export run.
#[derive(Debug, Default)]
struct StageTimings {
    render_ms: u64,
    recolor_ms: u64,
    assemble_ms: u64,
}

/// The sequential page loop: cancel-check, rasterize, recolor, place.
///
/// Generic over the page source so the ordering, fail-fast, and cancellation
/// contracts are testable without a rendering engine; the pdfium closure in
/// [`export_blocking`] is the production source. Pages are driven in strictly
/// increasing order and each buffer moves linearly through the stages — the
/// raster is consumed by the assembler and dropped before the next page
/// starts.
///
/// On `Err` the caller must drop the assembler without finalizing it; that is
/// what "no partial output" means here.
fn run_pipeline<F>(
    total_pages: usize,
    mut render_page: F,
    assembler: &mut DarkPdfAssembler,
    palette: &RecolorPalette,
    cancel: &CancelToken,
    progress: Option<&ProgressCallback>,
) -> Result<StageTimings, MidnightError>
where
    F: FnMut(usize) -> Result<RgbaImage, MidnightError>,
{
    let mut timings = StageTimings::default();

    for page in 1..=total_pages {
        // Cancellation is only observed between pages, never mid-raster.
        if cancel.is_cancelled() {
            return Err(MidnightError::Cancelled {
                after_pages: page - 1,
            });
        }

        if let Some(cb) = progress {
            cb.on_page_start(page, total_pages);
        }

        let stage = Instant::now();
        let mut raster = render_page(page)?;
        timings.render_ms += stage.elapsed().as_millis() as u64;

        let stage = Instant::now();
        recolor::recolor_in_place(&mut raster, palette);
        timings.recolor_ms += stage.elapsed().as_millis() as u64;

        let stage = Instant::now();
        assembler.add_page(raster)?;
        timings.assemble_ms += stage.elapsed().as_millis() as u64;

        debug!("Page {}/{} exported", page, total_pages);
        if let Some(cb) = progress {
            cb.on_page_complete(page, total_pages);
        }
    }

    Ok(timings)
}

/// Export a PDF and write the output directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn export_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportStats, MidnightError> {
    let output = export(input, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MidnightError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &output.pdf_bytes)
        .await
        .map_err(|e| MidnightError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| MidnightError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`export`].
///
/// Creates a temporary tokio runtime internally.
pub fn export_sync(
    input: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportOutput, MidnightError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MidnightError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(export(input, config))
}

/// Extract PDF metadata without exporting anything.
///
/// This is also what an interactive viewer calls on document load to learn
/// the page count.
pub async fn inspect(input: impl AsRef<Path>) -> Result<DocumentMetadata, MidnightError> {
    let source = SourcePdf::from_path(input.as_ref())?;
    let metadata = render::extract_metadata(source.path(), None).await;
    drop(source);
    metadata
}

/// Deterministic output name for a source document: strip the extension and
/// append the `-dark.pdf` suffix, staying in the same directory.
///
/// `report.pdf` becomes `report-dark.pdf`.
pub fn dark_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}-dark.pdf"))
}
