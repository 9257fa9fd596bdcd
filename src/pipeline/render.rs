//! PDF rasterisation: render one page at a time to an `RgbaImage` via pdfium.
//!
//! ## Why one page at a time?
//!
//! The export pipeline is deliberately sequential: a single render surface
//! (pdfium bitmap) is alive at any moment, so peak memory is bounded by one
//! page's pixel buffer regardless of document length. [`render_page`] scopes
//! the bitmap to the call — it is dropped before the function returns.
//!
//! ## Why blocking helpers instead of async fns?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! The export driver opens the document and runs the whole page loop inside
//! one `tokio::task::spawn_blocking` call; everything in this module is the
//! blocking code that runs there.

use crate::error::MidnightError;
use crate::output::DocumentMetadata;
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Bind to the pdfium shared library.
///
/// Honours `PDFIUM_LIB_PATH` when set, falling back to the system loader
/// path. Binding failures surface as [`MidnightError::PdfiumBindingFailed`]
/// with setup hints instead of panicking.
pub fn bind_pdfium() -> Result<Pdfium, MidnightError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path)
            .or_else(|_| Pdfium::bind_to_system_library()),
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| MidnightError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// Open a PDF, mapping pdfium's password and parse failures to our taxonomy.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, MidnightError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                MidnightError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                MidnightError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            MidnightError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Rasterise one page at the given scale.
///
/// Output dimensions are `round(width_pt * scale) x round(height_pt * scale)`
/// where `width_pt`/`height_pt` are the page's native point geometry. The
/// pdfium bitmap is scoped to this call and released before returning.
pub fn render_page(
    document: &PdfDocument<'_>,
    page_number: usize,
    scale: f32,
) -> Result<RgbaImage, MidnightError> {
    let pages = document.pages();
    let page = pages
        .get(page_index(page_number)?)
        .map_err(|e| MidnightError::RasterisationFailed {
            page: page_number,
            detail: format!("{:?}", e),
        })?;

    let target_w = (page.width().value * scale).round() as i32;
    let target_h = (page.height().value * scale).round() as i32;
    let render_config = PdfRenderConfig::new()
        .set_target_width(target_w)
        .set_maximum_height(target_h);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| MidnightError::RasterisationFailed {
            page: page_number,
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image().into_rgba8();
    debug!(
        "Rendered page {} -> {}x{} px",
        page_number,
        image.width(),
        image.height()
    );

    Ok(image)
}

/// Map the 1-based public page number to pdfium's 0-based index.
fn page_index(page_number: usize) -> Result<u16, MidnightError> {
    page_number
        .checked_sub(1)
        .and_then(|i| u16::try_from(i).ok())
        .ok_or_else(|| MidnightError::RasterisationFailed {
            page: page_number,
            detail: "page number out of range".into(),
        })
}

/// Read metadata from an already-open document.
pub fn metadata_from_document(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
        is_encrypted: false, // pdfium doesn't readily expose this after opening
    }
}

/// Extract document metadata from a PDF without rendering pages.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, MidnightError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &path, pwd.as_deref())?;
        Ok(metadata_from_document(&document))
    })
    .await
    .map_err(|e| MidnightError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Convenience used by interactive viewers: rasterise a single page of a
/// document on disk at a display scale, clamped to the viewer's zoom range.
///
/// Each call opens the document and releases everything before returning, so
/// a failure here is local to the requested page and never affects other
/// pages or previously reported metadata.
pub async fn render_single_page(
    pdf_path: &Path,
    page_number: usize,
    scale: f32,
    password: Option<&str>,
) -> Result<RgbaImage, MidnightError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());
    let scale = scale.clamp(crate::viewer::MIN_SCALE, crate::viewer::MAX_SCALE);

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &path, pwd.as_deref())?;
        render_page(&document, page_number, scale)
    })
    .await
    .map_err(|e| MidnightError::Internal(format!("Render task panicked: {}", e)))?
}
