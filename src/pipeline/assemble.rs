//! Output document assembly — composite recolored page rasters into a fresh
//! PDF using `printpdf` 0.8.
//!
//! printpdf 0.8 uses a data-oriented API: documents are built by constructing
//! `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
//! `PdfDocument::save()`.
//!
//! One `add_page` call produces exactly one output page, in call order; the
//! assembler never reorders. Placement is fit-to-width with a uniform
//! clamp-to-height: the image spans the page width unless the resulting
//! height would overflow, in which case both dimensions shrink by the same
//! factor so height fits exactly. Images are never cropped and never
//! stretched non-uniformly.

use crate::config::PaperSize;
use crate::error::MidnightError;
use image::{DynamicImage, RgbaImage};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::debug;

/// Images are placed at 72 DPI so one source pixel is one PDF point and the
/// fit arithmetic below is exact.
const PLACEMENT_DPI: f32 = 72.0;

/// Accumulates recolored page images into an output PDF.
pub struct DarkPdfAssembler {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    page_w: Mm,
    page_h: Mm,
}

impl DarkPdfAssembler {
    /// Begin a new output document on the given paper size.
    pub fn new(paper: PaperSize, title: Option<&str>) -> Self {
        let (w_mm, h_mm) = paper.dimensions_mm();
        Self {
            doc: PdfDocument::new(title.unwrap_or("Dark-mode copy")),
            pages: Vec::new(),
            page_w: Mm(w_mm),
            page_h: Mm(h_mm),
        }
    }

    /// Append one output page holding `image`, consumed by this call.
    pub fn add_page(&mut self, image: RgbaImage) -> Result<(), MidnightError> {
        let (img_w, img_h) = (image.width() as usize, image.height() as usize);
        if img_w == 0 || img_h == 0 {
            return Err(MidnightError::AssemblyFailed {
                detail: format!("page image has degenerate dimensions {img_w}x{img_h}"),
            });
        }

        // printpdf wants RGB8; recolored pages carry no meaningful alpha.
        let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: img_w,
            height: img_h,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = self.doc.add_image(&raw);

        let page_w_pt = self.page_w.into_pt().0;
        let page_h_pt = self.page_h.into_pt().0;

        // At 72 DPI the image's native size in points equals its pixel size.
        let scale = fit_scale(img_w as f32, img_h as f32, page_w_pt, page_h_pt);
        let placed_w_pt = img_w as f32 * scale;
        let placed_h_pt = img_h as f32 * scale;

        let x_offset = (page_w_pt - placed_w_pt) / 2.0;
        let y_offset = (page_h_pt - placed_h_pt) / 2.0;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x_offset)),
                translate_y: Some(Pt(y_offset)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(PLACEMENT_DPI),
                rotate: None,
            },
        }];

        self.pages.push(PdfPage::new(self.page_w, self.page_h, ops));
        debug!(
            page = self.pages.len(),
            placed_w_pt, placed_h_pt, scale, "Placed page image"
        );
        Ok(())
    }

    /// Pages accumulated so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialise the accumulated document to bytes, consuming the assembler.
    pub fn finalize(mut self) -> Result<Vec<u8>, MidnightError> {
        if self.pages.is_empty() {
            return Err(MidnightError::AssemblyFailed {
                detail: "no pages were added".into(),
            });
        }
        self.doc.with_pages(self.pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(
            output_bytes = bytes.len(),
            warnings = warnings.len(),
            "Finalized output document"
        );
        Ok(bytes)
    }
}

/// Uniform scale placing an `img_w x img_h` image on a `page_w x page_h`
/// page: fit-to-width first, shrink further only if the height would
/// overflow. Both dimensions always share the same factor.
fn fit_scale(img_w: f32, img_h: f32, page_w: f32, page_h: f32) -> f32 {
    let mut scale = page_w / img_w;
    if img_h * scale > page_h {
        scale = page_h / img_h;
    }
    scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn a4_pt() -> (f32, f32) {
        (Mm(210.0).into_pt().0, Mm(297.0).into_pt().0)
    }

    #[test]
    fn wide_image_fits_page_width() {
        let (pw, ph) = a4_pt();
        // A squat, wide image: width binds, height has room to spare.
        let scale = fit_scale(1000.0, 200.0, pw, ph);
        let placed_w = 1000.0 * scale;
        let placed_h = 200.0 * scale;
        assert!((placed_w - pw).abs() < 0.01);
        assert!(placed_h < ph);
        // Aspect ratio preserved: H/W * Tw.
        assert!((placed_h - 200.0 / 1000.0 * pw).abs() < 0.01);
    }

    #[test]
    fn tall_image_is_clamped_to_page_height() {
        let (pw, ph) = a4_pt();
        // A very tall image: fit-to-width would overflow vertically.
        let scale = fit_scale(500.0, 5000.0, pw, ph);
        let placed_w = 500.0 * scale;
        let placed_h = 5000.0 * scale;
        assert!((placed_h - ph).abs() < 0.01);
        assert!(placed_w < pw);
        // Both dimensions share one factor.
        assert!((placed_w / 500.0 - placed_h / 5000.0).abs() < 1e-6);
    }

    #[test]
    fn page_aspect_image_fills_the_page() {
        let (pw, ph) = a4_pt();
        // Same aspect as the page: both constraints met simultaneously.
        let scale = fit_scale(pw * 2.0, ph * 2.0, pw, ph);
        assert!((pw * 2.0 * scale - pw).abs() < 0.01);
        assert!((ph * 2.0 * scale - ph).abs() < 0.01);
    }

    #[test]
    fn one_add_page_call_is_one_output_page() {
        let mut assembler = DarkPdfAssembler::new(PaperSize::A4, Some("test"));
        assert_eq!(assembler.page_count(), 0);
        for _ in 0..3 {
            assembler
                .add_page(RgbaImage::from_pixel(40, 60, Rgba([36, 40, 52, 255])))
                .unwrap();
        }
        assert_eq!(assembler.page_count(), 3);

        let bytes = assembler.finalize().unwrap();
        assert!(bytes.starts_with(b"%PDF"), "output must be a PDF");
    }

    #[test]
    fn degenerate_image_is_rejected() {
        let mut assembler = DarkPdfAssembler::new(PaperSize::A4, None);
        let err = assembler.add_page(RgbaImage::new(0, 10));
        assert!(matches!(err, Err(MidnightError::AssemblyFailed { .. })));
        assert_eq!(assembler.page_count(), 0);
    }

    #[test]
    fn finalize_with_no_pages_is_an_error() {
        let assembler = DarkPdfAssembler::new(PaperSize::Letter, None);
        assert!(matches!(
            assembler.finalize(),
            Err(MidnightError::AssemblyFailed { .. })
        ));
    }
}
