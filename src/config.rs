//! Configuration types for dark-mode PDF export.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across threads, log them, and diff two runs to understand
//! why their outputs differ.
//!
//! The recoloring thresholds live in [`RecolorPalette`] rather than as
//! constants inside the transform: they are empirical values with no derivation,
//! so they are tunable configuration, not algorithm structure.

use crate::error::MidnightError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Minimum rasterisation scale for export. Below 1.0 the output would be
/// visibly softer than the source, which defeats the point of re-rendering.
pub const MIN_RENDER_SCALE: f32 = 1.0;

/// Maximum rasterisation scale for export. 4.0 on an A4 page is already a
/// 2380 × 3368 px buffer per page.
pub const MAX_RENDER_SCALE: f32 = 4.0;

/// Configuration for a dark-mode PDF export.
///
/// Built via [`ExportConfig::builder()`] or using [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use midnight_pdf::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .render_scale(2.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Rasterisation scale applied to each page's native point geometry.
    /// Range: 1.0–4.0. Default: 2.0.
    ///
    /// A page of `W × H` points renders to `round(W * scale) × round(H * scale)`
    /// pixels. This is fixed per export and independent of whatever zoom level
    /// an interactive viewer happens to be showing: export quality must never
    /// depend on UI state.
    pub render_scale: f32,

    /// Paper size of the assembled output document. Default: A4.
    pub paper: PaperSize,

    /// Recoloring thresholds and tint. Default: [`RecolorPalette::default()`].
    pub palette: RecolorPalette,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Title stamped into the output PDF's metadata. If None, the source
    /// document's own title is reused when present.
    pub title: Option<String>,

    /// Cooperative cancellation flag, checked between pages (never mid-raster).
    pub cancel: CancelToken,

    /// Optional progress observer receiving per-page export events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            paper: PaperSize::A4,
            palette: RecolorPalette::default(),
            password: None,
            title: None,
            cancel: CancelToken::new(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("render_scale", &self.render_scale)
            .field("paper", &self.paper)
            .field("palette", &self.palette)
            .field("password", &self.password.as_ref().map(|_| "<set>"))
            .field("title", &self.title)
            .field("cancelled", &self.cancel.is_cancelled())
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale.clamp(MIN_RENDER_SCALE, MAX_RENDER_SCALE);
        self
    }

    pub fn paper(mut self, paper: PaperSize) -> Self {
        self.config.paper = paper;
        self
    }

    pub fn palette(mut self, palette: RecolorPalette) -> Self {
        self.config.palette = palette;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.config.cancel = token;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, MidnightError> {
        let c = &self.config;
        if !(MIN_RENDER_SCALE..=MAX_RENDER_SCALE).contains(&c.render_scale) {
            return Err(MidnightError::InvalidConfig(format!(
                "render_scale must be {MIN_RENDER_SCALE}–{MAX_RENDER_SCALE}, got {}",
                c.render_scale
            )));
        }
        let (w, h) = c.paper.dimensions_mm();
        if w == 0.0 || h == 0.0 {
            return Err(MidnightError::InvalidConfig(
                "paper dimensions must be non-zero".into(),
            ));
        }
        c.palette.validate()?;
        Ok(self.config)
    }
}

// ── Recolor palette ──────────────────────────────────────────────────────

/// Thresholds and tint for the dark-mode pixel transform.
///
/// The defaults are the empirically tuned values the transform was designed
/// around; they are fields rather than constants so they can be adjusted
/// without touching the transform's three-branch structure.
///
/// After inverting a pixel, channels all strictly above `glare_threshold`
/// (the pixel was near-black in the source) are softened by subtracting
/// `glare_softening`; channels all strictly below `shadow_threshold` (the
/// pixel was near-white page background) are replaced by `shadow_tint`.
/// Boundary values fall through to plain inversion, both comparisons are
/// strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecolorPalette {
    /// Inverted channels strictly above this count as glare. Default: 220.
    pub glare_threshold: u8,
    /// Amount subtracted from each glare channel. Default: 30.
    pub glare_softening: u8,
    /// Inverted channels strictly below this count as shadow. Default: 35.
    pub shadow_threshold: u8,
    /// RGB replacement for shadow pixels, a dark blue-gray matched to the
    /// viewer's background. Default: (36, 40, 52).
    pub shadow_tint: [u8; 3],
}

impl Default for RecolorPalette {
    fn default() -> Self {
        Self {
            glare_threshold: 220,
            glare_softening: 30,
            shadow_threshold: 35,
            shadow_tint: [36, 40, 52],
        }
    }
}

impl RecolorPalette {
    /// Validate that the softening step cannot underflow a glare channel.
    ///
    /// Glare channels are strictly greater than `glare_threshold`, so the
    /// subtraction stays in range whenever `glare_softening <= glare_threshold`.
    pub fn validate(&self) -> Result<(), MidnightError> {
        if self.glare_softening > self.glare_threshold {
            return Err(MidnightError::InvalidConfig(format!(
                "glare_softening ({}) must not exceed glare_threshold ({})",
                self.glare_softening, self.glare_threshold
            )));
        }
        Ok(())
    }
}

// ── Paper size ───────────────────────────────────────────────────────────

/// Output page geometry for the assembled document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl Default for PaperSize {
    fn default() -> Self {
        PaperSize::A4
    }
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A3 => (297.0, 420.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

// ── Cancellation ─────────────────────────────────────────────────────────

/// Cloneable cooperative cancellation flag.
///
/// The export pipeline polls the token between pages; flipping it from any
/// thread makes the export discard accumulated assembler state and return
/// [`MidnightError::Cancelled`]. Cancellation is never checked mid-raster,
/// so the page currently being rendered always completes or fails on its own.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_render_scale() {
        let config = ExportConfig::builder().render_scale(0.25).build().unwrap();
        assert_eq!(config.render_scale, MIN_RENDER_SCALE);

        let config = ExportConfig::builder().render_scale(10.0).build().unwrap();
        assert_eq!(config.render_scale, MAX_RENDER_SCALE);
    }

    #[test]
    fn default_palette_matches_tuned_values() {
        let p = RecolorPalette::default();
        assert_eq!(p.glare_threshold, 220);
        assert_eq!(p.glare_softening, 30);
        assert_eq!(p.shadow_threshold, 35);
        assert_eq!(p.shadow_tint, [36, 40, 52]);
    }

    #[test]
    fn palette_rejects_underflowing_softening() {
        let palette = RecolorPalette {
            glare_threshold: 20,
            glare_softening: 40,
            ..RecolorPalette::default()
        };
        let err = ExportConfig::builder().palette(palette).build();
        assert!(matches!(err, Err(MidnightError::InvalidConfig(_))));
    }

    #[test]
    fn zero_paper_dimensions_rejected() {
        let err = ExportConfig::builder()
            .paper(PaperSize::Custom {
                width_mm: 0.0,
                height_mm: 297.0,
            })
            .build();
        assert!(matches!(err, Err(MidnightError::InvalidConfig(_))));
    }

    #[test]
    fn cancel_token_is_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn debug_does_not_leak_password() {
        let config = ExportConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("hunter2"));
    }
}
