//! Pagination and zoom state machine for an interactive single-page viewer.
//!
//! The widget itself (rendering, buttons, slider) lives in the host
//! application; this module owns only the rules: 1-based page numbers clamped
//! to the document, zoom clamped and step-quantized, and the load lifecycle
//! `Idle -> Loading -> Ready | Error`.
//!
//! The viewer shares nothing with the export pipeline beyond these clamping
//! rules. In particular the export re-rasterises at its own fixed scale and
//! never reuses whatever the viewer currently has on screen.

/// Minimum display zoom.
pub const MIN_SCALE: f32 = 0.5;
/// Maximum display zoom.
pub const MAX_SCALE: f32 = 2.5;
/// Zoom step; scales are quantized to multiples of this.
pub const SCALE_STEP: f32 = 0.1;

/// Document-load lifecycle of the viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// No document selected.
    #[default]
    Idle,
    /// Document bytes submitted to the engine, page count unknown.
    Loading,
    /// Page count known, navigation enabled.
    Ready,
    /// The document could not be parsed.
    Error(String),
}

/// Pagination and zoom state for the interactive viewer.
///
/// Invariants, enforced on every mutation: `1 <= page_number <=
/// max(num_pages, 1)` once a document is loaded, and
/// `MIN_SCALE <= scale <= MAX_SCALE` at all times.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    load: LoadState,
    page_number: usize,
    num_pages: usize,
    scale: f32,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            load: LoadState::Idle,
            page_number: 1,
            num_pages: 0,
            scale: 1.0,
        }
    }
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Current 1-based page number.
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// A new document has been submitted to the engine.
    ///
    /// Resets the page number but retains the current zoom, so a reader who
    /// prefers 1.5x keeps it across documents. Valid from any state, including
    /// mid-load of a previous document.
    pub fn begin_load(&mut self) {
        self.load = LoadState::Loading;
        self.page_number = 1;
        self.num_pages = 0;
    }

    /// The engine reported a page count; the document is ready to view.
    pub fn document_loaded(&mut self, num_pages: usize) {
        self.load = LoadState::Ready;
        self.num_pages = num_pages;
        self.page_number = 1;
    }

    /// The engine rejected the document.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.load = LoadState::Error(message.into());
        self.num_pages = 0;
        self.page_number = 1;
    }

    /// Move to the next page; a no-op at the last page or outside `Ready`.
    pub fn next_page(&mut self) {
        self.go_to_page(self.page_number.saturating_add(1));
    }

    /// Move to the previous page; a no-op at page 1 or outside `Ready`.
    pub fn previous_page(&mut self) {
        self.go_to_page(self.page_number.saturating_sub(1));
    }

    /// Jump to a page, clamped to `[1, num_pages]`.
    pub fn go_to_page(&mut self, page: usize) {
        if self.load != LoadState::Ready {
            return;
        }
        self.page_number = page.clamp(1, self.num_pages.max(1));
    }

    /// Set the zoom, clamped to `[MIN_SCALE, MAX_SCALE]` and quantized to
    /// `SCALE_STEP` multiples.
    pub fn set_scale(&mut self, scale: f32) {
        let clamped = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.scale = (clamped / SCALE_STEP).round() * SCALE_STEP;
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale + SCALE_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale - SCALE_STEP);
    }
}
