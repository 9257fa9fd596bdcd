//! Progress-callback trait for per-page export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline processes each page.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a toast, a progress bar, a log, or a channel without the
//! library knowing anything about how the host application communicates. The
//! trait is `Send + Sync` because the pipeline loop runs on a blocking worker
//! thread, not on the caller's thread.

use crate::output::ExportState;
use std::sync::{Arc, Mutex};

/// Called by the export pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events for one export invocation arrive in order:
/// `on_export_start`, then `on_page_start`/`on_page_complete` pairs in
/// increasing page order, then exactly one of `on_export_complete`,
/// `on_export_error`, or `on_export_cancelled`.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once the source document is open and its page count is known.
    fn on_export_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is rasterised. Corresponds to the
    /// `Running(page_num)` state.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page has been recolored and handed to the assembler.
    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once after the output document has been finalized.
    fn on_export_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when the export aborts on an error. No output artifact exists.
    fn on_export_error(&self, error: String) {
        let _ = error;
    }

    /// Called when the export is cancelled between pages. No output artifact
    /// exists; `after_pages` pages had already been processed and discarded.
    fn on_export_cancelled(&self, after_pages: usize) {
        let _ = after_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

/// Materialises the monotonic [`ExportState`] from callback events so pollers
/// (a UI status line, a test) can observe the pipeline without subscribing to
/// individual events.
pub struct StateTrackingCallback {
    state: Mutex<ExportState>,
}

impl StateTrackingCallback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ExportState::Idle),
        })
    }

    /// Current state snapshot.
    pub fn state(&self) -> ExportState {
        self.state.lock().unwrap().clone()
    }
}

impl ExportProgressCallback for StateTrackingCallback {
    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.state
            .lock()
            .unwrap()
            .advance(ExportState::Running(page_num));
    }

    fn on_export_complete(&self, _total_pages: usize) {
        self.state.lock().unwrap().advance(ExportState::Succeeded);
    }

    fn on_export_error(&self, error: String) {
        self.state.lock().unwrap().advance(ExportState::Failed(error));
    }

    fn on_export_cancelled(&self, _after_pages: usize) {
        self.state.lock().unwrap().advance(ExportState::Cancelled);
    }
}
