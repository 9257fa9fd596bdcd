//! Output types for dark-mode export: the finalized document, run statistics,
//! source-document metadata, and the observable export state machine.

use serde::{Deserialize, Serialize};

/// Result of a successful export.
///
/// `pdf_bytes` is the complete assembled output document; callers hand it to
/// whatever save/share capability their environment provides, or use
/// [`crate::export::export_to_file`] to persist it atomically.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The finalized output PDF.
    pub pdf_bytes: Vec<u8>,
    /// Metadata of the source document.
    pub metadata: DocumentMetadata,
    /// Statistics about the export run.
    pub stats: ExportStats,
}

/// Statistics about an export run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportStats {
    /// Pages in the source document (and, on success, in the output).
    pub page_count: usize,
    /// Wall-clock time spent rasterising pages.
    pub render_duration_ms: u64,
    /// Wall-clock time spent in the pixel recolor transform.
    pub recolor_duration_ms: u64,
    /// Wall-clock time spent placing pages and serialising the output.
    pub assemble_duration_ms: u64,
    /// Total wall-clock time including input resolution.
    pub total_duration_ms: u64,
    /// Size of the finalized output document in bytes.
    pub output_bytes: usize,
}

/// Document metadata extracted from the source PDF's /Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
    pub is_encrypted: bool,
}

/// Observable state of one export invocation.
///
/// Transitions are monotonic: once a terminal state (`Succeeded`, `Failed`,
/// `Cancelled`) is reached there is no way back, and `Running(i)` never
/// returns to `Idle`. One instance per invocation, never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportState {
    /// No export started yet.
    #[default]
    Idle,
    /// Page `i` (1-based) is currently being processed.
    Running(usize),
    /// Export was cancelled; no output was produced.
    Cancelled,
    /// Export finished and output bytes exist.
    Succeeded,
    /// Export aborted with the given error; no output was produced.
    Failed(String),
}

impl ExportState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportState::Cancelled | ExportState::Succeeded | ExportState::Failed(_)
        )
    }

    /// Apply a transition if it is allowed by the monotonic ordering,
    /// returning whether the state changed.
    ///
    /// Terminal states absorb everything; `Running(i)` accepts only terminal
    /// states or `Running(j)` with `j >= i`.
    pub fn advance(&mut self, next: ExportState) -> bool {
        let allowed = match (&*self, &next) {
            (s, _) if s.is_terminal() => false,
            (_, ExportState::Idle) => false,
            (ExportState::Running(i), ExportState::Running(j)) => j >= i,
            _ => true,
        };
        if allowed {
            *self = next;
        }
        allowed
    }
}
