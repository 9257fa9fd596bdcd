//! Input staging: hand pdfium a readable on-disk PDF whether the caller
//! supplies a path or an in-memory buffer.
//!
//! pdfium opens documents by file path — it cannot parse a byte slice. The
//! surrounding application usually has the opposite in hand: a buffer from
//! its file-selection flow. [`SourcePdf`] bridges the two by staging buffers
//! into a managed temp file whose lifetime is tied to the export run, and by
//! validating the `%PDF` header up front in both cases, so a bad document
//! fails here with a precise error instead of deep inside the engine.

use crate::error::MidnightError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A source document pdfium can open, with any staging kept alive alongside.
///
/// Dropping a `Staged` value removes the temp file, so the value must outlive
/// every engine call that reads from [`SourcePdf::path`].
#[derive(Debug)]
pub enum SourcePdf {
    /// The caller's own file on disk.
    Local(PathBuf),
    /// An in-memory buffer staged into a managed temp file.
    Staged(NamedTempFile),
}

impl SourcePdf {
    /// Validate an existing file and wrap its path.
    pub fn from_path(path: &Path) -> Result<Self, MidnightError> {
        let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => MidnightError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => MidnightError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        let mut magic = [0u8; 4];
        if file.read_exact(&mut magic).is_err() || &magic != PDF_MAGIC {
            return Err(MidnightError::NotAPdf {
                path: path.to_path_buf(),
                magic,
            });
        }

        debug!("Using source PDF at {}", path.display());
        Ok(SourcePdf::Local(path.to_path_buf()))
    }

    /// Validate a buffer and stage it to disk for the engine.
    ///
    /// The buffer is checked before anything touches the filesystem; a
    /// rejected buffer leaves no file behind.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MidnightError> {
        let mut magic = [0u8; 4];
        let header = bytes.get(..4).unwrap_or(&[]);
        magic[..header.len()].copy_from_slice(header);
        if &magic != PDF_MAGIC {
            return Err(MidnightError::NotAPdf {
                path: PathBuf::from("<in-memory buffer>"),
                magic,
            });
        }

        let mut file = NamedTempFile::new()
            .map_err(|e| MidnightError::Internal(format!("staging tempfile: {e}")))?;
        file.write_all(bytes)
            .map_err(|e| MidnightError::Internal(format!("staging tempfile write: {e}")))?;

        debug!(
            "Staged {}-byte buffer to {}",
            bytes.len(),
            file.path().display()
        );
        Ok(SourcePdf::Staged(file))
    }

    /// The on-disk path the engine should open.
    pub fn path(&self) -> &Path {
        match self {
            SourcePdf::Local(p) => p,
            SourcePdf::Staged(f) => f.path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let err = SourcePdf::from_path(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(err, Err(MidnightError::FileNotFound { .. })));
    }

    #[test]
    fn non_pdf_file_is_rejected() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"PK\x03\x04 zip, not a pdf").unwrap();
        let err = SourcePdf::from_path(tmp.path());
        match err {
            Err(MidnightError::NotAPdf { magic, .. }) => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn local_pdf_keeps_its_own_path() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n%stub").unwrap();
        let source = SourcePdf::from_path(tmp.path()).unwrap();
        assert_eq!(source.path(), tmp.path());
    }

    #[test]
    fn buffer_is_staged_and_cleaned_up() {
        let source = SourcePdf::from_bytes(b"%PDF-1.4\nhello").unwrap();
        let staged_path = source.path().to_path_buf();
        assert_eq!(std::fs::read(&staged_path).unwrap(), b"%PDF-1.4\nhello");

        drop(source);
        assert!(!staged_path.exists(), "staged file must be removed on drop");
    }

    #[test]
    fn garbage_buffer_is_rejected_without_staging() {
        let err = SourcePdf::from_bytes(b"PK\x03\x04 not a pdf at all");
        assert!(matches!(err, Err(MidnightError::NotAPdf { .. })));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = SourcePdf::from_bytes(b"%P");
        assert!(matches!(err, Err(MidnightError::NotAPdf { .. })));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"%P").unwrap();
        let err = SourcePdf::from_path(tmp.path());
        assert!(matches!(err, Err(MidnightError::NotAPdf { .. })));
    }
}
