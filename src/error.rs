//! Error types for the invoice extraction engine.
//!
//! The taxonomy is closed: callers are expected to branch on the variant,
//! never on message text. Field-level misses are not errors; they surface as
//! empty/zero sentinels on [`crate::invoice::ExtractedInvoice`] and are judged
//! by the validator.

use std::path::{Path, PathBuf};

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Document-level failures raised during text acquisition.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document handle does not resolve to a readable file.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// The document could not be opened or parsed at the container level
    /// (corrupt, truncated, wrong format, or zero pages).
    #[error("failed to open PDF: {reason}")]
    DocumentOpenFailure {
        /// Original low-level diagnostic, kept for context.
        reason: String,
    },

    /// No usable page-one text was obtained.
    ///
    /// `ocr_attempted` distinguishes "recognition ran and still produced
    /// nothing" from "recognition was never attempted because the OCR tools
    /// are not installed", since the user-facing guidance differs materially
    /// between the two.
    #[error("no recoverable text on page one (ocr_attempted: {ocr_attempted})")]
    TextUnavailable {
        /// Whether the image-recognition fallback was actually run.
        ocr_attempted: bool,
    },
}

impl Error {
    /// Classify a low-level open/parse failure for a path-based document.
    ///
    /// A handle that does not resolve to an existing file is `FileNotFound`;
    /// everything else becomes `DocumentOpenFailure` carrying the original
    /// diagnostic.
    pub(crate) fn classify_open(source: &Path, err: impl std::fmt::Display) -> Error {
        if !source.exists() {
            Error::FileNotFound(source.to_path_buf())
        } else {
            Error::DocumentOpenFailure {
                reason: format!("{}: {}", source.display(), err),
            }
        }
    }

    /// Classify a low-level open/parse failure for an in-memory document.
    pub(crate) fn classify_open_mem(source: &str, err: impl std::fmt::Display) -> Error {
        Error::DocumentOpenFailure {
            reason: format!("{}: {}", source, err),
        }
    }
}
