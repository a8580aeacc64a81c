//! Error types for the edgequake-report library.
//!
//! Every failure a report request can hit is folded into a single
//! [`ReportError`]. Each variant belongs to exactly one user-facing category:
//!
//! * caller-correctable input problems (bad coordinates, a malformed or
//!   encrypted PDF, a document too large to render) map to HTTP 400;
//! * everything else (engine not installed, container serialisation,
//!   a panicked worker) is an internal fault and maps to HTTP 500.
//!
//! No variant is retryable: the pipeline is deterministic, so the same input
//! produces the same failure.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the report pipeline.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Coordinate errors ─────────────────────────────────────────────────
    /// No coordinate source was supplied, or none of its entries was usable.
    #[error("{reason}")]
    InvalidCoordinateInput { reason: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The PDF is empty, cannot be opened, or a page failed to render.
    #[error("{detail}")]
    MalformedDocument { detail: String },

    /// The PDF needs a password to open.
    #[error("PDF is password-protected")]
    EncryptedDocument,

    /// Memory or size limits were hit while opening or rendering the PDF.
    #[error("{detail}")]
    ResourceExhausted { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not write the report to disk.
    #[error("Failed to write output to {path}: {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Internal errors ───────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install libpdfium on the library search path."
    )]
    PdfiumBindingFailed(String),

    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

/// The user-facing category of a [`ReportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidCoordinateInput,
    MalformedDocument,
    EncryptedDocument,
    ResourceExhausted,
    InternalFault,
}

impl ReportError {
    pub(crate) fn invalid_coordinates(reason: impl Into<String>) -> Self {
        Self::InvalidCoordinateInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedDocument {
            detail: detail.into(),
        }
    }

    pub(crate) fn exhausted(detail: impl Into<String>) -> Self {
        Self::ResourceExhausted {
            detail: detail.into(),
        }
    }

    /// The category this error is reported under.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCoordinateInput { .. } => ErrorCategory::InvalidCoordinateInput,
            Self::MalformedDocument { .. } => ErrorCategory::MalformedDocument,
            Self::EncryptedDocument => ErrorCategory::EncryptedDocument,
            Self::ResourceExhausted { .. } => ErrorCategory::ResourceExhausted,
            Self::InvalidConfig(_)
            | Self::OutputWriteFailed { .. }
            | Self::PdfiumBindingFailed(_)
            | Self::Internal(_) => ErrorCategory::InternalFault,
        }
    }

    /// `true` when the caller can fix the request and try again.
    pub fn is_client_error(&self) -> bool {
        self.category() != ErrorCategory::InternalFault
    }

    /// HTTP status for this error: 400 for input errors, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// Message sent back to the caller.
    ///
    /// Internal faults are prefixed so the raw diagnostic is still visible.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            format!("Internal server error: {self}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_400() {
        let errors = [
            ReportError::invalid_coordinates("No coordinates supplied"),
            ReportError::malformed("PDF is empty"),
            ReportError::EncryptedDocument,
            ReportError::exhausted("Not enough memory to render page 2"),
        ];
        for e in errors {
            assert_eq!(e.status_code(), 400, "{e:?}");
            assert!(e.is_client_error());
        }
    }

    #[test]
    fn internal_errors_map_to_500() {
        let e = ReportError::Internal("zip writer failed".into());
        assert_eq!(e.status_code(), 500);
        assert_eq!(e.category(), ErrorCategory::InternalFault);
        assert_eq!(e.public_message(), "Internal server error: zip writer failed");

        let e = ReportError::PdfiumBindingFailed("libpdfium.so: not found".into());
        assert_eq!(e.status_code(), 500);
        assert!(e.public_message().contains("libpdfium.so"));
    }

    #[test]
    fn encrypted_is_its_own_category() {
        let e = ReportError::EncryptedDocument;
        assert_eq!(e.category(), ErrorCategory::EncryptedDocument);
        assert_ne!(e.category(), ErrorCategory::MalformedDocument);
        assert!(e.to_string().contains("password"));
    }

    #[test]
    fn client_message_is_the_bare_reason() {
        let e = ReportError::malformed("Failed to render page 3: bad stream");
        assert_eq!(e.public_message(), "Failed to render page 3: bad stream");
    }
}
