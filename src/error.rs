//! Error types for the docsum library.
//!
//! Every stage is all-or-nothing: a failure anywhere in the pipeline is
//! returned unchanged to the caller of the `workflow` entry points as a
//! [`DocSumError`]. No stage retries or produces partial output, so there is
//! a single fatal error type rather than a fatal/non-fatal split.
//!
//! The `Display` text of each variant is written to be shown to the user
//! as-is.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed underlying cause carried by [`DocSumError::IoFailure`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors returned by the docsum library.
#[derive(Debug, Error)]
pub enum DocSumError {
    // ── Extraction errors ─────────────────────────────────────────────────
    /// The file extension is not one of `.txt`, `.docx`, `.pdf`.
    #[error("Unsupported file type: '{extension}'\nSupported types are .txt, .docx and .pdf.")]
    UnsupportedFormat { extension: String },

    /// The file could not be read or parsed (missing, unreadable, corrupt).
    #[error("Failed to read or parse file '{path}': {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: BoxedCause,
    },

    /// Extraction succeeded but produced too little text to work with.
    #[error(
        "Document is empty or could not be read ({chars} characters, need at least {minimum}).\n\
For image-based PDFs, ensure Tesseract is installed."
    )]
    DocumentTooShort { chars: usize, minimum: usize },

    // ── Inference errors ──────────────────────────────────────────────────
    /// Nothing is listening at the inference endpoint.
    #[error("Could not connect to the local inference service at {endpoint}. Is Ollama running?")]
    ServiceUnavailable { endpoint: String },

    /// Transport error, timeout, non-2xx status or undecodable body.
    #[error("Inference request failed: {detail}")]
    RequestFailed { detail: String },

    /// The endpoint answered but the generated text was empty.
    #[error("The model returned an empty response.")]
    EmptyResponse,

    // ── Request errors ────────────────────────────────────────────────────
    /// Question mode was requested without a question.
    #[error("A question is required in question mode, but the question is blank.")]
    InvalidQuestion,

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF support needs the pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumUnavailable(String),

    // ── Output / config errors ────────────────────────────────────────────
    /// Could not write the saved output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a background task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocSumError {
    /// Wrap any read/parse failure for `path` into [`DocSumError::IoFailure`].
    pub fn io_failure(path: impl Into<PathBuf>, cause: impl Into<BoxedCause>) -> Self {
        DocSumError::IoFailure {
            path: path.into(),
            source: cause.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn unsupported_format_names_extension() {
        let e = DocSumError::UnsupportedFormat {
            extension: "odt".into(),
        };
        assert!(e.to_string().contains("'odt'"), "got: {e}");
    }

    #[test]
    fn io_failure_keeps_original_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = DocSumError::io_failure("/tmp/a.txt", cause);
        assert!(e.to_string().contains("/tmp/a.txt"));
        let source = e.source().expect("source should be kept");
        assert!(source.to_string().contains("denied"));
    }

    #[test]
    fn io_failure_accepts_string_cause() {
        let e = DocSumError::io_failure("x.pdf", "broken xref".to_string());
        assert!(e.to_string().contains("broken xref"));
    }

    #[test]
    fn document_too_short_display() {
        let e = DocSumError::DocumentTooShort {
            chars: 10,
            minimum: 50,
        };
        let msg = e.to_string();
        assert!(msg.contains("10 characters"), "got: {msg}");
        assert!(msg.contains("50"));
    }

    #[test]
    fn service_unavailable_display() {
        let e = DocSumError::ServiceUnavailable {
            endpoint: "http://localhost:11434/api/generate".into(),
        };
        assert!(e.to_string().contains("Is Ollama running?"));
    }
}
