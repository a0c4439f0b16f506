//! OCR: recognise text in a rasterised page image.
//!
//! The engine is an external executable (Tesseract by default) found on the
//! host's `PATH`. It is invoked once per page image with output on stdout:
//!
//! ```text
//! tesseract <page.png> stdout -l <lang>
//! ```
//!
//! Whether the binary exists is asked separately through
//! [`crate::host::HostCapabilities::ocr_available`]; this module assumes the
//! answer was yes and reports any spawn failure as an error.

use crate::error::BoxedCause;
use crate::host::binary_label;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Recognises text in one page image.
///
/// Runs on the blocking extraction thread, so implementations may block.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image_path: &Path) -> Result<String, BoxedCause>;
}

/// Runs the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: String,
    language: String,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image_path: &Path) -> Result<String, BoxedCause> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| format!("failed to run {}: {}", self.binary, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "{:?} exited with {} on {:?}",
                binary_label(Path::new(&self.binary)),
                output.status,
                binary_label(image_path)
            );
            return Err(format!("{} failed ({}): {}", self.binary, output.status, stderr.trim()).into());
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR {:?}: {} chars", binary_label(image_path), text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_an_error() {
        let engine = TesseractEngine::new("definitely-not-a-real-ocr-binary-xyz", "eng");
        let err = engine.recognize(Path::new("/tmp/page-1.png")).unwrap_err();
        assert!(err.to_string().contains("failed to run"), "got: {err}");
    }

    #[cfg(unix)]
    #[test]
    fn passes_image_then_stdout_and_language() {
        // `echo` prints its argv, which shows the exact invocation.
        let engine = TesseractEngine::new("echo", "deu");
        let text = engine.recognize(Path::new("page-3.png")).unwrap();
        assert_eq!(text.trim(), "page-3.png stdout -l deu");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_an_error() {
        let engine = TesseractEngine::new("false", "eng");
        let err = engine.recognize(Path::new("page-1.png")).unwrap_err();
        assert!(err.to_string().contains("false failed"), "got: {err}");
    }
}
