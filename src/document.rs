//! Document and extracted-text values passed through the pipeline.
//!
//! Both types are transient: a [`Document`] is created from the user's
//! selection, consumed once by extraction and dropped. Nothing here touches
//! the filesystem.

use crate::error::DocSumError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The extraction strategy a file needs, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// `.txt`: decoded permissively.
    PlainText,
    /// `.docx`: paragraph text, one paragraph per line.
    WordProcessor,
    /// `.pdf`: native page text, OCR fallback for image-only pages.
    Pdf,
}

impl DocumentKind {
    /// Map a file extension (without the dot, any case) to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(DocumentKind::PlainText),
            "docx" => Some(DocumentKind::WordProcessor),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

/// A user-selected file plus its extension-derived kind.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    /// Classify `path` by extension.
    ///
    /// # Errors
    /// [`DocSumError::UnsupportedFormat`] naming the extension (empty when
    /// the file has none).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocSumError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        match DocumentKind::from_extension(&ext) {
            Some(kind) => Ok(Self {
                path: path.to_path_buf(),
                kind,
            }),
            None => Err(DocSumError::UnsupportedFormat { extension: ext }),
        }
    }
}

/// How the text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractionMethod {
    /// Text read directly from the file (txt, docx, native PDF text).
    #[default]
    Native,
    /// Text recognised from rasterised PDF pages.
    Ocr,
}

/// Unstructured text pulled out of a document.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    /// Whitespace-separated word count of `text`.
    pub word_count: usize,
    pub method: ExtractionMethod,
}

impl ExtractedText {
    pub fn new(text: String, method: ExtractionMethod) -> Self {
        let word_count = text.split_whitespace().count();
        Self {
            text,
            word_count,
            method,
        }
    }

    /// Character count after trimming surrounding whitespace.
    pub fn trimmed_len(&self) -> usize {
        self.text.trim().chars().count()
    }

    /// True when the trimmed text has at least `min_chars` characters.
    pub fn is_usable(&self, min_chars: usize) -> bool {
        self.trimmed_len() >= min_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(DocumentKind::from_extension("TXT"), Some(DocumentKind::PlainText));
        assert_eq!(DocumentKind::from_extension("Docx"), Some(DocumentKind::WordProcessor));
        assert_eq!(DocumentKind::from_extension("pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension("doc"), None);
    }

    #[test]
    fn from_path_rejects_unknown_extension() {
        match Document::from_path("/tmp/report.odt") {
            Err(DocSumError::UnsupportedFormat { extension }) => assert_eq!(extension, "odt"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn from_path_without_extension() {
        match Document::from_path("/tmp/README") {
            Err(DocSumError::UnsupportedFormat { extension }) => assert!(extension.is_empty()),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn usable_threshold_uses_trimmed_length() {
        let padded = format!("   {}   \n\n", "a".repeat(49));
        let t = ExtractedText::new(padded, ExtractionMethod::Native);
        assert_eq!(t.trimmed_len(), 49);
        assert!(!t.is_usable(50));

        let t = ExtractedText::new("b".repeat(50), ExtractionMethod::Native);
        assert!(t.is_usable(50));
    }

    #[test]
    fn word_count_on_construction() {
        let t = ExtractedText::new("one two\nthree\tfour ".into(), ExtractionMethod::Ocr);
        assert_eq!(t.word_count, 4);
        assert_eq!(t.method, ExtractionMethod::Ocr);
    }
}
