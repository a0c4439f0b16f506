//! Text extraction: pick a strategy by file kind and return plain text.
//!
//! | Kind | Strategy |
//! |------|----------|
//! | `.txt`  | read bytes, drop invalid UTF-8 sequences |
//! | `.docx` | paragraph text in document order, one paragraph per line |
//! | `.pdf`  | native text layer, OCR fallback (see [`crate::pipeline::pdf`]) |
//!
//! Every read or parse failure is reported as
//! [`DocSumError::IoFailure`] carrying the original cause. The usability
//! floor is not checked here; a short result is still a successful
//! extraction.

use crate::config::SummarizerConfig;
use crate::document::{Document, DocumentKind, ExtractedText, ExtractionMethod};
use crate::error::DocSumError;
use crate::host::{HostCapabilities, SystemHost};
use crate::pipeline::ocr::{OcrEngine, TesseractEngine};
use crate::pipeline::pdf::{self, PdfExtractOptions};
use crate::status::{NoopStatus, SharedStatus};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Extract text from `document`.
///
/// Runs inside `spawn_blocking`: PDF rendering and OCR are CPU-bound and
/// pdfium must not run on the async worker threads.
pub async fn extract_text(
    document: &Document,
    config: &SummarizerConfig,
) -> Result<ExtractedText, DocSumError> {
    let document = document.clone();
    let host: Arc<dyn HostCapabilities> = config
        .host
        .clone()
        .unwrap_or_else(|| Arc::new(SystemHost::new(config.ocr_binary.clone())));
    let engine: Arc<dyn OcrEngine> = config.ocr_engine.clone().unwrap_or_else(|| {
        Arc::new(TesseractEngine::new(
            config.ocr_binary.clone(),
            config.ocr_language.clone(),
        ))
    });
    let status: SharedStatus = config
        .status_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopStatus));
    let threshold = config.ocr_threshold_chars;
    let dpi = config.ocr_dpi;

    tokio::task::spawn_blocking(move || {
        extract_blocking(&document, host.as_ref(), engine.as_ref(), &status, threshold, dpi)
    })
    .await
    .map_err(|e| DocSumError::Internal(format!("Extraction task panicked: {}", e)))?
}

fn extract_blocking(
    document: &Document,
    host: &dyn HostCapabilities,
    engine: &dyn OcrEngine,
    status: &SharedStatus,
    ocr_threshold_chars: usize,
    ocr_dpi: u32,
) -> Result<ExtractedText, DocSumError> {
    let path = document.path.as_path();
    info!("Extracting {:?} from {}", document.kind, path.display());

    let extracted = match document.kind {
        DocumentKind::PlainText => ExtractedText::new(read_plain_text(path)?, ExtractionMethod::Native),
        DocumentKind::WordProcessor => ExtractedText::new(read_docx(path)?, ExtractionMethod::Native),
        DocumentKind::Pdf => with_pdf_options(
            host,
            engine,
            status,
            ocr_threshold_chars,
            ocr_dpi,
            |opts| pdf::extract_pdf_blocking(path, opts),
        )?,
    };

    debug!(
        "Extracted {} chars / {} words via {:?}",
        extracted.text.len(),
        extracted.word_count,
        extracted.method
    );
    Ok(extracted)
}

/// Run `f` with PDF options drawn from the host, the OCR engine and the
/// status callback.
fn with_pdf_options<T>(
    host: &dyn HostCapabilities,
    engine: &dyn OcrEngine,
    status: &SharedStatus,
    ocr_threshold_chars: usize,
    ocr_dpi: u32,
    f: impl FnOnce(&PdfExtractOptions<'_>) -> T,
) -> T {
    // Only ask the host when a PDF might need OCR.
    let ocr_available = host.ocr_available();
    let on_warning = |msg: &str| status.on_warning(msg);
    let opts = PdfExtractOptions {
        ocr_threshold_chars,
        ocr_dpi,
        ocr_available,
        engine,
        on_warning: &on_warning,
    };
    f(&opts)
}

/// Read a text file, silently dropping undecodable byte sequences.
pub fn read_plain_text(path: &Path) -> Result<String, DocSumError> {
    let bytes = std::fs::read(path).map_err(|e| DocSumError::io_failure(path, e))?;
    Ok(decode_ignoring_invalid(&bytes))
}

/// Decode UTF-8, skipping invalid sequences instead of replacing them.
pub fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Read a `.docx` file: paragraph text in order, one paragraph per line.
pub fn read_docx(path: &Path) -> Result<String, DocSumError> {
    let bytes = std::fs::read(path).map_err(|e| DocSumError::io_failure(path, e))?;
    let docx = docx_rs::read_docx(&bytes)
        .map_err(|e| DocSumError::io_failure(path, format!("invalid .docx: {}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// Text of one paragraph: runs concatenated, including runs in hyperlinks.
fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        push_paragraph_child(child, &mut out);
    }
    out
}

fn push_paragraph_child(child: &docx_rs::ParagraphChild, out: &mut String) {
    match child {
        docx_rs::ParagraphChild::Run(run) => push_run(run, out),
        docx_rs::ParagraphChild::Hyperlink(link) => {
            for inner in &link.children {
                push_paragraph_child(inner, out);
            }
        }
        _ => {}
    }
}

fn push_run(run: &docx_rs::Run, out: &mut String) {
    for rc in &run.children {
        match rc {
            docx_rs::RunChild::Text(t) => out.push_str(&t.text),
            docx_rs::RunChild::Tab(_) => out.push('\t'),
            docx_rs::RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxedCause;
    use crate::pipeline::pdf::OCR_UNAVAILABLE_WARNING;
    use crate::status::StatusCallback;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FakeHost {
        ocr: bool,
    }

    impl HostCapabilities for FakeHost {
        fn ocr_available(&self) -> bool {
            self.ocr
        }
        fn list_models(&self) -> Vec<String> {
            Vec::new()
        }
    }

    /// Reads each page image back as its text.
    struct FileEchoEngine;

    impl OcrEngine for FileEchoEngine {
        fn recognize(&self, image_path: &Path) -> Result<String, BoxedCause> {
            Ok(std::fs::read_to_string(image_path)?)
        }
    }

    #[derive(Default)]
    struct WarningRecorder(Mutex<Vec<String>>);

    impl StatusCallback for WarningRecorder {
        fn on_warning(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    fn fake_scan(dir: &Path) -> Result<Vec<PathBuf>, DocSumError> {
        ["Scanned page one.", "Scanned page two."]
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                let path = dir.join(format!("page-{}.png", idx + 1));
                std::fs::write(&path, text).map_err(|e| DocSumError::io_failure(&path, e))?;
                Ok(path)
            })
            .collect()
    }

    #[test]
    fn decode_drops_invalid_bytes() {
        let bytes = b"caf\xC3\xA9 \xFF\xFEok";
        assert_eq!(decode_ignoring_invalid(bytes), "café ok");
    }

    #[test]
    fn read_plain_text_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let text = "Line one.\nLine two with ünïcödé.\n";
        std::fs::write(&path, text).unwrap();
        assert_eq!(read_plain_text(&path).unwrap(), text);
    }

    #[test]
    fn missing_file_is_io_failure() {
        let err = read_plain_text(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, DocSumError::IoFailure { .. }), "got {err:?}");
    }

    #[test]
    fn corrupt_docx_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        let err = read_docx(&path).unwrap_err();
        assert!(matches!(err, DocSumError::IoFailure { .. }), "got {err:?}");
    }

    #[test]
    fn docx_paragraphs_one_per_line() {
        use docx_rs::{Docx, Paragraph, Run};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        let file = std::fs::File::create(&path).unwrap();
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("First paragraph.")))
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Second "))
                    .add_run(Run::new().add_text("paragraph.")),
            )
            .build()
            .pack(file)
            .unwrap();

        assert_eq!(
            read_docx(&path).unwrap(),
            "First paragraph.\nSecond paragraph."
        );
    }

    #[tokio::test]
    async fn extract_text_dispatches_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello world").unwrap();

        let doc = Document::from_path(&path).unwrap();
        let out = extract_text(&doc, &SummarizerConfig::default()).await.unwrap();
        assert_eq!(out.text, "hello world");
        assert_eq!(out.word_count, 2);
        assert_eq!(out.method, ExtractionMethod::Native);
    }

    #[test]
    fn short_pdf_text_is_replaced_by_injected_ocr_engine() {
        let recorder = Arc::new(WarningRecorder::default());
        let status: SharedStatus = recorder.clone();

        let out = with_pdf_options(&FakeHost { ocr: true }, &FileEchoEngine, &status, 100, 300, |opts| {
            pdf::select_pdf_text("Page 1".into(), opts, Path::new("scan.pdf"), fake_scan)
        })
        .unwrap();

        assert_eq!(out.text, "Scanned page one.\nScanned page two.");
        assert_eq!(out.method, ExtractionMethod::Ocr);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn short_pdf_text_without_ocr_host_warns_through_status() {
        let recorder = Arc::new(WarningRecorder::default());
        let status: SharedStatus = recorder.clone();

        let out = with_pdf_options(&FakeHost { ocr: false }, &FileEchoEngine, &status, 100, 300, |opts| {
            pdf::select_pdf_text("Page 1".into(), opts, Path::new("scan.pdf"), |_| {
                panic!("pages must not be rendered")
            })
        })
        .unwrap();

        assert_eq!(out.text, "Page 1");
        assert_eq!(out.method, ExtractionMethod::Native);
        assert_eq!(*recorder.0.lock().unwrap(), vec![OCR_UNAVAILABLE_WARNING.to_string()]);
    }

    #[test]
    fn ocr_engine_failure_names_the_page() {
        struct FailingEngine;
        impl OcrEngine for FailingEngine {
            fn recognize(&self, _image_path: &Path) -> Result<String, BoxedCause> {
                Err("engine crashed".into())
            }
        }

        let status: SharedStatus = Arc::new(NoopStatus);
        let err = with_pdf_options(&FakeHost { ocr: true }, &FailingEngine, &status, 100, 300, |opts| {
            pdf::select_pdf_text(String::new(), opts, Path::new("scan.pdf"), fake_scan)
        })
        .unwrap_err();

        assert!(err.to_string().contains("scan.pdf"), "{err}");
        match err {
            DocSumError::IoFailure { source, .. } => {
                assert!(source.to_string().contains("OCR failed on page 1"), "{source}")
            }
            other => panic!("expected IoFailure, got {other:?}"),
        }
    }
}
