//! PDF text: native text layer first, OCR of rasterised pages as fallback.
//!
//! ## Why a fallback at all?
//!
//! Scanned PDFs carry page images and no text layer, so pdfium's text
//! extraction returns nothing (or a few stray characters from a header).
//! When the trimmed native text is shorter than
//! [`crate::config::SummarizerConfig::ocr_threshold_chars`] and an OCR engine
//! is installed, every page is rendered at
//! [`crate::config::SummarizerConfig::ocr_dpi`] into a scratch directory and
//! each image is recognised on its own; the per-page results replace the
//! native text entirely.
//!
//! Without an OCR engine the short native text is returned as-is. The
//! workflow then rejects it as too short, which is where the user-facing
//! failure belongs.
//!
//! Everything here is blocking: pdfium is not async-safe, and the caller
//! runs it inside `spawn_blocking`.

use crate::document::{ExtractedText, ExtractionMethod};
use crate::error::{BoxedCause, DocSumError};
use crate::pipeline::ocr::OcrEngine;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Warning emitted when OCR would be needed but no engine is installed.
pub const OCR_UNAVAILABLE_WARNING: &str =
    "PDF has little or no text layer and no OCR engine is available; extraction may be incomplete.";

/// Inputs for [`extract_pdf_blocking`].
pub struct PdfExtractOptions<'a> {
    pub ocr_threshold_chars: usize,
    pub ocr_dpi: u32,
    pub ocr_available: bool,
    pub engine: &'a dyn OcrEngine,
    pub on_warning: &'a (dyn Fn(&str) + Send + Sync),
}

/// Bind to a pdfium library.
///
/// Resolution order: `PDFIUM_LIB_PATH`, a library in the working directory,
/// then the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, DocSumError> {
    let bindings = match std::env::var_os("PDFIUM_LIB_PATH") {
        Some(path) => Pdfium::bind_to_library(&PathBuf::from(path)),
        None => Pdfium::bind_to_library(&Path::new(".").join(Pdfium::pdfium_platform_library_name()))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| DocSumError::PdfiumUnavailable(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// Extract text from a PDF, falling back to OCR for image-only documents.
pub fn extract_pdf_blocking(
    pdf_path: &Path,
    opts: &PdfExtractOptions<'_>,
) -> Result<ExtractedText, DocSumError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| DocSumError::io_failure(pdf_path, format!("{:?}", e)))?;

    let native = native_text(&document, pdf_path)?;

    select_pdf_text(native, opts, pdf_path, |dir| {
        render_pages(&document, pdf_path, opts.ocr_dpi, dir)
    })
}

/// Apply [`choose_pdf_text`] with the options' engine as the OCR step.
///
/// `render_pages` writes one image per page into a scratch directory and
/// returns their paths in page order. The directory is removed afterwards.
pub fn select_pdf_text<R>(
    native: String,
    opts: &PdfExtractOptions<'_>,
    pdf_path: &Path,
    render_pages: R,
) -> Result<ExtractedText, DocSumError>
where
    R: FnOnce(&Path) -> Result<Vec<PathBuf>, DocSumError>,
{
    choose_pdf_text(
        native,
        opts.ocr_threshold_chars,
        opts.ocr_available,
        opts.on_warning,
        || {
            let scratch = tempfile::tempdir().map_err(|e| DocSumError::io_failure(pdf_path, e))?;
            let images = render_pages(scratch.path())?;
            recognize_pages(&images, opts.engine, pdf_path)
        },
    )
}

/// Decide between native text and OCR output.
///
/// `run_ocr` is only invoked when the trimmed native text is shorter than
/// `threshold` and `ocr_available` is true.
pub fn choose_pdf_text<F>(
    native: String,
    threshold: usize,
    ocr_available: bool,
    on_warning: &(dyn Fn(&str) + Send + Sync),
    run_ocr: F,
) -> Result<ExtractedText, DocSumError>
where
    F: FnOnce() -> Result<String, DocSumError>,
{
    let native_len = native.trim().chars().count();
    if native_len >= threshold {
        debug!("Native PDF text: {} chars", native_len);
        return Ok(ExtractedText::new(native, ExtractionMethod::Native));
    }

    if ocr_available {
        info!(
            "Native PDF text is {} chars (< {}), running OCR",
            native_len, threshold
        );
        let text = run_ocr()?;
        return Ok(ExtractedText::new(text, ExtractionMethod::Ocr));
    }

    warn!(
        "Native PDF text is {} chars (< {}) and no OCR engine is available",
        native_len, threshold
    );
    on_warning(OCR_UNAVAILABLE_WARNING);
    Ok(ExtractedText::new(native, ExtractionMethod::Native))
}

/// Concatenate every page's text layer in page order, trimmed.
fn native_text(document: &PdfDocument<'_>, pdf_path: &Path) -> Result<String, DocSumError> {
    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut parts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| {
            DocSumError::io_failure(
                pdf_path,
                format!("text extraction failed on page {}: {:?}", idx + 1, e),
            )
        })?;
        parts.push(text.all());
    }

    Ok(parts.join("\n").trim().to_string())
}

/// Rasterise every page at `dpi` into `dir`.
fn render_pages(
    document: &PdfDocument<'_>,
    pdf_path: &Path,
    dpi: u32,
    dir: &Path,
) -> Result<Vec<PathBuf>, DocSumError> {
    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);
    let pages = document.pages();
    let mut images = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        let image_path = render_page_png(&page, &render_config, dir, idx + 1)
            .map_err(|e| DocSumError::io_failure(pdf_path, e))?;
        images.push(image_path);
    }

    Ok(images)
}

/// OCR each page image and join the results one page per line.
fn recognize_pages(
    images: &[PathBuf],
    engine: &dyn OcrEngine,
    pdf_path: &Path,
) -> Result<String, DocSumError> {
    let total = images.len();
    let mut texts = Vec::with_capacity(total);

    for (idx, image_path) in images.iter().enumerate() {
        let page_num = idx + 1;
        let text = engine.recognize(image_path).map_err(|e| {
            DocSumError::io_failure(pdf_path, format!("OCR failed on page {}: {}", page_num, e))
        })?;
        debug!("OCR page {}/{}: {} chars", page_num, total, text.len());
        texts.push(text);
    }

    info!("OCR complete: {} pages", texts.len());
    Ok(texts.join("\n"))
}

/// Rasterise one page into `dir/page-N.png`.
fn render_page_png(
    page: &PdfPage<'_>,
    render_config: &PdfRenderConfig,
    dir: &Path,
    page_num: usize,
) -> Result<PathBuf, BoxedCause> {
    let bitmap = page
        .render_with_config(render_config)
        .map_err(|e| format!("rasterisation failed on page {}: {:?}", page_num, e))?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        page_num,
        image.width(),
        image.height()
    );

    let path = dir.join(format!("page-{page_num}.png"));
    image.save_with_format(&path, image::ImageFormat::Png)?;
    Ok(path)
}
