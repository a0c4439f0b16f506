//! Configuration for document summarization runs.
//!
//! All behaviour that is not per-request (endpoint, default model,
//! thresholds, prompt templates, injected backends) lives in
//! [`SummarizerConfig`], built via [`SummarizerConfigBuilder`]. Per-request
//! input (model override, length, keywords, question) lives in
//! [`crate::request::RequestParameters`].
//!
//! Tests substitute the inference backend, OCR engine and host checks here
//! instead of touching the network or the host's binaries.

use crate::error::DocSumError;
use crate::host::HostCapabilities;
use crate::pipeline::llm::InferenceBackend;
use crate::pipeline::ocr::OcrEngine;
use crate::status::SharedStatus;
use std::fmt;
use std::sync::Arc;

/// Default local inference endpoint (Ollama's generate API).
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Default cap on the SUMMARY (or answer) length, in words.
pub const DEFAULT_SUMMARY_WORD_LIMIT: usize = 1000;

/// Configuration for summarize / question-answer runs.
///
/// # Example
/// ```rust
/// use docsum::SummarizerConfig;
///
/// let config = SummarizerConfig::builder()
///     .model("gemma:2b")
///     .request_timeout_secs(120)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemma:2b");
/// ```
#[derive(Clone)]
pub struct SummarizerConfig {
    /// Full URL of the generate endpoint. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Model used when the request does not name one. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Timeout for the single inference request, in seconds. Default: 600.
    ///
    /// Local models on CPU can take minutes for long documents, and there is
    /// no streaming, so the whole answer must arrive within this window.
    pub request_timeout_secs: u64,

    /// Minimum trimmed characters for extracted text to be usable. Default: 50.
    pub min_usable_chars: usize,

    /// Native PDF text shorter than this (trimmed) triggers OCR. Default: 100.
    pub ocr_threshold_chars: usize,

    /// Rasterisation DPI for OCR. Range: 72–600. Default: 300.
    pub ocr_dpi: u32,

    /// OCR language passed to the engine. Default: "eng".
    pub ocr_language: String,

    /// OCR executable name or path. Default: "tesseract".
    pub ocr_binary: String,

    /// Truncate the SUMMARY (or answer) to this many words at a sentence
    /// boundary. Default: `Some(DEFAULT_SUMMARY_WORD_LIMIT)`; None disables it.
    pub summary_word_limit: Option<usize>,

    /// Summarization template override. See [`crate::prompts`].
    pub summary_template: Option<String>,

    /// Question-answer template override. See [`crate::prompts`].
    pub question_template: Option<String>,

    /// Pre-constructed inference backend. Takes precedence over `endpoint`.
    pub backend: Option<Arc<dyn InferenceBackend>>,

    /// Host capability checks. If None, uses [`crate::host::SystemHost`].
    pub host: Option<Arc<dyn HostCapabilities>>,

    /// OCR engine. If None, uses [`crate::pipeline::ocr::TesseractEngine`].
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,

    /// Status side channel. If None, status events are dropped.
    pub status_callback: Option<SharedStatus>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 600,
            min_usable_chars: 50,
            ocr_threshold_chars: 100,
            ocr_dpi: 300,
            ocr_language: "eng".to_string(),
            ocr_binary: "tesseract".to_string(),
            summary_word_limit: Some(DEFAULT_SUMMARY_WORD_LIMIT),
            summary_template: None,
            question_template: None,
            backend: None,
            host: None,
            ocr_engine: None,
            status_callback: None,
        }
    }
}

impl fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("min_usable_chars", &self.min_usable_chars)
            .field("ocr_threshold_chars", &self.ocr_threshold_chars)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("ocr_language", &self.ocr_language)
            .field("ocr_binary", &self.ocr_binary)
            .field("summary_word_limit", &self.summary_word_limit)
            .field("summary_template", &self.summary_template.as_ref().map(|_| "<custom>"))
            .field("question_template", &self.question_template.as_ref().map(|_| "<custom>"))
            .field("backend", &self.backend.as_ref().map(|_| "<dyn InferenceBackend>"))
            .field("host", &self.host.as_ref().map(|_| "<dyn HostCapabilities>"))
            .field("ocr_engine", &self.ocr_engine.as_ref().map(|_| "<dyn OcrEngine>"))
            .finish()
    }
}

impl SummarizerConfig {
    /// Create a new builder for `SummarizerConfig`.
    pub fn builder() -> SummarizerConfigBuilder {
        SummarizerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummarizerConfig`].
#[derive(Debug)]
pub struct SummarizerConfigBuilder {
    config: SummarizerConfig,
}

impl SummarizerConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn min_usable_chars(mut self, n: usize) -> Self {
        self.config.min_usable_chars = n;
        self
    }

    pub fn ocr_threshold_chars(mut self, n: usize) -> Self {
        self.config.ocr_threshold_chars = n;
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr_dpi = dpi;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn ocr_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.ocr_binary = binary.into();
        self
    }

    pub fn summary_word_limit(mut self, limit: usize) -> Self {
        self.config.summary_word_limit = Some(limit);
        self
    }

    /// Keep the model's SUMMARY (or answer) at full length.
    pub fn no_summary_word_limit(mut self) -> Self {
        self.config.summary_word_limit = None;
        self
    }

    pub fn summary_template(mut self, template: impl Into<String>) -> Self {
        self.config.summary_template = Some(template.into());
        self
    }

    pub fn question_template(mut self, template: impl Into<String>) -> Self {
        self.config.question_template = Some(template.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn InferenceBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn host(mut self, host: Arc<dyn HostCapabilities>) -> Self {
        self.config.host = Some(host);
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    pub fn status_callback(mut self, cb: SharedStatus) -> Self {
        self.config.status_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummarizerConfig, DocSumError> {
        let c = &self.config;
        if c.backend.is_none()
            && !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://"))
        {
            return Err(DocSumError::InvalidConfig(format!(
                "endpoint must be an http(s) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.model.trim().is_empty() {
            return Err(DocSumError::InvalidConfig("model must not be empty".into()));
        }
        if c.request_timeout_secs == 0 {
            return Err(DocSumError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if !(72..=600).contains(&c.ocr_dpi) {
            return Err(DocSumError::InvalidConfig(format!(
                "OCR DPI must be 72–600, got {}",
                c.ocr_dpi
            )));
        }
        if c.summary_word_limit == Some(0) {
            return Err(DocSumError::InvalidConfig(
                "word limit must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_ollama() {
        let c = SummarizerConfig::default();
        assert_eq!(c.endpoint, "http://localhost:11434/api/generate");
        assert_eq!(c.request_timeout_secs, 600);
        assert_eq!(c.min_usable_chars, 50);
        assert_eq!(c.ocr_threshold_chars, 100);
        assert_eq!(c.ocr_dpi, 300);
        assert_eq!(c.summary_word_limit, Some(1000));
    }

    #[test]
    fn word_limit_can_be_disabled() {
        let c = SummarizerConfig::builder()
            .summary_word_limit(50)
            .no_summary_word_limit()
            .build()
            .unwrap();
        assert!(c.summary_word_limit.is_none());
    }

    #[test]
    fn builder_rejects_bad_endpoint() {
        let err = SummarizerConfig::builder()
            .endpoint("localhost:11434")
            .build()
            .unwrap_err();
        assert!(matches!(err, DocSumError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeout_and_bad_dpi() {
        assert!(SummarizerConfig::builder().request_timeout_secs(0).build().is_err());
        assert!(SummarizerConfig::builder().ocr_dpi(20).build().is_err());
        assert!(SummarizerConfig::builder().summary_word_limit(0).build().is_err());
    }

    #[test]
    fn debug_hides_trait_objects() {
        let c = SummarizerConfig::builder()
            .summary_template("T {document}")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<custom>"));
        assert!(!dbg.contains("T {document}"));
    }
}
