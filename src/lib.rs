//! # docsum
//!
//! Summarize documents, or answer questions about them, with a locally
//! running language model.
//!
//! ## Why this crate?
//!
//! Sending a confidential report to a hosted API is often not an option.
//! This crate keeps everything on the machine: text is extracted locally
//! (with OCR for scanned PDFs) and sent to an Ollama server on `localhost`.
//! The model is asked for a three-part summary (title, TL;DR, detailed
//! summary) or a strictly document-grounded answer, and its loosely
//! structured reply is parsed back into fields.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .txt / .docx / .pdf
//!  │
//!  ├─ 1. Parse    classify the file by extension
//!  ├─ 2. Extract  native text; PDF pages OCR'd when the text layer is thin
//!  ├─ 3. Prompt   summary template (target length, keywords) or Q&A template
//!  ├─ 4. Infer    one POST to http://localhost:11434/api/generate
//!  ├─ 5. Polish   cleanup rules, label parsing, optional word limit
//!  └─ 6. Output   rendered text + fields + per-run stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsum::{run, RequestParameters, SummarizerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummarizerConfig::default();
//!     let params = RequestParameters::new()
//!         .length_percentage("15")
//!         .keywords("revenue, churn");
//!     let output = run("report.pdf", &params, &config).await?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsum` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docsum = { version = "0.1", default-features = false }
//! ```
//!
//! ## Host requirements
//!
//! | Need | For |
//! |------|-----|
//! | Ollama on `localhost:11434` | every run |
//! | pdfium shared library (`PDFIUM_LIB_PATH`) | `.pdf` input |
//! | `tesseract` on `PATH` | scanned PDFs |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod host;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod request;
pub mod status;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    SummarizerConfig, SummarizerConfigBuilder, DEFAULT_ENDPOINT, DEFAULT_MODEL,
    DEFAULT_SUMMARY_WORD_LIMIT,
};
pub use document::{Document, DocumentKind, ExtractedText, ExtractionMethod};
pub use error::DocSumError;
pub use host::{HostCapabilities, SystemHost};
pub use output::{FormattedOutput, RunStats, StructuredSummary};
pub use pipeline::llm::{InferenceBackend, OllamaClient};
pub use pipeline::ocr::{OcrEngine, TesseractEngine};
pub use request::{Mode, RequestParameters};
pub use status::{StatusCallback, StatusEvent, WorkflowState};
pub use workflow::{answer_question, run, run_sync, save_output, spawn, summarize, RunHandle};
