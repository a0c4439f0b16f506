//! Pipeline stages for document summarization.
//!
//! Each submodule implements one transformation step, so each can be tested
//! on its own and backends (OCR engine, inference server) can be swapped
//! without touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ (prompts) ──▶ llm ──▶ postprocess ──▶ response ──▶ postprocess
//! (txt/docx/pdf)           (Ollama)  (cleanup)      (fields)     (render)
//!    │
//!    └─ pdf ──▶ ocr        (only when the native text layer is too short)
//! ```
//!
//! 1. [`extract`] picks a strategy by file kind; blocking work runs in
//!    `spawn_blocking`
//! 2. [`pdf`] reads the native text layer with pdfium and rasterises pages
//!    for OCR when it is too short
//! 3. [`ocr`] recognises one page image via an external engine
//! 4. [`llm`] makes the single inference request; the only stage with
//!    network I/O
//! 5. [`postprocess`] cleans model quirks, enforces the word limit and
//!    renders the final text
//! 6. [`response`] splits a summary response into its labelled fields

pub mod extract;
pub mod llm;
pub mod ocr;
pub mod pdf;
pub mod postprocess;
pub mod response;
