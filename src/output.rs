//! Result types returned by the workflow.

use crate::document::ExtractionMethod;
use crate::request::Mode;
use serde::{Deserialize, Serialize};

/// Placeholder rendered for a field the model did not provide.
pub const EMPTY_MARKER: &str = "N/A";

/// Line separating sections in the rendered output.
pub const SECTION_RULE: &str = "------------------------------------";

/// The three fields of a structured summary. Empty means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    pub title: String,
    pub tldr: String,
    pub summary: String,
}

/// Final user-facing result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedOutput {
    pub mode: Mode,
    /// The rendered text, exactly as displayed and saved.
    pub text: String,
    /// Parsed fields; present in summarize mode only.
    pub summary: Option<StructuredSummary>,
    /// Question and answer; present in question mode only.
    pub question: Option<String>,
    pub answer: Option<String>,
    pub stats: RunStats,
}

/// Per-run statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Model identifier the request was sent to.
    pub model: String,
    /// Word count of the extracted source text.
    pub source_words: usize,
    /// Target SUMMARY words (summarize mode only).
    pub target_words: Option<usize>,
    pub extraction_method: ExtractionMethod,
    pub extraction_duration_ms: u64,
    pub inference_duration_ms: u64,
    pub total_duration_ms: u64,
}
