//! Per-run request parameters: model, target length, keywords, question.
//!
//! User input arrives as free text (a percentage field, a comma-separated
//! keyword field, a question box). The parsing here is deliberately
//! forgiving: anything that cannot be understood falls back to a default
//! instead of failing the run.

use serde::{Deserialize, Serialize};

/// Target SUMMARY length used when the percentage is absent or invalid.
pub const DEFAULT_LENGTH_FRACTION: f64 = 0.2;

/// What the run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Three-section structured summary.
    Summarize,
    /// Answer a question strictly from the document.
    QuestionAnswer,
}

/// Inputs for a single run, owned by value by the background task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestParameters {
    /// Model identifier. `None` uses the configured default model.
    pub model: Option<String>,
    /// Target SUMMARY length as a fraction of the source word count.
    pub length_fraction: f64,
    /// Keywords the summary should focus on (already trimmed, no empties).
    pub keywords: Vec<String>,
    /// A non-blank question selects question-answer mode.
    pub question: Option<String>,
}

impl Default for RequestParameters {
    fn default() -> Self {
        Self {
            model: None,
            length_fraction: DEFAULT_LENGTH_FRACTION,
            keywords: Vec::new(),
            question: None,
        }
    }
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the target length from raw user text such as `"35"` or `"35%"`.
    pub fn length_percentage(mut self, raw: &str) -> Self {
        self.length_fraction = parse_length_percentage(Some(raw));
        self
    }

    /// Set keywords from a raw comma-separated string.
    pub fn keywords(mut self, raw: &str) -> Self {
        self.keywords = parse_keywords(raw);
        self
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// The trimmed question, if one was given and is not blank.
    pub fn active_question(&self) -> Option<&str> {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Question-answer when a non-blank question is present, else summarize.
    pub fn mode(&self) -> Mode {
        if self.active_question().is_some() {
            Mode::QuestionAnswer
        } else {
            Mode::Summarize
        }
    }
}

/// Parse a length percentage in `[1, 100]` into a fraction.
///
/// Accepts an optional trailing `%`. Absent, blank, unparseable, non-finite
/// or out-of-range input yields [`DEFAULT_LENGTH_FRACTION`].
pub fn parse_length_percentage(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_LENGTH_FRACTION;
    };
    let cleaned = raw.trim().trim_end_matches('%').trim();

    match cleaned.parse::<f64>() {
        Ok(pct) if pct.is_finite() && (1.0..=100.0).contains(&pct) => pct / 100.0,
        _ => DEFAULT_LENGTH_FRACTION,
    }
}

/// Split a comma-separated keyword string, trimming and dropping empties.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Words the SUMMARY section should aim for.
pub fn target_word_count(source_words: usize, fraction: f64) -> usize {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.01, 1.0)
    } else {
        DEFAULT_LENGTH_FRACTION
    };
    (source_words as f64 * fraction).round() as usize
}
