//! Post-processing: deterministic cleanup of model output and final rendering.
//!
//! Local models often ignore formatting instructions in small ways: they wrap
//! the answer in a code fence, emit `\r\n`, pad with zero-width characters,
//! or add a wall of blank lines. These rules fix such quirks before the
//! response is parsed, without touching content.
//!
//! Rules (applied in order by [`clean_response`]):
//! 1. Strip an outer code fence
//! 2. Normalise line endings (CRLF → LF)
//! 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 4. Trim trailing whitespace per line
//! 5. Collapse 3+ consecutive blank lines down to 2
//!
//! Rendering ([`render_summary`], [`render_answer`]) produces the exact text
//! shown to the user and written by [`crate::workflow::save_output`].

use crate::output::{StructuredSummary, EMPTY_MARKER, SECTION_RULE};
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to a raw model response.
pub fn clean_response(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    collapse_blank_lines(&s)
}

// ── Rule 1: Strip outer code fence ───────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\r?\n(.*)\r?\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Word limit ───────────────────────────────────────────────────────────────

/// Truncate `text` to at most `limit` words.
///
/// Text within the limit is returned unchanged. Otherwise the first `limit`
/// words are kept (joined by single spaces) and cut after the last `.`,
/// `!` or `?`; with no sentence terminator an ellipsis is appended.
pub fn enforce_word_limit(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return text.to_string();
    }

    let truncated = words[..limit].join(" ");
    match truncated.rfind(['.', '!', '?']) {
        Some(idx) => truncated[..=idx].to_string(),
        None => format!("{truncated}..."),
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

fn or_marker(value: &str) -> &str {
    let v = value.trim();
    if v.is_empty() {
        EMPTY_MARKER
    } else {
        v
    }
}

/// Render a structured summary as the three-section block.
pub fn render_summary(s: &StructuredSummary) -> String {
    format!(
        "TITLE: {}\n\nTL;DR: {}\n\n{}\n\nSUMMARY:\n{}",
        or_marker(&s.title),
        or_marker(&s.tldr),
        SECTION_RULE,
        or_marker(&s.summary)
    )
}

/// Render a question and its answer.
pub fn render_answer(question: &str, answer: &str) -> String {
    format!(
        "QUESTION: {}\n\n{}\n\nANSWER:\n{}",
        question.trim(),
        SECTION_RULE,
        answer.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_fence_with_language() {
        assert_eq!(strip_outer_fence("```text\nTITLE: x\n```"), "TITLE: x");
    }

    #[test]
    fn no_fence_passthrough() {
        assert_eq!(strip_outer_fence("TITLE: x"), "TITLE: x");
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        assert_eq!(remove_invisible_chars("he\u{200B}llo\u{FEFF}"), "hello");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn clean_response_full_pipeline() {
        let input = "```\r\nTITLE: T   \r\n\r\n\r\n\r\n\r\nSUMMARY: S\u{200B}\r\n```";
        assert_eq!(clean_response(input), "TITLE: T\n\n\nSUMMARY: S");
    }

    #[test]
    fn word_limit_under_limit_is_unchanged() {
        let text = "Short  text\nstays exactly.";
        assert_eq!(enforce_word_limit(text, 10), text);
    }

    #[test]
    fn word_limit_cuts_at_sentence_end() {
        let text = "One two. Three four! Five six seven";
        assert_eq!(enforce_word_limit(text, 5), "One two. Three four!");
    }

    #[test]
    fn word_limit_without_terminator_adds_ellipsis() {
        assert_eq!(enforce_word_limit("a b c d e f", 3), "a b c...");
    }

    #[test]
    fn render_summary_uses_marker_for_empty_fields() {
        let s = StructuredSummary {
            title: String::new(),
            tldr: "  ".into(),
            summary: "Body.".into(),
        };
        assert_eq!(
            render_summary(&s),
            "TITLE: N/A\n\nTL;DR: N/A\n\n------------------------------------\n\nSUMMARY:\nBody."
        );
    }

    #[test]
    fn render_answer_exact_format() {
        assert_eq!(
            render_answer("What is the conclusion?", "It works."),
            "QUESTION: What is the conclusion?\n\n------------------------------------\n\nANSWER:\nIt works."
        );
    }
}
