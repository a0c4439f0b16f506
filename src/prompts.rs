//! Instruction templates for the local model.
//!
//! The label names the model is asked to emit (`TITLE:`, `TLDR:`,
//! `SUMMARY:`) must match what [`crate::pipeline::response`] searches for.
//!
//! Callers can override either template via
//! [`crate::config::SummarizerConfig::summary_template`] and
//! [`crate::config::SummarizerConfig::question_template`]. Templates use
//! `{placeholder}` substitution; unknown placeholders are left untouched.
//!
//! | Placeholder | Template | Value |
//! |-------------|----------|-------|
//! | `{target_words}` | summary | target SUMMARY word count |
//! | `{keyword_instruction}` | summary | keyword sentence or the neutral one |
//! | `{question}` | question | the trimmed question |
//! | `{document}` | both | the full document text, verbatim |

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Default summarization template.
pub const DEFAULT_SUMMARY_TEMPLATE: &str = r#"You are an expert research assistant. Your task is to analyze the following document and generate a structured summary based on several rules. Your response MUST strictly follow the specified format.

**Rules:**
1.  **Structure:** Your entire response must be in the following format, with each part clearly labeled on a new line:
    TITLE: [A concise, descriptive title for the document]
    TLDR: [A one or two-sentence "Too Long; Didn't Read" summary]
    SUMMARY: [The main, detailed summary]
2.  **Length:** The main SUMMARY section must be approximately {target_words} words long.
3.  **Keyword Focus:** {keyword_instruction}

Do not add any conversational fluff or introductions outside of this structure.

**Document to Analyze:**
---
{document}
---"#;

/// Default question-answering template.
pub const DEFAULT_QUESTION_TEMPLATE: &str = r#"You are an expert research assistant. Your task is to answer the user's question based *only* on the information provided in the document below.
If the answer is not contained within the document, you must state: "{not_found}"
Do not use any external knowledge.

**User's Question:**
{question}

**Document to Analyze:**
---
{document}
---"#;

/// Sentence the model must use when the document does not hold the answer.
pub const ANSWER_NOT_FOUND: &str =
    "The answer to this question could not be found in the provided document.";

/// Keyword sentence used when no keywords are given.
pub const NEUTRAL_KEYWORD_INSTRUCTION: &str = "Create a general summary.";

/// The keyword-focus sentence for the summary prompt.
pub fn keyword_instruction(keywords: &[String]) -> String {
    let keywords: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.is_empty() {
        NEUTRAL_KEYWORD_INSTRUCTION.to_string()
    } else {
        format!(
            "The SUMMARY must pay special attention to the context surrounding these keywords: {}.",
            keywords.join(", ")
        )
    }
}

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Substitute every `{name}` in `template` in one left-to-right pass.
///
/// Inserted values are never rescanned, so braces in the document, the
/// question or the keywords reach the model verbatim.
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<Cow<'a, str>>) -> String {
    RE_PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match lookup(&caps[1]) {
            Some(value) => value.into_owned(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Build the summarization prompt.
pub fn build_summary_prompt(
    template: Option<&str>,
    document: &str,
    target_words: usize,
    keywords: &[String],
) -> String {
    fill_template(template.unwrap_or(DEFAULT_SUMMARY_TEMPLATE), |name| match name {
        "target_words" => Some(Cow::Owned(target_words.to_string())),
        "keyword_instruction" => Some(Cow::Owned(keyword_instruction(keywords))),
        "document" => Some(Cow::Borrowed(document)),
        _ => None,
    })
}

/// Build the question-answering prompt.
pub fn build_question_prompt(template: Option<&str>, document: &str, question: &str) -> String {
    fill_template(template.unwrap_or(DEFAULT_QUESTION_TEMPLATE), |name| match name {
        "not_found" => Some(Cow::Borrowed(ANSWER_NOT_FOUND)),
        "question" => Some(Cow::Borrowed(question.trim())),
        "document" => Some(Cow::Borrowed(document)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_embeds_document_and_target() {
        let p = build_summary_prompt(None, "The quick brown fox.", 42, &[]);
        assert!(p.contains("---\nThe quick brown fox.\n---"));
        assert!(p.contains("approximately 42 words long"));
        assert!(p.contains(NEUTRAL_KEYWORD_INSTRUCTION));
        for label in ["TITLE:", "TLDR:", "SUMMARY:"] {
            assert!(p.contains(label), "missing {label}");
        }
    }

    #[test]
    fn summary_prompt_lists_keywords() {
        let kws = vec!["latency".to_string(), "cost".to_string()];
        let p = build_summary_prompt(None, "doc", 10, &kws);
        assert!(p.contains("these keywords: latency, cost."));
        assert!(!p.contains(NEUTRAL_KEYWORD_INSTRUCTION));
    }

    #[test]
    fn whitespace_only_keywords_give_neutral_instruction() {
        let kws = vec!["  ".to_string(), String::new()];
        assert_eq!(keyword_instruction(&kws), NEUTRAL_KEYWORD_INSTRUCTION);
    }

    #[test]
    fn document_braces_are_not_placeholders() {
        let p = build_summary_prompt(None, "fn x() { {target_words} }", 7, &[]);
        assert!(p.contains("fn x() { {target_words} }"));
    }

    #[test]
    fn keyword_braces_do_not_pull_in_the_document() {
        let kws = vec!["{document}".to_string()];
        let p = build_summary_prompt(None, "SECRET DOC BODY", 10, &kws);
        assert_eq!(p.matches("SECRET DOC BODY").count(), 1);
        assert!(p.contains("these keywords: {document}."));
    }

    #[test]
    fn question_is_kept_verbatim() {
        let p = build_question_prompt(None, "SECRET DOC BODY", "What does {document} mean?");
        assert!(p.contains("**User's Question:**\nWhat does {document} mean?\n"));
        assert_eq!(p.matches("SECRET DOC BODY").count(), 1);
    }

    #[test]
    fn unknown_placeholders_are_left_untouched() {
        let p = build_question_prompt(Some("{lang} {question}"), "d", "q");
        assert_eq!(p, "{lang} q");
    }

    #[test]
    fn question_prompt_has_refusal_and_question() {
        let p = build_question_prompt(None, "Body text.", "  Who won?  ");
        assert!(p.contains(ANSWER_NOT_FOUND));
        assert!(p.contains("**User's Question:**\nWho won?\n"));
        assert!(p.contains("---\nBody text.\n---"));
    }

    #[test]
    fn custom_template_is_used() {
        let p = build_question_prompt(Some("Q={question} D={document}"), "d", "q");
        assert_eq!(p, "Q=q D=d");
    }
}
