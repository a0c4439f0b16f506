//! Parse the model's semi-structured summary into title, digest and summary.
//!
//! The model is asked for `TITLE:`, `TLDR:` and `SUMMARY:` sections but is
//! not guaranteed to comply. Parsing is therefore positional rather than
//! grammatical:
//!
//! 1. find the earliest case-insensitive occurrence of each label
//!    (`TLDR:` and `TL;DR:` both mark the digest);
//! 2. sort the found labels by position;
//! 3. each field is the text strictly between its label and the next found
//!    label, or the end of the text.
//!
//! Labels may appear in any order or not at all. When none is found, the
//! whole response is the summary.

use crate::output::StructuredSummary;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)TITLE:").unwrap());
static RE_DIGEST: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)TL;?DR:").unwrap());
static RE_SUMMARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)SUMMARY:").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Digest,
    Summary,
}

/// A located label: byte range of the label itself.
#[derive(Debug, Clone, Copy)]
struct LabelMatch {
    field: Field,
    start: usize,
    end: usize,
}

/// Split a raw model response into its three labelled fields.
pub fn parse_structured_response(raw: &str) -> StructuredSummary {
    let mut found: Vec<LabelMatch> = [
        (Field::Title, &*RE_TITLE),
        (Field::Digest, &*RE_DIGEST),
        (Field::Summary, &*RE_SUMMARY),
    ]
    .into_iter()
    .filter_map(|(field, re)| {
        re.find(raw).map(|m| LabelMatch {
            field,
            start: m.start(),
            end: m.end(),
        })
    })
    .collect();

    if found.is_empty() {
        return StructuredSummary {
            title: String::new(),
            tldr: String::new(),
            summary: raw.to_string(),
        };
    }

    found.sort_by_key(|m| m.start);

    let mut out = StructuredSummary::default();
    for (i, label) in found.iter().enumerate() {
        let value_end = found.get(i + 1).map_or(raw.len(), |next| next.start);
        let value = clean_field(&raw[label.end..value_end]);
        match label.field {
            Field::Title => out.title = value,
            Field::Digest => out.tldr = value,
            Field::Summary => out.summary = value,
        }
    }
    out
}

/// Trim whitespace and stray Markdown bold markers around a field value.
///
/// `**TITLE:** Foo` leaves `** Foo` after the label, and the preceding
/// field ends in `**`; both are noise.
fn clean_field(value: &str) -> String {
    value.trim().trim_matches('*').trim().to_string()
}
