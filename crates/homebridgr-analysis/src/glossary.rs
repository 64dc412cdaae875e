//! Local-rules fallback for when the model backend is unreachable.
//!
//! A small built-in glossary of common campus slang, matched
//! case-insensitively against the message text. Only the ad-hoc route uses
//! it, and only on transport failure.

use crate::types::{CaptionAnalysis, TermExplanation};

const GLOSSARY: &[(&str, &str)] = &[
    (
        "no cap",
        "Slang for \"no lie\" or \"for real\"; it emphasizes that the statement is true.",
    ),
    (
        "slay",
        "Modern slang meaning to do something exceptionally well.",
    ),
    (
        "rizz",
        "Short for charisma; the ability to charm or win someone over.",
    ),
    ("goat", "Acronym for Greatest Of All Time."),
    (
        "lowkey",
        "Means quietly, slightly, or without wanting attention.",
    ),
    ("bet", "An affirmation meaning \"okay\" or \"sounds good\"."),
    ("fam", "Short for family; used for close friends."),
    (
        "finals week",
        "The end-of-term exam period at US colleges, usually a stressful stretch.",
    ),
    (
        "midterms",
        "Exams given around the middle of an academic term.",
    ),
];

/// Match the message against the built-in glossary.
///
/// Returns `None` when nothing matches, so callers surface the original
/// failure instead of inventing an empty analysis.
pub fn local_analysis(message: &str) -> Option<CaptionAnalysis> {
    let haystack = message.to_lowercase();

    let terms: Vec<TermExplanation> = GLOSSARY
        .iter()
        .filter(|(term, _)| message_contains(&haystack, term))
        .map(|(term, explanation)| TermExplanation {
            term: (*term).to_string(),
            explanation: (*explanation).to_string(),
        })
        .collect();

    if terms.is_empty() {
        return None;
    }

    let raw_model_text = serde_json::json!({ "terms": &terms }).to_string();

    Some(CaptionAnalysis {
        terms,
        raw_model_text,
    })
}

/// Multi-word terms match as substrings; single words must match a whole
/// token so "bet" does not fire inside "better".
fn message_contains(haystack: &str, term: &str) -> bool {
    if term.contains(' ') {
        haystack.contains(term)
    } else {
        haystack
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == term)
    }
}
