//! Response parsing and validation.
//!
//! The runtime wraps the model's answer in a provider-specific envelope whose
//! generated text can appear under several keys. Extraction strategies are
//! tried in a fixed priority order; the first non-blank hit wins.

use serde_json::Value;

use crate::error::AnalysisError;
use crate::types::{CaptionAnalysis, TermExplanation};

const SNIPPET_LEN: usize = 200;

/// Envelope locations that may carry the generated text, in priority order.
const TEXT_EXTRACTORS: &[fn(&Value) -> Option<&str>] = &[
    extract_content_blocks,
    extract_output_text,
    extract_completion,
    extract_results,
];

/// Parse and validate a raw transport body into a `CaptionAnalysis`.
///
/// Pure given the input bytes: the same body always yields the same result.
pub fn parse_analysis(body: &[u8]) -> Result<CaptionAnalysis, AnalysisError> {
    if body.is_empty() {
        return Err(AnalysisError::EmptyResponseBody);
    }

    let text = std::str::from_utf8(body).map_err(|_| AnalysisError::InvalidEncoding)?;

    let envelope: Value =
        serde_json::from_str(text).map_err(|_| AnalysisError::MalformedEnvelope {
            snippet: snippet(text),
        })?;

    let model_text = extract_model_text(&envelope).ok_or(AnalysisError::MissingText)?;

    // The model's own output is parsed separately from the envelope: a
    // failure here signals a prompt/model problem, not a transport problem.
    let structured: Value =
        serde_json::from_str(model_text).map_err(|_| AnalysisError::ModelTextNotJson)?;

    let terms = normalize_terms(structured.get("terms"))?;

    Ok(CaptionAnalysis {
        terms,
        raw_model_text: model_text.to_string(),
    })
}

/// First ~200 characters of the raw response, for diagnostics.
fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}

fn extract_model_text(envelope: &Value) -> Option<&str> {
    TEXT_EXTRACTORS.iter().find_map(|extract| extract(envelope))
}

/// Anthropic messages shape: `content` is a list of typed blocks.
fn extract_content_blocks(envelope: &Value) -> Option<&str> {
    envelope
        .get("content")?
        .as_array()?
        .iter()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .find(|text| !text.trim().is_empty())
}

fn extract_output_text(envelope: &Value) -> Option<&str> {
    non_blank(envelope.get("outputText"))
}

fn extract_completion(envelope: &Value) -> Option<&str> {
    non_blank(envelope.get("completion"))
}

/// Titan shape: `results` is a list of `{ text }` entries.
fn extract_results(envelope: &Value) -> Option<&str> {
    envelope
        .get("results")?
        .as_array()?
        .iter()
        .filter_map(|entry| entry.get("text").and_then(Value::as_str))
        .find(|text| !text.trim().is_empty())
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

/// Validate and clean the model's `terms` payload.
///
/// Malformed entries are dropped rather than failing the batch; a batch with
/// no well-formed entry at all is an error.
fn normalize_terms(value: Option<&Value>) -> Result<Vec<TermExplanation>, AnalysisError> {
    let entries = value
        .and_then(Value::as_array)
        .ok_or(AnalysisError::MissingTerms)?;

    let terms: Vec<TermExplanation> = entries
        .iter()
        .filter_map(|entry| {
            let term = entry.get("term")?.as_str()?.trim();
            let explanation = entry.get("explanation")?.as_str()?.trim();
            if term.is_empty() || explanation.is_empty() {
                return None;
            }
            Some(TermExplanation {
                term: term.to_string(),
                explanation: explanation.to_string(),
            })
        })
        .collect();

    if terms.is_empty() {
        return Err(AnalysisError::EmptyTerms);
    }

    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope_with_text(text: &str) -> Vec<u8> {
        json!({ "content": [{ "type": "text", "text": text }] })
            .to_string()
            .into_bytes()
    }

    #[test]
    fn test_parses_content_block_envelope() {
        let inner = json!({
            "terms": [
                { "term": "slay", "explanation": "Means to do exceptionally well." },
                { "term": "cap", "explanation": "Slang for lying." },
            ]
        })
        .to_string();

        let analysis = parse_analysis(&envelope_with_text(&inner)).unwrap();

        assert_eq!(analysis.terms.len(), 2);
        assert_eq!(analysis.terms[0].term, "slay");
        assert_eq!(analysis.terms[1].term, "cap");
        assert_eq!(analysis.raw_model_text, inner);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let inner = json!({ "terms": [{ "term": "fr", "explanation": "For real." }] }).to_string();
        let body = envelope_with_text(&inner);

        let first = parse_analysis(&body).unwrap();
        let second = parse_analysis(&body).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extraction_priority_order() {
        // content wins over outputText wins over completion wins over results.
        let inner = json!({ "terms": [{ "term": "a", "explanation": "b" }] }).to_string();

        let body = json!({
            "content": [{ "text": inner }],
            "outputText": "ignored",
            "completion": "ignored",
        })
        .to_string()
        .into_bytes();
        assert_eq!(parse_analysis(&body).unwrap().raw_model_text, inner);

        let body = json!({ "outputText": inner, "completion": "ignored" })
            .to_string()
            .into_bytes();
        assert_eq!(parse_analysis(&body).unwrap().raw_model_text, inner);

        let body = json!({ "completion": inner }).to_string().into_bytes();
        assert_eq!(parse_analysis(&body).unwrap().raw_model_text, inner);

        let body = json!({ "results": [{ "text": "  " }, { "text": inner }] })
            .to_string()
            .into_bytes();
        assert_eq!(parse_analysis(&body).unwrap().raw_model_text, inner);
    }

    #[test]
    fn test_blank_content_blocks_are_skipped() {
        let inner = json!({ "terms": [{ "term": "a", "explanation": "b" }] }).to_string();
        let body = json!({
            "content": [{ "type": "text", "text": "   " }, { "type": "text", "text": inner }]
        })
        .to_string()
        .into_bytes();

        assert_eq!(parse_analysis(&body).unwrap().raw_model_text, inner);
    }

    #[test]
    fn test_empty_body_fails() {
        assert!(matches!(
            parse_analysis(b""),
            Err(AnalysisError::EmptyResponseBody)
        ));
    }

    #[test]
    fn test_malformed_envelope_carries_snippet() {
        let err = parse_analysis(b"definitely not json").unwrap_err();
        match err {
            AnalysisError::MalformedEnvelope { snippet } => {
                assert_eq!(snippet, "definitely not json");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_without_text_fails() {
        let body = json!({ "usage": { "input_tokens": 12 } }).to_string().into_bytes();
        assert!(matches!(
            parse_analysis(&body),
            Err(AnalysisError::MissingText)
        ));
    }

    #[test]
    fn test_non_json_model_text_fails() {
        let err = parse_analysis(&envelope_with_text("not-json")).unwrap_err();
        assert!(matches!(err, AnalysisError::ModelTextNotJson));
        assert!(err.to_string().to_lowercase().contains("not valid json"));
    }

    #[test]
    fn test_missing_terms_array_fails() {
        let err = parse_analysis(&envelope_with_text(r#"{"words": []}"#)).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingTerms));
    }

    #[test]
    fn test_empty_terms_array_fails() {
        let err = parse_analysis(&envelope_with_text(r#"{"terms": []}"#)).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyTerms));
        // Distinct message from the inner-JSON failure.
        assert!(err.to_string().contains("empty or invalid"));
    }

    #[test]
    fn test_malformed_entries_are_dropped_not_fatal() {
        let inner = json!({
            "terms": [
                { "term": "", "explanation": "blank term" },
                { "term": "ok", "explanation": "  kept  " },
                { "term": 42, "explanation": "not a string" },
                "not an object",
                { "term": "also ok" },
            ]
        })
        .to_string();

        let analysis = parse_analysis(&envelope_with_text(&inner)).unwrap();

        assert_eq!(analysis.terms.len(), 1);
        assert_eq!(analysis.terms[0].term, "ok");
        assert_eq!(analysis.terms[0].explanation, "kept");
        // Raw text still carries the dropped entries for auditing.
        assert_eq!(analysis.raw_model_text, inner);
    }

    #[test]
    fn test_all_malformed_entries_fail() {
        let inner = json!({
            "terms": [{ "term": "", "explanation": "" }, { "term": 1 }]
        })
        .to_string();

        assert!(matches!(
            parse_analysis(&envelope_with_text(&inner)),
            Err(AnalysisError::EmptyTerms)
        ));
    }
}
