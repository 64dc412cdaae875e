//! Shared post-analysis pipeline: load → extract text → analyze → persist.
//!
//! The student-post and community-post analyze routes differ only in which
//! collection they read and which field carries the text, so both run
//! through `analyze_post` parameterized by an `AnalyzeTarget`.

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::warn;

use homebridgr_analysis::{AnalysisError, AnalyzeCaptionOptions, CaptionAnalysis};

use crate::state::AppState;

pub const ANALYSIS_TERMS_FIELD: &str = "analysis_terms";
pub const ANALYSIS_RAW_FIELD: &str = "analysis_raw_text";
pub const ANALYSIS_GENERATED_AT_FIELD: &str = "analysis_generated_at";

/// A route-specific binding of the shared pipeline.
pub struct AnalyzeTarget {
    pub collection: &'static str,
    pub text_field: &'static str,
    pub empty_text_message: &'static str,
}

pub const STUDENT_POSTS: AnalyzeTarget = AnalyzeTarget {
    collection: "student_posts",
    text_field: "caption",
    empty_text_message: "Post caption is empty. Add a caption before analyzing.",
};

pub const COMMUNITY_POSTS: AnalyzeTarget = AnalyzeTarget {
    collection: "community_posts",
    text_field: "text_content",
    empty_text_message: "Post text is empty. Provide text content before analyzing.",
};

/// An error response ready to hand back to axum.
pub type ApiFailure = (StatusCode, Json<Value>);

pub fn failure(status: StatusCode, error: &str, details: Option<String>) -> ApiFailure {
    let mut body = json!({ "error": error });
    if let Some(details) = details {
        body["details"] = Value::String(details);
    }
    (status, Json(body))
}

/// Run the full pipeline for one post. Returns the updated record and the
/// analysis, or a ready-made error response for whichever state failed.
pub async fn analyze_post(
    state: &AppState,
    target: &AnalyzeTarget,
    post_id: &str,
    options: Option<&AnalyzeCaptionOptions>,
) -> Result<(Value, CaptionAnalysis), ApiFailure> {
    let post = match state.store.fetch(target.collection, post_id) {
        Ok(Some(post)) => post,
        Ok(None) => {
            return Err(failure(
                StatusCode::NOT_FOUND,
                &format!("Post {post_id} was not found."),
                None,
            ));
        }
        Err(err) => {
            return Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve post",
                Some(err.to_string()),
            ));
        }
    };

    let text = post
        .get(target.text_field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty());

    let Some(text) = text else {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            target.empty_text_message,
            None,
        ));
    };

    let analysis = match state.analyzer.analyze_caption(text, options).await {
        Ok(analysis) => analysis,
        Err(err @ AnalysisError::NotConfigured(_)) => {
            return Err(failure(
                StatusCode::NOT_IMPLEMENTED,
                "Caption analysis is not configured.",
                Some(err.to_string()),
            ));
        }
        Err(err) => {
            warn!("Caption analysis failed for {}/{post_id}: {err}", target.collection);
            return Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Caption analysis failed",
                Some(err.to_string()),
            ));
        }
    };

    // Timestamp is stamped at persistence time, not generation time.
    let mut fields = Map::new();
    fields.insert(ANALYSIS_TERMS_FIELD.into(), json!(&analysis.terms));
    fields.insert(ANALYSIS_RAW_FIELD.into(), json!(&analysis.raw_model_text));
    fields.insert(
        ANALYSIS_GENERATED_AT_FIELD.into(),
        json!(chrono::Utc::now().to_rfc3339()),
    );

    let updated = state
        .store
        .update(target.collection, post_id, fields)
        .map_err(|err| {
            warn!("Failed to persist analysis for {}/{post_id}: {err}", target.collection);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to persist caption analysis",
                Some(err.to_string()),
            )
        })?;

    Ok((updated, analysis))
}

/// Read a required non-blank string field from a parsed request body.
pub fn non_blank_field(payload: &Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parse a JSON request body, mapping failures to a 400 response.
pub fn parse_body(body: &str) -> Result<Value, ApiFailure> {
    serde_json::from_str(body).map_err(|err| {
        failure(
            StatusCode::BAD_REQUEST,
            "Invalid JSON body",
            Some(err.to_string()),
        )
    })
}

/// Per-call analysis options from an optional `options` object.
///
/// Fields with unexpected types are dropped rather than rejecting the
/// request; range cleanup happens in the options accessors.
pub fn sanitize_options(raw: Option<&Value>) -> Option<AnalyzeCaptionOptions> {
    let raw = raw?.as_object()?;

    Some(AnalyzeCaptionOptions {
        model_id: raw
            .get("modelId")
            .and_then(Value::as_str)
            .map(str::to_string),
        max_tokens: raw.get("maxTokens").and_then(Value::as_f64),
        temperature: raw.get("temperature").and_then(Value::as_f64),
        top_p: raw.get("topP").and_then(Value::as_f64),
    })
}
