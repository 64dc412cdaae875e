//! Ad-hoc caption analysis — no database record involved.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use homebridgr_analysis::{glossary, AnalysisError};

use crate::routes::analyze::{failure, non_blank_field, parse_body};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/analysis", post(analyze_message))
}

async fn analyze_message(
    State(state): State<Arc<AppState>>,
    body: String,
) -> (StatusCode, Json<Value>) {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    let Some(message) = non_blank_field(&payload, "message") else {
        return failure(
            StatusCode::BAD_REQUEST,
            "`message` is required and must be a non-empty string.",
            None,
        );
    };

    match state.analyzer.analyze_caption(&message, None).await {
        Ok(analysis) => (StatusCode::OK, Json(json!({ "analysis": analysis }))),
        Err(err @ AnalysisError::NotConfigured(_)) => failure(
            StatusCode::NOT_IMPLEMENTED,
            "Caption analysis is not configured.",
            Some(err.to_string()),
        ),
        Err(err @ AnalysisError::Transport(_)) => {
            // Remote unreachable: fall back to the built-in glossary so the
            // composer still gets something useful. Configuration and
            // malformed-response failures never take this path.
            if let Some(analysis) = glossary::local_analysis(&message) {
                warn!("Model backend unreachable, serving glossary fallback: {err}");
                (
                    StatusCode::OK,
                    Json(json!({ "analysis": analysis, "fallback": true })),
                )
            } else {
                failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to analyze caption",
                    Some(err.to_string()),
                )
            }
        }
        Err(err) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to analyze caption",
            Some(err.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use homebridgr_analysis::CaptionAnalyzer;
    use homebridgr_bedrock::{InvokeRequest, InvokeResponse, ModelTransport, TransportError};
    use homebridgr_core::HomeBridgrConfig;
    use homebridgr_store::{RecordStore, SqliteStore};

    struct MockTransport {
        result: std::sync::Mutex<Option<Result<InvokeResponse, TransportError>>>,
    }

    impl MockTransport {
        fn returning(result: Result<InvokeResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                result: std::sync::Mutex::new(Some(result)),
            })
        }
    }

    #[async_trait::async_trait]
    impl ModelTransport for MockTransport {
        async fn invoke(&self, _request: InvokeRequest) -> Result<InvokeResponse, TransportError> {
            self.result.lock().unwrap().take().expect("single-shot mock")
        }
    }

    fn state_with(transport: Arc<dyn ModelTransport>) -> (tempfile::TempDir, Arc<AppState>) {
        // The ad-hoc route takes no per-call options, so the analyzer reads
        // the process-wide default. Every test pins the same value.
        std::env::set_var(homebridgr_analysis::MODEL_ID_ENV, "test.model");

        let dir = tempfile::tempdir().unwrap();
        let config = HomeBridgrConfig::from_env(dir.path()).unwrap();
        let store: Arc<dyn RecordStore> =
            Arc::new(SqliteStore::open(dir.path().join("records")).unwrap());
        let state = Arc::new(AppState::new(config, store, CaptionAnalyzer::new(transport)));
        (dir, state)
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_400() {
        let transport = MockTransport::returning(Err(TransportError::Configuration("x".into())));
        let (_dir, state) = state_with(transport);

        let (status, Json(body)) =
            analyze_message(State(state), "this is not valid json".into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn test_blank_message_is_400() {
        let transport = MockTransport::returning(Err(TransportError::Configuration("x".into())));
        let (_dir, state) = state_with(transport);

        let (status, Json(body)) =
            analyze_message(State(state), r#"{"message": "   "}"#.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("`message`"));
    }

    #[tokio::test]
    async fn test_transport_failure_serves_glossary_fallback() {
        let transport = MockTransport::returning(Err(TransportError::Status {
            status: 503,
            body: "unavailable".into(),
        }));
        let (_dir, state) = state_with(transport);

        let (status, Json(body)) = analyze_message(
            State(state),
            r#"{"message": "We totally slay, no cap!"}"#.into(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fallback"], true);
        assert!(body["analysis"]["terms"].as_array().unwrap().len() >= 2);
    }

    #[tokio::test]
    async fn test_configuration_failure_is_501_even_when_glossary_matches() {
        let transport = MockTransport::returning(Err(TransportError::Configuration(
            "Missing AWS region configuration for Bedrock.".into(),
        )));
        let (_dir, state) = state_with(transport);

        let (status, Json(body)) = analyze_message(
            State(state),
            r#"{"message": "We totally slay, no cap!"}"#.into(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(body["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn test_transport_failure_without_glossary_match_is_500() {
        let transport = MockTransport::returning(Err(TransportError::Status {
            status: 503,
            body: "unavailable".into(),
        }));
        let (_dir, state) = state_with(transport);

        let (status, Json(body)) = analyze_message(
            State(state),
            r#"{"message": "Plain update about the weather."}"#.into(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to analyze caption");
    }
}
