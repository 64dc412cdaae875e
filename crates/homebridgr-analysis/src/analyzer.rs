//! Caption analysis orchestration.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use homebridgr_bedrock::{InvokeRequest, ModelTransport, TransportError};

use crate::error::AnalysisError;
use crate::parse::parse_analysis;
use crate::prompt::build_prompt;
use crate::types::{AnalyzeCaptionOptions, CaptionAnalysis};

/// Environment variable carrying the process-wide default model id.
pub const MODEL_ID_ENV: &str = "BEDROCK_MODEL_ID";

/// Version tag for the Bedrock Anthropic messages envelope.
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Public entry point for caption analysis.
///
/// Holds the injected transport; everything else is per-call. The default
/// model id is read from the environment on every invocation, so changing it
/// takes effect without a restart.
pub struct CaptionAnalyzer {
    transport: Arc<dyn ModelTransport>,
}

impl CaptionAnalyzer {
    pub fn new(transport: Arc<dyn ModelTransport>) -> Self {
        Self { transport }
    }

    /// Analyze a caption, returning the extracted term explanations.
    ///
    /// Fails with `AnalysisError::NotConfigured`, before any network call,
    /// when neither an override nor `BEDROCK_MODEL_ID` supplies a model id,
    /// and when the transport reports a configuration failure.
    pub async fn analyze_caption(
        &self,
        caption: &str,
        options: Option<&AnalyzeCaptionOptions>,
    ) -> Result<CaptionAnalysis, AnalysisError> {
        let caption = caption.trim();
        if caption.is_empty() {
            return Err(AnalysisError::EmptyCaption);
        }

        let defaults = AnalyzeCaptionOptions::default();
        let options = options.unwrap_or(&defaults);

        let model_id = match options.model_override() {
            Some(model) => model.to_string(),
            None => default_model_id().ok_or_else(|| {
                AnalysisError::NotConfigured(format!(
                    "Missing {MODEL_ID_ENV} environment variable. Set it to your chosen \
                     Bedrock model (for example, anthropic.claude-3-haiku-20240307-v1:0)."
                ))
            })?,
        };

        let payload = json!({
            "anthropic_version": ANTHROPIC_VERSION,
            "max_tokens": options.max_tokens(),
            "temperature": options.temperature(),
            "top_p": options.top_p(),
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": build_prompt(caption) }
                    ],
                }
            ],
        });

        debug!("Requesting caption analysis from model {}", model_id);

        let response = self
            .transport
            .invoke(InvokeRequest::json(model_id, payload.to_string()))
            .await
            .map_err(|err| match err {
                TransportError::Configuration(message) => AnalysisError::NotConfigured(message),
                other => AnalysisError::Transport(other),
            })?;

        parse_analysis(&response.body)
    }
}

/// Process-wide default model id, read at call time and never cached.
fn default_model_id() -> Option<String> {
    std::env::var(MODEL_ID_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
