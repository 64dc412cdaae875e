//! Caption-analysis failure taxonomy.

use homebridgr_bedrock::TransportError;
use thiserror::Error;

/// Failures produced by the analysis pipeline.
///
/// `NotConfigured` is terminal and non-retryable: the feature lacks required
/// setup (model id, region, or credentials) and callers surface it as
/// "feature not set up". Everything else is a failed attempt.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("Caption must be a non-empty string.")]
    EmptyCaption,

    #[error("Bedrock response body was empty.")]
    EmptyResponseBody,

    #[error("Unsupported Bedrock response format.")]
    InvalidEncoding,

    #[error("Bedrock response was not valid JSON. Received: {snippet}")]
    MalformedEnvelope { snippet: String },

    #[error("Bedrock response did not include any text output.")]
    MissingText,

    #[error("Bedrock text output was not valid JSON. Ensure the prompt enforces JSON output.")]
    ModelTextNotJson,

    #[error("Bedrock response is missing the `terms` array.")]
    MissingTerms,

    #[error("Bedrock returned an empty or invalid `terms` array. Update the caption or adjust the prompt.")]
    EmptyTerms,

    /// Remote invocation failed for a non-configuration reason (network,
    /// throttling, bad model id). Propagated unchanged, never reclassified.
    #[error(transparent)]
    Transport(TransportError),
}
