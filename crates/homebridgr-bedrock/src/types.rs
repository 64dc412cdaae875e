//! Transport request/response types and failure taxonomy.

use thiserror::Error;

/// A single model-invocation request.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub model_id: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub accept: String,
}

impl InvokeRequest {
    /// JSON request with the default content negotiation headers.
    pub fn json(model_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            body: body.into().into_bytes(),
            content_type: "application/json".into(),
            accept: "application/json".into(),
        }
    }
}

/// Raw model-invocation response.
#[derive(Debug, Clone)]
pub struct InvokeResponse {
    pub body: Vec<u8>,
}

/// Failures raised by the model transport.
///
/// `Configuration` means local setup is incomplete (missing region or
/// credentials) and no request was sent. Everything else is a failed remote
/// call and propagates as-is.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{0}")]
    Configuration(String),

    #[error("Bedrock request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bedrock returned status {status}: {body}")]
    Status { status: u16, body: String },
}
