//! Bedrock runtime client with a lazily-initialized connection handle.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use tracing::debug;

use crate::types::{InvokeRequest, InvokeResponse, TransportError};

/// Abstraction over the remote model-invocation endpoint.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Submit a request payload, returning the raw response body.
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, TransportError>;
}

/// Connection details resolved once on first use.
struct ReadyClient {
    http: Client,
    region: String,
    api_key: String,
}

/// Bedrock runtime REST client.
///
/// Region and API key are read from the environment on the first invoke and
/// cached together with the `reqwest::Client` for the life of the process.
pub struct BedrockClient {
    ready: OnceCell<ReadyClient>,
}

impl BedrockClient {
    pub fn new() -> Self {
        Self {
            ready: OnceCell::new(),
        }
    }

    fn ready(&self) -> Result<&ReadyClient, TransportError> {
        self.ready.get_or_try_init(|| {
            let region = resolve_region()?;
            let api_key = resolve_api_key()?;
            Ok(ReadyClient {
                http: Client::new(),
                region,
                api_key,
            })
        })
    }
}

impl Default for BedrockClient {
    fn default() -> Self {
        Self::new()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn resolve_region() -> Result<String, TransportError> {
    ["AWS_BEDROCK_REGION", "AWS_REGION", "AWS_DEFAULT_REGION"]
        .iter()
        .find_map(|var| env_var(var))
        .ok_or_else(|| {
            TransportError::Configuration(
                "Missing AWS region configuration for Bedrock. Set AWS_BEDROCK_REGION or AWS_REGION."
                    .into(),
            )
        })
}

fn resolve_api_key() -> Result<String, TransportError> {
    env_var("AWS_BEARER_TOKEN_BEDROCK").ok_or_else(|| {
        TransportError::Configuration(
            "Missing AWS_BEARER_TOKEN_BEDROCK. Create a Bedrock API key and export it.".into(),
        )
    })
}

#[async_trait]
impl ModelTransport for BedrockClient {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, TransportError> {
        let ready = self.ready()?;

        let url = format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/invoke",
            ready.region, request.model_id
        );

        debug!("Invoking Bedrock model {}", request.model_id);

        let response = ready
            .http
            .post(&url)
            .bearer_auth(&ready.api_key)
            .header("Content-Type", &request.content_type)
            .header("Accept", &request.accept)
            .body(request.body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let body = response.bytes().await?.to_vec();
        Ok(InvokeResponse { body })
    }
}
