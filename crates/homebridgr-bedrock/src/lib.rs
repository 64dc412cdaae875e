//! AWS Bedrock model-invocation transport.
//!
//! Single-shot `InvokeModel` calls over the Bedrock runtime REST API with
//! API-key authentication. Connection configuration (region, key) is resolved
//! once and the HTTP client handle reused across calls. Failures are never
//! retried at this layer.

pub mod client;
pub mod types;

pub use client::{BedrockClient, ModelTransport};
pub use types::{InvokeRequest, InvokeResponse, TransportError};
