//! LLM Gateway port
//!
//! Defines the interface for consulting the oracle: the external
//! text-generation service used for planning and outcome validation.
//! It is treated as opaque: text in, text out, fallible, slow.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Output format requested from the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Ask the backend to constrain output to JSON, where supported
    Json,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to the oracle.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Name of the model behind this gateway, for logs and reports.
    fn model_name(&self) -> &str;

    /// One blocking round-trip: system + user message in, reply text out.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        format: ResponseFormat,
    ) -> Result<String, GatewayError>;
}
