//! Tool Dispatcher port
//!
//! The orchestration loop reaches tools only through this proxy. Adapters
//! may route in-process or over a transport; either way the wire contract
//! is the JSON-RPC `tools/list` / `tools/call` pair.

use async_trait::async_trait;
use pmcro_domain::{ToolCallRequest, ToolCallResult, ToolDescriptor, ToolErrorKind};
use thiserror::Error;

/// Failure reported by a dispatcher proxy.
///
/// A tool that ran and failed is *not* an error here; it comes back as a
/// [`ToolCallResult`] with `success = false`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The peer sent something that is not a valid response frame
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The peer answered with a JSON-RPC error object; `kind` comes from
    /// the error's `data.kind` when present
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        kind: Option<ToolErrorKind>,
    },

    /// The request could not be delivered
    #[error("Transport error: {0}")]
    Transport(String),
}

impl DispatchError {
    /// Failure-kind label recorded in the cognitive trail.
    pub fn trail_label(&self) -> &'static str {
        match self {
            DispatchError::Rpc {
                kind: Some(kind), ..
            } => kind.trail_label(),
            _ => "ProtocolError",
        }
    }
}

/// Port for tool dispatch
#[async_trait]
pub trait ToolDispatcherPort: Send + Sync {
    /// Descriptors of all callable tools, in registration order.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, DispatchError>;

    /// Invoke one tool.
    async fn call_tool(&self, request: &ToolCallRequest) -> Result<ToolCallResult, DispatchError>;
}
