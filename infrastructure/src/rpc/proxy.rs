//! Dispatcher proxies implementing [`ToolDispatcherPort`].
//!
//! Both proxies speak the same JSON-RPC frames; they differ only in how a
//! frame reaches the [`ToolServer`]:
//!
//! - [`InProcessDispatcher`] hands the encoded frame straight to a server
//!   living in the same process.
//! - [`HttpDispatcher`] POSTs the frame to a remote endpoint.
//!
//! Response decoding is shared. A `-32603` error is a tool that ran and
//! failed, so it comes back as a failed [`ToolCallResult`]; every other error
//! object becomes [`DispatchError::Rpc`]. Either way the error's `data.kind`
//! is kept.

use super::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, error_codes, methods,
};
use super::server::ToolServer;
use async_trait::async_trait;
use pmcro_application::{DispatchError, ToolDispatcherPort};
use pmcro_domain::{ToolCallRequest, ToolCallResult, ToolDescriptor, ToolErrorKind};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

fn list_request() -> JsonRpcRequest {
    JsonRpcRequest::new(methods::TOOLS_LIST, None)
}

fn call_request(request: &ToolCallRequest) -> Result<JsonRpcRequest, DispatchError> {
    let params = ToolCallParams {
        name: request.tool_name.clone(),
        arguments: request.arguments_value(),
    };
    let params =
        serde_json::to_value(params).map_err(|e| DispatchError::Protocol(e.to_string()))?;
    Ok(JsonRpcRequest::new(methods::TOOLS_CALL, Some(params)))
}

/// Tool error kind carried in `data.kind`, if the peer sent a known one.
fn error_kind(error: &JsonRpcError) -> Option<ToolErrorKind> {
    let kind = error.data.as_ref()?.get("kind")?.clone();
    serde_json::from_value(kind).ok()
}

fn rpc_error(error: JsonRpcError) -> DispatchError {
    DispatchError::Rpc {
        kind: error_kind(&error),
        code: error.code,
        message: error.message,
    }
}

/// Check the response id and unwrap either the result or the error object.
fn open_response(
    request: &JsonRpcRequest,
    response: JsonRpcResponse,
) -> Result<Result<Value, JsonRpcError>, DispatchError> {
    let expected = request.id.clone().unwrap_or(Value::Null);
    if response.id != expected {
        return Err(DispatchError::Protocol(format!(
            "Response id {} does not match request id {}",
            response.id, expected
        )));
    }

    match (response.result, response.error) {
        (_, Some(error)) => Ok(Err(error)),
        (Some(result), None) => Ok(Ok(result)),
        (None, None) => Err(DispatchError::Protocol(
            "Response has neither result nor error".to_string(),
        )),
    }
}

fn decode_tool_list(
    request: &JsonRpcRequest,
    response: JsonRpcResponse,
) -> Result<Vec<ToolDescriptor>, DispatchError> {
    let result = open_response(request, response)?.map_err(rpc_error)?;
    let tools = result.get("tools").cloned().ok_or_else(|| {
        DispatchError::Protocol("tools/list result has no 'tools' field".to_string())
    })?;
    serde_json::from_value(tools)
        .map_err(|e| DispatchError::Protocol(format!("Invalid tool descriptor: {}", e)))
}

fn decode_call_result(
    request: &JsonRpcRequest,
    response: JsonRpcResponse,
) -> Result<ToolCallResult, DispatchError> {
    match open_response(request, response)? {
        Ok(result) => serde_json::from_value(result)
            .map_err(|e| DispatchError::Protocol(format!("Invalid tool result: {}", e))),
        Err(error) if error.code == error_codes::INTERNAL_ERROR => {
            let kind = error_kind(&error).unwrap_or(ToolErrorKind::ExecutionFailure);
            Ok(ToolCallResult::failure(error.message).with_kind(kind))
        }
        Err(error) => Err(rpc_error(error)),
    }
}

/// Proxy to a [`ToolServer`] in the same process.
///
/// Frames still go through encode and decode so that both proxies observe
/// identical wire behavior.
pub struct InProcessDispatcher {
    server: Arc<ToolServer>,
}

impl InProcessDispatcher {
    pub fn new(server: Arc<ToolServer>) -> Self {
        Self { server }
    }

    async fn round_trip(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, DispatchError> {
        let frame =
            serde_json::to_string(request).map_err(|e| DispatchError::Protocol(e.to_string()))?;
        let reply = self.server.handle_line(&frame).await.ok_or_else(|| {
            DispatchError::Protocol(format!("No response to '{}'", request.method))
        })?;
        serde_json::from_str(&reply)
            .map_err(|e| DispatchError::Protocol(format!("Invalid response frame: {}", e)))
    }
}

#[async_trait]
impl ToolDispatcherPort for InProcessDispatcher {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, DispatchError> {
        let request = list_request();
        let response = self.round_trip(&request).await?;
        decode_tool_list(&request, response)
    }

    async fn call_tool(&self, request: &ToolCallRequest) -> Result<ToolCallResult, DispatchError> {
        debug!(tool = %request.tool_name, "In-process tool call");
        let frame = call_request(request)?;
        let response = self.round_trip(&frame).await?;
        decode_call_result(&frame, response)
    }
}

/// Proxy to a remote tool server accepting JSON-RPC frames over HTTP POST.
pub struct HttpDispatcher {
    client: reqwest::Client,
    url: String,
}

impl HttpDispatcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, DispatchError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DispatchError::Transport(format!(
                "Tool server returned {}",
                response.status()
            )));
        }

        response
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| DispatchError::Protocol(format!("Invalid response frame: {}", e)))
    }
}

#[async_trait]
impl ToolDispatcherPort for HttpDispatcher {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, DispatchError> {
        let request = list_request();
        let response = self.post(&request).await?;
        decode_tool_list(&request, response)
    }

    async fn call_tool(&self, request: &ToolCallRequest) -> Result<ToolCallResult, DispatchError> {
        debug!(tool = %request.tool_name, url = %self.url, "Remote tool call");
        let frame = call_request(request)?;
        let response = self.post(&frame).await?;
        decode_call_result(&frame, response)
    }
}
