//! JSON-RPC request handling and the line-delimited server loop.
//!
//! [`ToolServer`] maps protocol frames onto a [`ToolRegistry`]:
//!
//! | Method | Result | Errors |
//! |--------|--------|--------|
//! | `initialize` | server metadata | - |
//! | `tools/list` | `{"tools": [descriptor, ...]}` | - |
//! | `tools/call` | `{"success": true, "output": ..., "error": null}` | `-32602` bad params / unknown tool / invalid arguments, `-32603` tool failure |
//! | anything else | - | `-32601` |
//!
//! Framing errors are `-32700` (not JSON) and `-32600` (not a request).

use super::protocol::{
    InitializeResult, JSONRPC_VERSION, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ServerInfo,
    ToolCallParams, methods,
};
use crate::tools::ToolRegistry;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Protocol front end for a tool registry.
pub struct ToolServer {
    registry: Arc<ToolRegistry>,
    info: ServerInfo,
}

impl ToolServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            info: ServerInfo::default(),
        }
    }

    /// Handle one decoded request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != JSONRPC_VERSION {
            return JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request(format!(
                    "unsupported jsonrpc version '{}'",
                    request.jsonrpc
                )),
            );
        }

        debug!(method = %request.method, "Dispatching request");
        let result = match request.method.as_str() {
            methods::INITIALIZE => serde_json::to_value(InitializeResult::new(self.info.clone()))
                .map_err(|e| JsonRpcError::internal(e.to_string())),
            methods::TOOLS_LIST => Ok(json!({ "tools": self.registry.list() })),
            methods::TOOLS_CALL => self.handle_tools_call(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::failure(id, error),
        }
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
        let params: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?;

        let result = self
            .registry
            .invoke(&params.name, &params.arguments)
            .await
            .map_err(|e| JsonRpcError::from(&e))?;

        if let Some(kind) = result.failure_kind() {
            let message = result
                .error
                .unwrap_or_else(|| format!("Tool '{}' failed", params.name));
            return Err(JsonRpcError::internal(message).with_kind(kind));
        }

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal(e.to_string()))
    }

    /// Handle one raw frame. Returns the encoded response, or `None` for
    /// notifications.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => JsonRpcResponse::failure(Value::Null, JsonRpcError::parse_error(e)),
            Ok(value) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                match serde_json::from_value::<JsonRpcRequest>(value) {
                    Err(e) => JsonRpcResponse::failure(id, JsonRpcError::invalid_request(e)),
                    Ok(request) if request.is_notification() => {
                        debug!(method = %request.method, "Ignoring notification");
                        return None;
                    }
                    Ok(request) => self.handle_request(request).await,
                }
            }
        };

        match serde_json::to_string(&response) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                warn!("Failed to encode response: {}", e);
                None
            }
        }
    }

    /// Serve newline-delimited frames until EOF or cancellation.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        mut writer: W,
        cancellation: Option<CancellationToken>,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        info!("Tool server ready ({} tools)", self.registry.len());

        loop {
            let next = match &cancellation {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        line = lines.next_line() => line?,
                    }
                }
                None => lines.next_line().await?,
            };

            // EOF - client disconnected
            let Some(line) = next else {
                break;
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(trimmed).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("Tool server stopped");
        Ok(())
    }

    /// Serve on the process's stdin/stdout.
    pub async fn serve_stdio(&self, cancellation: Option<CancellationToken>) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout, cancellation).await
    }
}
