//! Built-in tools, always registered.
//!
//! | Tool | Arguments | Output |
//! |------|-----------|--------|
//! | `echo` | `message` | the message |
//! | `wait` | `millis` (bounded) | `{"waitedMillis": n}` |
//! | `current_time` | none | `{"utc": "<RFC 3339>"}` |

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use pmcro_domain::{ToolDescriptor, ToolError, ToolHandler, parse_arguments};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

pub const ECHO: &str = "echo";
pub const WAIT: &str = "wait";
pub const CURRENT_TIME: &str = "current_time";

/// Default upper bound for `wait` (10 s)
const DEFAULT_MAX_WAIT_MILLIS: u64 = 10_000;

#[derive(Deserialize)]
struct EchoInput {
    message: String,
}

/// Returns its `message` argument unchanged.
pub struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(ECHO, "Return the given message unchanged.").with_input_schema(json!({
            "type": "object",
            "required": ["message"],
            "properties": {
                "message": {"type": "string", "description": "Text to echo back"}
            }
        }))
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let input: EchoInput = parse_arguments(ECHO, arguments)?;
        Ok(Value::String(input.message))
    }
}

#[derive(Deserialize)]
struct WaitInput {
    millis: u64,
}

/// Sleeps for `millis` milliseconds, up to a fixed bound.
pub struct WaitTool {
    max_millis: u64,
}

impl Default for WaitTool {
    fn default() -> Self {
        Self {
            max_millis: DEFAULT_MAX_WAIT_MILLIS,
        }
    }
}

impl WaitTool {
    pub fn with_max_millis(mut self, max: u64) -> Self {
        self.max_millis = max;
        self
    }
}

#[async_trait]
impl ToolHandler for WaitTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            WAIT,
            "Pause for the given number of milliseconds, e.g. to let a page settle.",
        )
        .with_input_schema(json!({
            "type": "object",
            "required": ["millis"],
            "properties": {
                "millis": {
                    "type": "integer",
                    "minimum": 0,
                    "maximum": self.max_millis,
                    "description": format!("Milliseconds to wait (max {})", self.max_millis)
                }
            }
        }))
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let input: WaitInput = parse_arguments(WAIT, arguments)?;
        if input.millis > self.max_millis {
            return Err(ToolError::invalid_arguments(format!(
                "millis must be at most {}, got {}",
                self.max_millis, input.millis
            )));
        }
        tokio::time::sleep(Duration::from_millis(input.millis)).await;
        Ok(json!({ "waitedMillis": input.millis }))
    }
}

/// Reports the current UTC time.
pub struct CurrentTimeTool;

#[async_trait]
impl ToolHandler for CurrentTimeTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(CURRENT_TIME, "Get the current UTC time in RFC 3339 format.")
    }

    async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
        Ok(json!({ "utc": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmcro_domain::ToolErrorKind;

    #[tokio::test]
    async fn test_echo() {
        let out = EchoTool.call(json!({"message": "hello"})).await.unwrap();
        assert_eq!(out, json!("hello"));

        let err = EchoTool.call(json!({})).await.unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps() {
        let start = tokio::time::Instant::now();
        let out = WaitTool::default().call(json!({"millis": 1500})).await.unwrap();
        assert_eq!(out["waitedMillis"], 1500);
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_wait_is_bounded() {
        let tool = WaitTool::default().with_max_millis(100);
        let err = tool.call(json!({"millis": 101})).await.unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
        assert_eq!(tool.descriptor().input_schema["properties"]["millis"]["maximum"], 100);
    }

    #[tokio::test]
    async fn test_current_time_is_rfc3339() {
        let out = CurrentTimeTool.call(json!({})).await.unwrap();
        let utc = out["utc"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(utc).is_ok());
        assert!(utc.ends_with('Z'));
    }
}
