//! Tool handler abstraction
//!
//! This module defines the [`ToolHandler`] trait implemented by every
//! capability the dispatcher can route to.
//!
//! # Registration
//!
//! Handlers are collected into an explicit list at startup and registered one
//! by one; each exposes its own [`ToolDescriptor`]. There is no reflection or
//! discovery step.
//!
//! # Input binding
//!
//! Each handler declares a fixed input type and converts the raw argument
//! object with [`parse_arguments`]:
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct EchoInput { message: String }
//!
//! async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
//!     let input: EchoInput = parse_arguments(ECHO, arguments)?;
//!     Ok(json!({ "message": input.message }))
//! }
//! ```
//!
//! # Exclusive resources
//!
//! A handler backed by a single external resource (one browser session, one
//! connection) must serialize its own calls against that resource. The
//! dispatcher routes concurrently and never locks on a handler's behalf.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::entities::ToolDescriptor;
use super::value_objects::ToolError;

/// A named capability that can be invoked with a JSON argument object.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Descriptor advertised through `tools/list`.
    ///
    /// Must be stable: the registry reads it once at registration.
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool.
    ///
    /// Return [`ToolError::invalid_arguments`] when `arguments` does not fit
    /// the declared input shape, and [`ToolError::execution_failed`] for any
    /// failure while running.
    async fn call(&self, arguments: Value) -> Result<Value, ToolError>;
}

/// Deserialize a handler's typed input from its raw argument object.
///
/// Failures become [`ToolErrorKind::InvalidArguments`](super::ToolErrorKind)
/// with the serde message attached.
pub fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| {
        ToolError::invalid_arguments(format!("Invalid arguments for '{}': {}", tool, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::value_objects::ToolErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct GreetInput {
        name: String,
        #[serde(default)]
        excited: bool,
    }

    struct GreetTool;

    #[async_trait]
    impl ToolHandler for GreetTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("greet", "Greet someone")
        }

        async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
            let input: GreetInput = parse_arguments("greet", arguments)?;
            let suffix = if input.excited { "!" } else { "." };
            Ok(json!(format!("Hello, {}{}", input.name, suffix)))
        }
    }

    #[test]
    fn test_parse_arguments_success() {
        let input: GreetInput = parse_arguments("greet", json!({"name": "Ada"})).unwrap();
        assert_eq!(input.name, "Ada");
        assert!(!input.excited);
    }

    #[test]
    fn test_parse_arguments_failure_is_invalid_arguments() {
        let err = parse_arguments::<GreetInput>("greet", json!({"name": 7})).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
        assert!(err.message.contains("'greet'"));
    }

    #[tokio::test]
    async fn test_handler_call_roundtrip() {
        let tool = GreetTool;
        let out = tool
            .call(json!({"name": "Ada", "excited": true}))
            .await
            .unwrap();
        assert_eq!(out, json!("Hello, Ada!"));

        let err = tool.call(json!({})).await.unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
    }
}
