//! Tool Registry
//!
//! The [`ToolRegistry`] owns the set of named [`ToolHandler`]s and routes
//! invocations to them.
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = ToolRegistry::new();
//! registry.register(EchoTool)?;
//! registry.register(WaitTool::default())?;
//!
//! let result = registry.invoke("echo", &json!({"message": "hi"})).await?;
//! assert!(result.success);
//! ```
//!
//! # Invocation contract
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | name not registered | `Err(UnknownTool)` |
//! | arguments not an object, or violate the input schema | `Err(InvalidArguments)` |
//! | handler rejects its arguments | `Err(InvalidArguments)` |
//! | handler fails | `Ok(ToolCallResult { success: false, .. })` |
//! | handler succeeds | `Ok(ToolCallResult { success: true, .. })` |
//!
//! `invoke` never panics on bad input and never lets a handler error escape
//! as anything other than one of the rows above.

use std::collections::HashMap;
use std::sync::Arc;

use pmcro_domain::schema::validate;
use pmcro_domain::{
    ToolCallRequest, ToolCallResult, ToolDescriptor, ToolError, ToolErrorKind, ToolHandler,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while building a registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool setup failed: {0}")]
    Setup(String),
}

/// Registry of tool handlers, listed in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    /// Registered handlers with the descriptor captured at registration
    entries: Vec<(ToolDescriptor, Arc<dyn ToolHandler>)>,
    /// Tool name -> index into `entries`
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under the name in its descriptor.
    pub fn register<H: ToolHandler + 'static>(&mut self, handler: H) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(handler))
    }

    /// Register a handler (Arc version)
    pub fn register_arc(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let descriptor = handler.descriptor();
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateTool(descriptor.name));
        }

        debug!(tool = %descriptor.name, "Registered tool");
        self.index
            .insert(descriptor.name.clone(), self.entries.len());
        self.entries.push((descriptor, handler));
        Ok(())
    }

    /// Descriptors of all registered tools, in registration order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|(d, _)| d.clone()).collect()
    }

    /// Names of all registered tools, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(d, _)| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke a tool by name with a raw argument blob.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        let Some(&position) = self.index.get(name) else {
            return Err(ToolError::unknown_tool(name));
        };
        let (descriptor, handler) = &self.entries[position];

        let request =
            ToolCallRequest::from_blob(name, arguments).map_err(ToolError::invalid_arguments)?;
        let arguments = request.arguments_value();

        let violations = validate(&arguments, &descriptor.input_schema);
        if !violations.is_empty() {
            let detail: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            return Err(ToolError::invalid_arguments(format!(
                "Invalid arguments for '{}': {}",
                name,
                detail.join("; ")
            )));
        }

        match handler.call(arguments).await {
            Ok(output) => Ok(ToolCallResult::success(output)),
            Err(e) if e.kind == ToolErrorKind::InvalidArguments => Err(e),
            Err(e) => {
                warn!(tool = name, error = %e, "Tool execution failed");
                Ok(ToolCallResult::failure(e.message).with_kind(e.kind))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::{CurrentTimeTool, EchoTool};
    use serde_json::json;

    fn registry() -> ToolRegistry {
        crate::tools::registry_for_tests()
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = registry();
        let err = registry.register(EchoTool).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("echo".to_string()));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_list_is_registration_order_and_stable() {
        let registry = registry();
        let first = registry.list();
        let second = registry.list();
        assert_eq!(first, second);
        assert_eq!(registry.names(), vec!["echo", "mirror", "explode"]);
    }

    #[tokio::test]
    async fn test_registered_names_never_unknown() {
        let registry = registry();
        for name in registry.names() {
            let result = registry.invoke(name, &json!({"message": "m", "value": 1})).await;
            if let Err(e) = result {
                assert_ne!(e.kind, ToolErrorKind::UnknownTool);
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = ToolRegistry::new()
            .invoke("ghost", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::UnknownTool);
    }

    #[tokio::test]
    async fn test_schema_violation_is_invalid_arguments() {
        let registry = registry();
        let err = registry
            .invoke("mirror", &json!({"value": -1}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
        assert!(err.message.contains("/value"));

        let err = registry.invoke("mirror", &json!([1])).await.unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArguments);
    }

    #[tokio::test]
    async fn test_null_arguments_treated_as_empty() {
        let mut registry = ToolRegistry::new();
        registry.register(CurrentTimeTool).unwrap();
        let result = registry.invoke("current_time", &Value::Null).await.unwrap();
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_handler_failure_is_wrapped() {
        let result = registry().invoke("explode", &json!({})).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error(), Some("kaboom"));
        assert_eq!(result.kind, Some(ToolErrorKind::ExecutionFailure));
    }

    #[tokio::test]
    async fn test_success_wraps_output() {
        let result = registry()
            .invoke("mirror", &json!({"value": 3}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, Some(json!({"value": 3})));
    }
}
