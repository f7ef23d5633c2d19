//! Tool domain value objects: immutable result and error types
//!
//! These types form the **output side** of a tool invocation. A handler either
//! returns a JSON value or a [`ToolError`]; the dispatcher folds both into a
//! [`ToolCallResult`] so callers never see an unhandled failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category of a tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolErrorKind {
    /// No handler is registered under the requested name
    UnknownTool,
    /// The argument blob does not match the handler's input shape
    InvalidArguments,
    /// The handler ran and failed
    #[serde(rename = "TOOL_EXECUTION_FAILURE")]
    ExecutionFailure,
    /// The call did not complete within its deadline
    Timeout,
    /// The call was abandoned because the run was cancelled
    Cancelled,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ToolErrorKind::UnknownTool => "UNKNOWN_TOOL",
            ToolErrorKind::InvalidArguments => "INVALID_ARGUMENTS",
            ToolErrorKind::ExecutionFailure => "TOOL_EXECUTION_FAILURE",
            ToolErrorKind::Timeout => "TIMEOUT",
            ToolErrorKind::Cancelled => "CANCELLED",
        }
    }

    /// Failure-kind label recorded in the cognitive trail.
    pub fn trail_label(&self) -> &'static str {
        match self {
            ToolErrorKind::UnknownTool => "UnknownTool",
            ToolErrorKind::InvalidArguments => "InvalidArguments",
            ToolErrorKind::ExecutionFailure => "ToolExecutionFailure",
            ToolErrorKind::Timeout => "Timeout",
            ToolErrorKind::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error that occurred during tool lookup or execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error category
    pub kind: ToolErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    // Common error constructors
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::UnknownTool,
            format!("Unknown tool: {}", name.into()),
        )
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ExecutionFailure, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::Timeout,
            format!("Operation timed out: {}", operation.into()),
        )
    }

    pub fn cancelled() -> Self {
        Self::new(ToolErrorKind::Cancelled, "Operation cancelled")
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool invocation.
///
/// Wire shape: `{"success": bool, "output": any|null, "error": string|null}`.
/// `output` and `error` are always serialized, as `null` when absent. A
/// failure may also carry `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Whether the execution was successful
    pub success: bool,
    /// Output value (for successful execution)
    #[serde(default)]
    pub output: Option<Value>,
    /// Error message (for failed execution)
    #[serde(default)]
    pub error: Option<String>,
    /// Failure category, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ToolErrorKind>,
}

impl ToolCallResult {
    /// Create a successful result
    pub fn success(output: impl Into<Value>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            kind: None,
        }
    }

    /// Create a failed result
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: ToolErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Check if execution was successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get the error message
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Failure category; a failure without an explicit kind is an
    /// execution failure.
    pub fn failure_kind(&self) -> Option<ToolErrorKind> {
        if self.success {
            None
        } else {
            Some(self.kind.unwrap_or(ToolErrorKind::ExecutionFailure))
        }
    }
}

impl From<ToolError> for ToolCallResult {
    fn from(error: ToolError) -> Self {
        Self::failure(error.to_string()).with_kind(error.kind)
    }
}
