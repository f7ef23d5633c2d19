//! Execution parameters: use case loop control.
//!
//! [`ExecutionParams`] groups the deadlines applied at each suspension point
//! of [`RunIntentUseCase`](crate::use_cases::run_intent::RunIntentUseCase).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deadlines for the three kinds of suspension point.
///
/// `None` means wait indefinitely (cancellation still applies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Plan phase oracle round-trip. Minutes-scale: the oracle may be cold.
    pub planning_timeout: Option<Duration>,
    /// Check phase oracle round-trip.
    pub validation_timeout: Option<Duration>,
    /// Each Make phase tool call.
    pub tool_call_timeout: Option<Duration>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            planning_timeout: Some(Duration::from_secs(300)),
            validation_timeout: Some(Duration::from_secs(300)),
            tool_call_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_planning_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.planning_timeout = timeout;
        self
    }

    pub fn with_validation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.validation_timeout = timeout;
        self
    }

    pub fn with_tool_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_call_timeout = timeout;
        self
    }
}
