//! Orchestration domain entities

use crate::core::error::DomainError;
use crate::tool::value_objects::ToolCallResult;
use crate::trail::TrailEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Phase of the cognitive cycle recorded in the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Plan,
    Make,
    Check,
    Reflect,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Plan => "plan",
            Phase::Make => "make",
            Phase::Check => "check",
            Phase::Reflect => "reflect",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Plan => "Plan",
            Phase::Make => "Make",
            Phase::Check => "Check",
            Phase::Reflect => "Reflect",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// State of one orchestration loop instance.
///
/// ```text
/// Intake ─▶ Plan ─▶ Make ─▶ Check ─▶ Reflect ─▶ Done
/// ```
///
/// Transitions only move forward; there is no re-planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopState {
    Intake,
    Plan,
    Make,
    Check,
    Reflect,
    Done,
}

impl LoopState {
    pub fn as_str(&self) -> &str {
        match self {
            LoopState::Intake => "intake",
            LoopState::Plan => "plan",
            LoopState::Make => "make",
            LoopState::Check => "check",
            LoopState::Reflect => "reflect",
            LoopState::Done => "done",
        }
    }

    /// The state that follows this one, `None` once `Done`.
    pub fn next(&self) -> Option<LoopState> {
        match self {
            LoopState::Intake => Some(LoopState::Plan),
            LoopState::Plan => Some(LoopState::Make),
            LoopState::Make => Some(LoopState::Check),
            LoopState::Check => Some(LoopState::Reflect),
            LoopState::Reflect => Some(LoopState::Done),
            LoopState::Done => None,
        }
    }

    /// Move to `to`, which must be the immediate successor.
    pub fn transition(self, to: LoopState) -> Result<LoopState, DomainError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(DomainError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Success,
    Failed,
}

impl StepStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::Success => "Success",
            StepStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one Make-phase step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub step_order: i64,
    pub tool: String,
    pub status: StepStatus,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Record built from a dispatcher result.
    pub fn from_result(step_order: i64, tool: impl Into<String>, result: ToolCallResult) -> Self {
        let status = if result.success {
            StepStatus::Success
        } else {
            StepStatus::Failed
        };
        Self {
            step_order,
            tool: tool.into(),
            status,
            output: result.output,
            error: result.error,
            timestamp: Utc::now(),
        }
    }

    /// Failed record for a step that never produced a result.
    pub fn failed(step_order: i64, tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step_order,
            tool: tool.into(),
            status: StepStatus::Failed,
            output: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

/// The oracle's verdict on whether execution satisfied the intent.
///
/// Advisory only; nothing verifies it independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub success: bool,
    pub reasoning: String,
}

impl ValidationOutcome {
    pub fn passed(reasoning: impl Into<String>) -> Self {
        Self {
            success: true,
            reasoning: reasoning.into(),
        }
    }

    pub fn failed(reasoning: impl Into<String>) -> Self {
        Self {
            success: false,
            reasoning: reasoning.into(),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Completed => "Completed",
            RunStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final report returned by one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentReport {
    pub run_id: String,
    pub intent: String,
    pub goal: String,
    pub thought_process: String,
    pub status: RunStatus,
    pub validation: ValidationOutcome,
    pub execution_log: Vec<ExecutionRecord>,
    /// Trail entries recorded for this run
    pub history: Vec<TrailEntry>,
}

impl IntentReport {
    pub fn executed_count(&self) -> usize {
        self.execution_log.len()
    }

    pub fn failed_count(&self) -> usize {
        self.execution_log.iter().filter(|r| !r.is_success()).count()
    }

    /// Completed and judged successful by the Check phase.
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed && self.validation.success
    }
}
