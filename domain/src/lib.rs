//! Domain layer for pmcro
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## The PMCR cycle
//!
//! An **intent** is driven once through a fixed cycle:
//!
//! - **Plan**: the oracle turns the intent into a [`Plan`] of ordered steps
//! - **Make**: each step is executed against a named tool, one at a time
//! - **Check**: the oracle judges the execution log against the intent
//! - **Reflect**: the run is summarized into an [`IntentReport`]
//!
//! Every transition is appended to a [`CognitiveTrail`].
//!
//! ## Tools
//!
//! A tool is a [`ToolHandler`] exposing a [`ToolDescriptor`] and accepting a
//! JSON argument object. Arguments are checked against the descriptor's
//! input schema with the validator in [`schema`].

pub mod core;
pub mod orchestration;
pub mod plan;
pub mod prompt;
pub mod schema;
pub mod tool;
pub mod trail;
pub mod util;

// Re-export commonly used types
pub use core::{error::DomainError, run_id::RunId};
pub use orchestration::{
    ExecutionRecord, IntentReport, LoopState, Phase, RunStatus, StepStatus, ValidationOutcome,
    parse_validation_outcome,
};
pub use plan::{Plan, PlanParseError, PlanStep, parse_plan, parse_plan_json};
pub use prompt::{PlanningPromptTemplate, ValidationPromptTemplate};
pub use schema::{SchemaViolation, validate};
pub use tool::{
    ToolCallRequest, ToolCallResult, ToolDescriptor, ToolError, ToolErrorKind, ToolHandler,
    entities::MANUAL_INTERVENTION_TOOL, parse_arguments,
};
pub use trail::{CognitiveTrail, InMemoryTrail, TrailEntry};
