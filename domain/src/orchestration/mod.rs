//! Orchestration domain
//!
//! Types describing one pass of the Plan → Make → Check → Reflect cycle:
//! the loop's [`LoopState`] machine, per-step [`ExecutionRecord`]s, the
//! Check phase [`ValidationOutcome`] and the final [`IntentReport`].

pub mod entities;
pub mod outcome;

pub use entities::{
    ExecutionRecord, IntentReport, LoopState, Phase, RunStatus, StepStatus, ValidationOutcome,
};
pub use outcome::parse_validation_outcome;
