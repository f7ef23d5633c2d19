//! Progress notification port
//!
//! Defines the interface for reporting progress while an intent is driven
//! through the Plan → Make → Check → Reflect cycle.

use pmcro_domain::{ExecutionRecord, Phase, Plan, PlanStep, ValidationOutcome};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console spinner, plain log lines, ...).
/// Every method has an empty default.
pub trait OrchestrationProgress: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, _phase: Phase) {}

    /// Called once the plan (real or fallback) is available
    fn on_plan_ready(&self, _plan: &Plan) {}

    /// Called before a step is dispatched
    fn on_step_start(&self, _step: &PlanStep, _index: usize, _total: usize) {}

    /// Called after a step has been recorded, successful or not
    fn on_step_complete(&self, _record: &ExecutionRecord) {}

    /// Called with the Check phase verdict
    fn on_validation(&self, _outcome: &ValidationOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl OrchestrationProgress for NoProgress {}
