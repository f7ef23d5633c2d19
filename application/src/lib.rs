//! Application layer for pmcro
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    llm_gateway::{GatewayError, LlmGateway, ResponseFormat},
    progress::{NoProgress, OrchestrationProgress},
    tool_dispatcher::{DispatchError, ToolDispatcherPort},
};
pub use use_cases::run_intent::{RunIntentError, RunIntentUseCase};
pub use use_cases::synthesize_plan::{PlanSynthesis, PlanSynthesizer, SynthesisFailure};
pub use use_cases::validate_outcome::{OutcomeCheck, OutcomeValidator};
