//! Use cases (application services)

pub mod run_intent;
pub(crate) mod shared;
pub mod synthesize_plan;
pub mod validate_outcome;
