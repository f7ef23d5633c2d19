//! Prompt domain
//!
//! Templates for the two oracle round-trips of a run: plan synthesis and
//! outcome validation. Output is deterministic for a given input so prompts
//! can be asserted on in tests.

pub mod planning;
pub mod validation;

pub use planning::PlanningPromptTemplate;
pub use validation::ValidationPromptTemplate;
