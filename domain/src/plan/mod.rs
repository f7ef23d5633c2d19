//! Plan domain module
//!
//! A [`Plan`] is the synthesizer's answer to an intent: a goal, the oracle's
//! analysis, and a non-empty list of [`PlanStep`]s sorted by `order`.
//! [`parser`] turns untrusted oracle text into a plan.

pub mod entities;
pub mod parser;

pub use entities::{FALLBACK_ACTION, Plan, PlanStep};
pub use parser::{PlanParseError, parse_json_lenient, parse_plan, parse_plan_json};
