//! Plan domain entities

use crate::core::error::DomainError;
use crate::tool::entities::MANUAL_INTERVENTION_TOOL;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Action description used by the fallback plan's single step.
pub const FALLBACK_ACTION: &str = "Manual execution required";

fn empty_arguments() -> Value {
    Value::Object(Default::default())
}

/// A single step of a plan, executed against one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Execution order; ties keep the order they were emitted in
    pub order: i64,
    /// What this step is meant to achieve
    pub action: String,
    /// Name of the tool to invoke
    pub tool: String,
    /// Raw argument blob, passed to the tool as-is
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

impl PlanStep {
    pub fn new(order: i64, action: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            order,
            action: action.into(),
            tool: tool.into(),
            arguments: empty_arguments(),
        }
    }

    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Wire form of a plan before the non-empty/sorted invariant is applied.
#[derive(Deserialize)]
struct RawPlan {
    goal: String,
    analysis: String,
    steps: Vec<PlanStep>,
}

impl TryFrom<RawPlan> for Plan {
    type Error = DomainError;

    fn try_from(raw: RawPlan) -> Result<Self, Self::Error> {
        Plan::new(raw.goal, raw.analysis, raw.steps)
    }
}

/// An ordered, non-empty list of steps that should satisfy an intent.
///
/// Steps are stable-sorted by `order` on construction and cannot be mutated
/// afterwards. Duplicate orders are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlan")]
pub struct Plan {
    /// What the plan is trying to achieve
    pub goal: String,
    /// The oracle's reasoning behind the plan
    pub analysis: String,
    steps: Vec<PlanStep>,
    #[serde(skip)]
    fallback: bool,
}

impl Plan {
    /// Build a plan, rejecting an empty step list.
    pub fn new(
        goal: impl Into<String>,
        analysis: impl Into<String>,
        mut steps: Vec<PlanStep>,
    ) -> Result<Self, DomainError> {
        if steps.is_empty() {
            return Err(DomainError::EmptyPlan);
        }
        // sort_by_key is stable
        steps.sort_by_key(|step| step.order);

        Ok(Self {
            goal: goal.into(),
            analysis: analysis.into(),
            steps,
            fallback: false,
        })
    }

    /// The deterministic plan returned when synthesis fails.
    ///
    /// It has exactly one step targeting the `manual_intervention` tool, with
    /// the failure reason in its arguments.
    pub fn fallback(intent: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            goal: intent.into(),
            analysis: format!("Plan synthesis failed: {}", reason),
            steps: vec![
                PlanStep::new(1, FALLBACK_ACTION, MANUAL_INTERVENTION_TOOL)
                    .with_arguments(json!({ "reason": reason })),
            ],
            fallback: true,
        }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Whether this plan was built by [`Plan::fallback`].
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_rejects_empty_steps() {
        let err = Plan::new("g", "a", vec![]).unwrap_err();
        assert_eq!(err, DomainError::EmptyPlan);
    }

    #[test]
    fn test_plan_sorts_steps_stably() {
        let plan = Plan::new(
            "g",
            "a",
            vec![
                PlanStep::new(3, "third", "t"),
                PlanStep::new(1, "first-a", "t"),
                PlanStep::new(2, "second", "u"),
                PlanStep::new(1, "first-b", "t"),
            ],
        )
        .unwrap();

        let actions: Vec<&str> = plan.steps().iter().map(|s| s.action.as_str()).collect();
        assert_eq!(actions, vec!["first-a", "first-b", "second", "third"]);
    }

    #[test]
    fn test_oracle_plan_shaped_like_fallback_is_not_fallback() {
        let plan = Plan::new(
            "g",
            "a",
            vec![PlanStep::new(1, FALLBACK_ACTION, MANUAL_INTERVENTION_TOOL)],
        )
        .unwrap();
        assert!(!plan.is_fallback());

        let wire = serde_json::to_value(Plan::fallback("g", "down")).unwrap();
        assert!(wire.get("fallback").is_none());
        let back: Plan = serde_json::from_value(wire).unwrap();
        assert!(!back.is_fallback());
    }

    #[test]
    fn test_fallback_plan_shape() {
        let plan = Plan::fallback("book a flight", "oracle unreachable");
        assert!(plan.is_fallback());
        assert_eq!(plan.goal, "book a flight");
        assert_eq!(plan.step_count(), 1);
        assert_eq!(plan.steps()[0].order, 1);
        assert_eq!(plan.steps()[0].tool, MANUAL_INTERVENTION_TOOL);
        assert_eq!(plan.steps()[0].arguments["reason"], "oracle unreachable");
        assert!(plan.analysis.contains("oracle unreachable"));
    }

    #[test]
    fn test_plan_wire_roundtrip() {
        let plan = Plan::new(
            "g",
            "a",
            vec![
                PlanStep::new(2, "y", "t").with_arguments(json!({"n": 2})),
                PlanStep::new(1, "x", "t"),
            ],
        )
        .unwrap();

        let wire = serde_json::to_string(&plan).unwrap();
        let back: Plan = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_plan_deserialize_enforces_invariants() {
        let err = serde_json::from_value::<Plan>(json!({"goal": "g", "analysis": "a", "steps": []}));
        assert!(err.is_err());

        let plan: Plan = serde_json::from_value(json!({
            "goal": "g",
            "analysis": "a",
            "steps": [
                {"order": 2, "action": "b", "tool": "t"},
                {"order": 1, "action": "a", "tool": "t"}
            ]
        }))
        .unwrap();
        assert_eq!(plan.steps()[0].action, "a");
        assert_eq!(plan.steps()[1].arguments, json!({}));
    }
}
