//! Plan parsing from oracle replies.
//!
//! Oracle output is untrusted text. Parsing is layered:
//!
//! 1. Strip Markdown code fences (` ```json`, ` ```plan`, bare ` ``` `).
//! 2. Parse as JSON; if that fails, retry on the outermost `{...}` span so
//!    stray prose around the object is tolerated.
//! 3. Normalize field aliases (`reasoning` / `thought_process` for
//!    `analysis`, `null` arguments treated as absent).
//! 4. Validate against [`plan_schema`](crate::schema::plan_schema).
//! 5. Build the [`Plan`], which sorts steps by `order`.
//!
//! Every failure is reported as a [`PlanParseError`]; callers decide whether
//! to fall back.

use crate::plan::entities::{Plan, PlanStep};
use crate::schema::{SchemaViolation, plan_schema, validate_or_err};
use crate::util::{extract_json_object, strip_code_fences, truncate_str};
use serde_json::{Map, Value};
use thiserror::Error;

/// Fields accepted in place of `analysis`, in priority order.
const ANALYSIS_ALIASES: &[&str] = &["reasoning", "thought_process", "thoughtProcess"];

/// Why an oracle reply could not be turned into a plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanParseError {
    #[error("Reply is not valid JSON: {0}")]
    NotJson(String),

    #[error("Plan does not match the expected shape: {}", format_violations(.0))]
    SchemaViolations(Vec<SchemaViolation>),

    #[error("Invalid plan step: {0}")]
    InvalidStep(String),
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a plan from raw oracle text.
pub fn parse_plan(reply: &str) -> Result<Plan, PlanParseError> {
    let json = parse_json_lenient(reply)?;
    parse_plan_json(json)
}

/// Parse a plan from an already-decoded JSON value.
pub fn parse_plan_json(mut json: Value) -> Result<Plan, PlanParseError> {
    normalize(&mut json);
    validate_or_err(&json, &plan_schema()).map_err(PlanParseError::SchemaViolations)?;

    // Schema validation guarantees the shapes read below.
    let goal = json["goal"].as_str().unwrap_or_default().to_string();
    let analysis = json["analysis"].as_str().unwrap_or_default().to_string();

    let mut steps = Vec::new();
    if let Some(items) = json.get("steps").and_then(Value::as_array) {
        for (index, item) in items.iter().enumerate() {
            steps.push(
                serde_json::from_value::<PlanStep>(item.clone()).map_err(|e| {
                    PlanParseError::InvalidStep(format!("steps[{}]: {}", index, e))
                })?,
            );
        }
    }

    Plan::new(goal, analysis, steps).map_err(|e| PlanParseError::InvalidStep(e.to_string()))
}

/// Decode JSON from text that may be fenced or wrapped in prose.
pub fn parse_json_lenient(reply: &str) -> Result<Value, PlanParseError> {
    let stripped = strip_code_fences(reply);
    match serde_json::from_str::<Value>(stripped) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            if let Some(object) = extract_json_object(stripped)
                && let Ok(value) = serde_json::from_str::<Value>(object)
            {
                return Ok(value);
            }
            Err(PlanParseError::NotJson(format!(
                "{} (reply starts with {:?})",
                first_error,
                truncate_str(stripped.trim(), 80)
            )))
        }
    }
}

fn normalize(json: &mut Value) {
    let Some(root) = json.as_object_mut() else {
        return;
    };

    if !root.get("analysis").is_some_and(Value::is_string) {
        let alias = ANALYSIS_ALIASES
            .iter()
            .find_map(|key| root.get(*key).and_then(Value::as_str).map(str::to_string));
        if let Some(analysis) = alias {
            root.insert("analysis".to_string(), Value::String(analysis));
        }
    }

    if let Some(steps) = root.get_mut("steps").and_then(Value::as_array_mut) {
        for step in steps.iter_mut().filter_map(Value::as_object_mut) {
            normalize_step(step);
        }
    }
}

fn normalize_step(step: &mut Map<String, Value>) {
    // `1.0` passes the integer check; store it as `1`
    if let Some(order) = step.get("order").and_then(Value::as_f64)
        && order.fract() == 0.0
        && !step.get("order").is_some_and(|v| v.is_i64() || v.is_u64())
    {
        step.insert("order".to_string(), Value::from(order as i64));
    }
    if step.get("arguments").is_some_and(Value::is_null) {
        step.remove("arguments");
    }
    if !step.contains_key("arguments")
        && let Some(args) = step.remove("args")
        && args.is_object()
    {
        step.insert("arguments".to_string(), args);
    }
}
