//! Prompt templates for outcome validation

use crate::orchestration::entities::ExecutionRecord;

/// Templates for the Check phase oracle call
pub struct ValidationPromptTemplate;

impl ValidationPromptTemplate {
    pub fn system() -> String {
        r#"You are the verification component of an automation agent. You judge whether the executed steps satisfied the user's intent.

Respond with a single JSON object and nothing else:

{
  "success": true or false,
  "reasoning": "why the intent was or was not satisfied"
}

Judge from the execution log only. A failed step does not automatically mean failure if the intent was still met; a successful log does not automatically mean success if the intent was not addressed."#
            .to_string()
    }

    pub fn user(intent: &str, goal: &str, log: &[ExecutionRecord]) -> String {
        let log_json = serde_json::to_string_pretty(log).unwrap_or_else(|_| "[]".to_string());
        format!(
            r#"## Intent

{intent}

## Planned Goal

{goal}

## Execution Log ({count} steps)

{log_json}

Did the execution satisfy the intent?"#,
            intent = intent.trim(),
            goal = goal,
            count = log.len(),
            log_json = log_json
        )
    }
}
