//! Parsing of the Check phase verdict.
//!
//! Accepts `{"success": bool, "reasoning": string}` with a few tolerated
//! deviations:
//!
//! | Deviation | Accepted as |
//! |-----------|-------------|
//! | fenced or prose-wrapped JSON | the inner object |
//! | `"success": "true"` / `"false"` (any case) | the boolean |
//! | `reason` instead of `reasoning` | `reasoning` |
//! | missing reasoning | empty string |

use crate::orchestration::entities::ValidationOutcome;
use crate::plan::parser::parse_json_lenient;
use crate::schema::{validate_or_err, validation_outcome_schema};
use serde_json::Value;

/// Parse the oracle's verdict.
///
/// `Err` carries a description of why the reply was unusable.
pub fn parse_validation_outcome(reply: &str) -> Result<ValidationOutcome, String> {
    let mut json = parse_json_lenient(reply).map_err(|e| e.to_string())?;

    if let Some(root) = json.as_object_mut() {
        if let Some(flag) = root.get("success").and_then(Value::as_str) {
            match flag.trim().to_ascii_lowercase().as_str() {
                "true" => {
                    root.insert("success".to_string(), Value::Bool(true));
                }
                "false" => {
                    root.insert("success".to_string(), Value::Bool(false));
                }
                _ => {}
            }
        }
        if !root.contains_key("reasoning")
            && let Some(reason) = root.remove("reason")
        {
            root.insert("reasoning".to_string(), reason);
        }
    }

    validate_or_err(&json, &validation_outcome_schema()).map_err(|violations| {
        let detail: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
        format!("Verdict does not match the expected shape: {}", detail.join("; "))
    })?;

    Ok(ValidationOutcome {
        success: json["success"].as_bool().unwrap_or(false),
        reasoning: json
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_verdict() {
        let outcome = parse_validation_outcome(r#"{"success":true,"reasoning":"done"}"#).unwrap();
        assert_eq!(outcome, ValidationOutcome::passed("done"));
    }

    #[test]
    fn test_parse_string_flag_and_reason_alias() {
        let outcome =
            parse_validation_outcome("```json\n{\"success\":\"False\",\"reason\":\"step 2 failed\"}\n```")
                .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.reasoning, "step 2 failed");
    }

    #[test]
    fn test_missing_reasoning_is_empty() {
        let outcome = parse_validation_outcome(r#"{"success":true}"#).unwrap();
        assert!(outcome.success);
        assert!(outcome.reasoning.is_empty());
    }

    #[test]
    fn test_unusable_verdicts() {
        assert!(parse_validation_outcome("looks good to me").is_err());
        assert!(parse_validation_outcome(r#"{"reasoning":"no flag"}"#).is_err());
        assert!(parse_validation_outcome(r#"{"success":"maybe"}"#).is_err());
    }
}
