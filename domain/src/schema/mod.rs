//! Structural JSON validation.
//!
//! A small, recursive validator for the subset of JSON Schema that guards
//! plan structure and tool arguments. It is pure: no I/O, no allocation
//! beyond the returned violations.
//!
//! # Supported keywords
//!
//! | Instance kind | Keywords |
//! |---------------|----------|
//! | any | `type` (string or array of strings), `enum` |
//! | object | `required`, `properties` |
//! | array | `items`, `minItems`, `maxItems` |
//! | string | `minLength` |
//! | number / integer | `minimum`, `maximum` |
//!
//! Composition (`anyOf`/`oneOf`/`allOf`), `$ref` and `format` are not
//! supported and are ignored when present.
//!
//! A `type` mismatch short-circuits the remaining checks on that node, so a
//! wrong-kind value yields exactly one violation.

mod validator;

pub use validator::{SchemaViolation, validate, validate_or_err};

use serde_json::{Value, json};

/// Schema describing the wire shape of a plan produced by the oracle.
///
/// Steps require `order`, `action` and `tool`; `arguments` is optional but
/// must be an object when present.
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "required": ["goal", "analysis", "steps"],
        "properties": {
            "goal": { "type": "string", "minLength": 1 },
            "analysis": { "type": "string" },
            "steps": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["order", "action", "tool"],
                    "properties": {
                        "order": { "type": "integer" },
                        "action": { "type": "string", "minLength": 1 },
                        "tool": { "type": "string", "minLength": 1 },
                        "arguments": { "type": "object" }
                    }
                }
            }
        }
    })
}

/// Schema describing the outcome verdict returned by the Check phase oracle.
pub fn validation_outcome_schema() -> Value {
    json!({
        "type": "object",
        "required": ["success"],
        "properties": {
            "success": { "type": "boolean" },
            "reasoning": { "type": "string" }
        }
    })
}
