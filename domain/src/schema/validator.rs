//! Recursive validator implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single schema violation.
///
/// `path` is a JSON-pointer-like location (`/steps/0/tool`); the root is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate `instance` against `schema`, collecting every violation.
///
/// An empty vector means the instance conforms.
pub fn validate(instance: &Value, schema: &Value) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    validate_node(instance, schema, "/", &mut violations);
    violations
}

/// Like [`validate`], but returns `Err` with all violations when any exist.
pub fn validate_or_err(instance: &Value, schema: &Value) -> Result<(), Vec<SchemaViolation>> {
    let violations = validate(instance, schema);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn validate_node(instance: &Value, schema: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    // Non-object schema nodes (e.g. `true`) impose no constraints
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema.get("type")
        && !type_matches(instance, expected)
    {
        out.push(SchemaViolation::new(
            path,
            format!(
                "expected type {}, found {}",
                describe_type(expected),
                kind_of(instance)
            ),
        ));
        return;
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array)
        && !allowed.contains(instance)
    {
        out.push(SchemaViolation::new(
            path,
            format!("value {} is not one of {}", instance, Value::Array(allowed.clone())),
        ));
    }

    match instance {
        Value::Object(map) => validate_object(map, schema, path, out),
        Value::Array(items) => validate_array(items, schema, path, out),
        Value::String(s) => validate_string(s, schema, path, out),
        Value::Number(n) => {
            if let Some(value) = n.as_f64() {
                validate_number(value, schema, path, out);
            }
        }
        Value::Bool(_) | Value::Null => {}
    }
}

fn validate_object(
    map: &Map<String, Value>,
    schema: &Map<String, Value>,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !map.contains_key(field) {
                out.push(SchemaViolation::new(
                    path,
                    format!("missing required property '{}'", field),
                ));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, child_schema) in properties {
            if let Some(child) = map.get(key) {
                validate_node(child, child_schema, &child_path(path, key), out);
            }
        }
    }
}

fn validate_array(
    items: &[Value],
    schema: &Map<String, Value>,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    if let Some(min) = schema.get("minItems").and_then(Value::as_u64)
        && (items.len() as u64) < min
    {
        out.push(SchemaViolation::new(
            path,
            format!("expected at least {} items, found {}", min, items.len()),
        ));
    }

    if let Some(max) = schema.get("maxItems").and_then(Value::as_u64)
        && (items.len() as u64) > max
    {
        out.push(SchemaViolation::new(
            path,
            format!("expected at most {} items, found {}", max, items.len()),
        ));
    }

    if let Some(item_schema) = schema.get("items") {
        for (index, item) in items.iter().enumerate() {
            validate_node(item, item_schema, &child_path(path, &index.to_string()), out);
        }
    }
}

fn validate_string(s: &str, schema: &Map<String, Value>, path: &str, out: &mut Vec<SchemaViolation>) {
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        let len = s.chars().count() as u64;
        if len < min {
            out.push(SchemaViolation::new(
                path,
                format!("expected length >= {}, found {}", min, len),
            ));
        }
    }
}

fn validate_number(
    value: f64,
    schema: &Map<String, Value>,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    if let Some(min) = schema.get("minimum").and_then(Value::as_f64)
        && value < min
    {
        out.push(SchemaViolation::new(
            path,
            format!("value {} is below minimum {}", value, min),
        ));
    }

    if let Some(max) = schema.get("maximum").and_then(Value::as_f64)
        && value > max
    {
        out.push(SchemaViolation::new(
            path,
            format!("value {} is above maximum {}", value, max),
        ));
    }
}

fn type_matches(instance: &Value, expected: &Value) -> bool {
    match expected {
        Value::String(name) => kind_matches(instance, name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| kind_matches(instance, name)),
        // Malformed `type` keyword: nothing to enforce
        _ => true,
    }
}

fn kind_matches(instance: &Value, name: &str) -> bool {
    match name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => is_integer(instance),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        _ => false,
    }
}

fn is_integer(instance: &Value) -> bool {
    match instance {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

fn kind_of(instance: &Value) -> &'static str {
    match instance {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) if is_integer(instance) => "integer",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" | "),
        other => other.to_string(),
    }
}

/// Append a segment to a pointer, escaping `~` and `/` as in RFC 6901.
fn child_path(parent: &str, segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    if parent == "/" {
        format!("/{}", escaped)
    } else {
        format!("{}/{}", parent, escaped)
    }
}
