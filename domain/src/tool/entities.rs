//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the pseudo-tool used by the fallback plan.
///
/// It is deliberately not registered by default, so executing a fallback plan
/// records an `UnknownTool` failure that makes the need for a human visible.
pub const MANUAL_INTERVENTION_TOOL: &str = "manual_intervention";

/// Descriptor of a tool that can be invoked through the dispatcher.
///
/// Wire shape: `{"name": ..., "description": ..., "inputSchema": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique name of the tool (e.g., "echo")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema describing the accepted arguments
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Create a descriptor that accepts an object with no declared properties.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({"type": "object", "properties": {}}),
        }
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Names of the properties listed as `required` in the input schema.
    pub fn required_arguments(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// `(name, type, description)` for each declared property, sorted by name.
    pub fn argument_summary(&self) -> Vec<(&str, &str, &str)> {
        let Some(properties) = self.input_schema.get("properties").and_then(Value::as_object)
        else {
            return Vec::new();
        };

        let mut summary: Vec<(&str, &str, &str)> = properties
            .iter()
            .map(|(name, schema)| {
                let kind = schema.get("type").and_then(Value::as_str).unwrap_or("any");
                let description = schema
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                (name.as_str(), kind, description)
            })
            .collect();
        summary.sort_by(|a, b| a.0.cmp(b.0));
        summary
    }
}

/// A request to invoke a tool with arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRequest {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Build a request from a raw argument blob.
    ///
    /// `null` is treated as "no arguments"; any other non-object value is
    /// rejected with a description of what was found.
    pub fn from_blob(tool_name: impl Into<String>, blob: &Value) -> Result<Self, String> {
        let arguments = match blob {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(format!(
                    "arguments must be a JSON object, found {}",
                    match other {
                        Value::Array(_) => "array",
                        Value::String(_) => "string",
                        Value::Number(_) => "number",
                        Value::Bool(_) => "boolean",
                        _ => "value",
                    }
                ));
            }
        };

        Ok(Self {
            tool_name: tool_name.into(),
            arguments,
        })
    }

    /// Arguments as a JSON object value.
    pub fn arguments_value(&self) -> Value {
        Value::Object(self.arguments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_wire_shape() {
        let descriptor = ToolDescriptor::new("echo", "Echo a message").with_input_schema(json!({
            "type": "object",
            "required": ["message"],
            "properties": {"message": {"type": "string", "description": "Text to echo"}}
        }));

        let wire = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(wire["name"], "echo");
        assert_eq!(wire["inputSchema"]["required"][0], "message");
        assert!(wire.get("input_schema").is_none());

        let back: ToolDescriptor = serde_json::from_value(wire).unwrap();
        assert_eq!(back, descriptor);
    }

    #[test]
    fn test_descriptor_argument_summary() {
        let descriptor = ToolDescriptor::new("wait", "Sleep").with_input_schema(json!({
            "type": "object",
            "required": ["millis"],
            "properties": {
                "millis": {"type": "integer", "description": "Duration"},
                "label": {"type": "string"}
            }
        }));

        assert_eq!(descriptor.required_arguments(), vec!["millis"]);
        assert_eq!(
            descriptor.argument_summary(),
            vec![("label", "string", ""), ("millis", "integer", "Duration")]
        );
    }

    #[test]
    fn test_request_from_blob() {
        let request = ToolCallRequest::from_blob("echo", &json!({"message": "hi"})).unwrap();
        assert_eq!(request.arguments["message"], "hi");

        let empty = ToolCallRequest::from_blob("echo", &Value::Null).unwrap();
        assert!(empty.arguments.is_empty());

        let err = ToolCallRequest::from_blob("echo", &json!([1, 2])).unwrap_err();
        assert!(err.contains("found array"));
    }

    #[test]
    fn test_request_wire_shape() {
        let request = ToolCallRequest::new("echo").with_arg("message", "hi");
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["toolName"], "echo");
        assert_eq!(wire["arguments"]["message"], "hi");
    }
}
