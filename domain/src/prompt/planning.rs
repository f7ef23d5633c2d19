//! Prompt templates for plan synthesis

use crate::tool::entities::ToolDescriptor;

/// Templates for the Plan phase oracle call
pub struct PlanningPromptTemplate;

impl PlanningPromptTemplate {
    /// System prompt: output contract plus the catalog of callable tools.
    pub fn system(tools: &[ToolDescriptor]) -> String {
        format!(
            r#"You are the planning component of an automation agent. You turn a user's intent into a short, ordered list of tool calls.

## Available Tools

{catalog}

## Output Format

Respond with a single JSON object of exactly this shape:

{{
  "goal": "one sentence restating what must be achieved",
  "analysis": "your reasoning about how to achieve it",
  "steps": [
    {{
      "order": 1,
      "action": "what this step does",
      "tool": "name of one of the available tools",
      "arguments": {{ "argument_name": "value" }}
    }}
  ]
}}

## Rules

1. Output pure JSON only. No prose before or after it, no Markdown code fences.
2. `steps` must contain at least one step.
3. `order` is an integer starting at 1; steps run one at a time in that order.
4. `tool` must be one of the tool names listed above.
5. `arguments` must be a JSON object matching the tool's arguments; use {{}} when the tool takes none.
6. A later step may rely on the side effects of an earlier one."#,
            catalog = Self::tool_catalog(tools)
        )
    }

    /// User prompt carrying the intent.
    pub fn user(intent: &str) -> String {
        format!("## Intent\n\n{}\n\nProduce the plan now.", intent.trim())
    }

    /// Catalog of tools in registration order.
    pub fn tool_catalog(tools: &[ToolDescriptor]) -> String {
        if tools.is_empty() {
            return "(no tools are registered)".to_string();
        }

        tools
            .iter()
            .map(|tool| {
                let required = tool.required_arguments();
                let args = tool.argument_summary();
                let args = if args.is_empty() {
                    "  Arguments: none".to_string()
                } else {
                    let lines = args
                        .iter()
                        .map(|(name, kind, description)| {
                            let marker = if required.contains(name) {
                                " (required)"
                            } else {
                                ""
                            };
                            if description.is_empty() {
                                format!("    - {} ({}){}", name, kind, marker)
                            } else {
                                format!("    - {} ({}): {}{}", name, kind, description, marker)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    format!("  Arguments:\n{}", lines)
                };
                format!("- **{}**: {}\n{}", tool.name, tool.description, args)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tools() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new("echo", "Echo a message").with_input_schema(json!({
                "type": "object",
                "required": ["message"],
                "properties": {"message": {"type": "string", "description": "Text to echo"}}
            })),
            ToolDescriptor::new("current_time", "Current UTC time"),
        ]
    }

    #[test]
    fn test_catalog_lists_tools_in_order() {
        let catalog = PlanningPromptTemplate::tool_catalog(&tools());
        let echo = catalog.find("**echo**").unwrap();
        let time = catalog.find("**current_time**").unwrap();
        assert!(echo < time);
        assert!(catalog.contains("- message (string): Text to echo (required)"));
        assert!(catalog.contains("Arguments: none"));
    }

    #[test]
    fn test_system_prompt_is_deterministic() {
        let a = PlanningPromptTemplate::system(&tools());
        let b = PlanningPromptTemplate::system(&tools());
        assert_eq!(a, b);
        assert!(a.contains("pure JSON"));
        assert!(a.contains("\"steps\""));
    }

    #[test]
    fn test_empty_catalog() {
        assert!(PlanningPromptTemplate::system(&[]).contains("no tools are registered"));
    }

    #[test]
    fn test_user_prompt_contains_intent() {
        assert!(PlanningPromptTemplate::user("  say hi  ").contains("\n\nsay hi\n\n"));
    }
}
