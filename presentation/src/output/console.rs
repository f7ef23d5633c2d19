//! Console output formatter for intent reports

use crate::output::formatter::ReportFormatter;
use colored::Colorize;
use pmcro_domain::util::truncate_str;
use pmcro_domain::{ExecutionRecord, IntentReport, RunStatus, ToolDescriptor};
use serde_json::Value;

/// Longest tool output shown inline in the full report.
const OUTPUT_PREVIEW_BYTES: usize = 160;

/// Formats intent reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &IntentReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Intent Report"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Intent:".cyan().bold(), report.intent));
        output.push_str(&format!("{} {}\n", "Goal:".cyan().bold(), report.goal));
        output.push_str(&format!(
            "{} {}  {} {}\n",
            "Run:".cyan().bold(),
            report.run_id.dimmed(),
            "Status:".cyan().bold(),
            Self::status_label(report)
        ));

        output.push_str(&Self::section_header("Plan"));
        output.push_str(&Self::indent(&report.thought_process, "  "));
        output.push('\n');

        output.push_str(&Self::section_header(&format!(
            "Execution ({} steps, {} failed)",
            report.executed_count(),
            report.failed_count()
        )));
        if report.execution_log.is_empty() {
            output.push_str(&format!("  {}\n", "(no steps executed)".dimmed()));
        }
        for record in &report.execution_log {
            output.push_str(&Self::format_record(record));
        }

        output.push_str(&Self::section_header("Check"));
        let verdict = if report.validation.success {
            "PASSED".green().bold()
        } else {
            "FAILED".red().bold()
        };
        output.push_str(&format!("  {}\n", verdict));
        output.push_str(&Self::indent(&report.validation.reasoning, "  "));
        output.push('\n');

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &IntentReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// One line: status, run id, step counts, verdict.
    pub fn format_summary(report: &IntentReport) -> String {
        let mark = if report.is_success() {
            "v".green()
        } else {
            "x".red()
        };
        let succeeded = report.executed_count() - report.failed_count();
        format!(
            "{} {} {}: {}/{} steps succeeded, validation {}: {}\n",
            mark,
            report.status,
            report.run_id,
            succeeded,
            report.executed_count(),
            if report.validation.success {
                "passed"
            } else {
                "failed"
            },
            truncate_str(report.validation.reasoning.lines().next().unwrap_or(""), 120)
        )
    }

    /// Tool catalog listing for `pmcro tools`.
    pub fn format_tools(tools: &[ToolDescriptor]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "No tools registered.".dimmed());
        }

        let mut output = format!("{}\n", format!("Tools ({})", tools.len()).cyan().bold());
        for tool in tools {
            output.push_str(&format!("\n  {} - {}\n", tool.name.bold(), tool.description));
            let required = tool.required_arguments();
            for (name, kind, description) in tool.argument_summary() {
                let marker = if required.contains(&name) {
                    " (required)".yellow().to_string()
                } else {
                    String::new()
                };
                output.push_str(&format!("      {}: {}{}", name, kind.dimmed(), marker));
                if !description.is_empty() {
                    output.push_str(&format!("  {}", description));
                }
                output.push('\n');
            }
        }
        output
    }

    fn format_record(record: &ExecutionRecord) -> String {
        if record.is_success() {
            let preview = record
                .output
                .as_ref()
                .map(Self::preview_value)
                .unwrap_or_default();
            format!(
                "  {} #{} {} {}\n",
                "v".green(),
                record.step_order,
                record.tool.bold(),
                preview.dimmed()
            )
        } else {
            format!(
                "  {} #{} {} {}\n",
                "x".red(),
                record.step_order,
                record.tool.bold(),
                record.error.as_deref().unwrap_or("Unknown error").red()
            )
        }
    }

    fn preview_value(value: &Value) -> String {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let first_line = text.lines().next().unwrap_or("");
        let preview = truncate_str(first_line, OUTPUT_PREVIEW_BYTES);
        if preview.len() < text.len() {
            format!("{}...", preview)
        } else {
            preview.to_string()
        }
    }

    fn status_label(report: &IntentReport) -> String {
        match report.status {
            RunStatus::Completed => report.status.as_str().green().to_string(),
            RunStatus::Cancelled => report.status.as_str().yellow().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ReportFormatter for ConsoleFormatter {
    fn format(&self, report: &IntentReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &IntentReport) -> String {
        Self::format_json(report)
    }

    fn format_summary(&self, report: &IntentReport) -> String {
        Self::format_summary(report)
    }
}
