//! Output formatter trait

use pmcro_domain::IntentReport;

/// Trait for formatting intent reports
pub trait ReportFormatter {
    /// Format the complete report
    fn format(&self, report: &IntentReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &IntentReport) -> String;

    /// Format a one-line summary
    fn format_summary(&self, report: &IntentReport) -> String;
}
