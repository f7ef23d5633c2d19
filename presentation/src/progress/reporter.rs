//! Progress reporting for intent runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pmcro_application::OrchestrationProgress;
use pmcro_domain::{ExecutionRecord, Phase, Plan, PlanStep, ValidationOutcome};
use std::sync::Mutex;
use std::time::Duration;

fn phase_display_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Plan => "Plan: synthesizing steps",
        Phase::Make => "Make: executing steps",
        Phase::Check => "Check: validating outcome",
        Phase::Reflect => "Reflect: summarizing",
    }
}

/// Reports progress with a spinner for oracle waits and a bar for steps
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn step_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn replace_bar(&self, next: Option<ProgressBar>) {
        let mut slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.take() {
            previous.finish_and_clear();
        }
        *slot = next;
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bar) = slot.as_ref() {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestrationProgress for ProgressReporter {
    fn on_phase_start(&self, phase: Phase) {
        match phase {
            Phase::Plan | Phase::Check => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(Self::spinner_style());
                spinner.set_prefix(phase_display_name(phase));
                spinner.set_message("waiting for oracle...");
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.replace_bar(Some(spinner));
            }
            // on_plan_ready already installed the step bar
            Phase::Make => {}
            Phase::Reflect => self.replace_bar(None),
        }
    }

    fn on_plan_ready(&self, plan: &Plan) {
        self.replace_bar(None);
        let label = if plan.is_fallback() {
            "fallback plan".yellow().to_string()
        } else {
            format!("{} steps", plan.step_count())
        };
        eprintln!("{} {} ({})", "->".cyan(), plan.goal.bold(), label);

        let bar = ProgressBar::new(plan.step_count() as u64);
        bar.set_style(Self::step_style());
        bar.set_prefix(phase_display_name(Phase::Make));
        self.replace_bar(Some(bar));
    }

    fn on_step_start(&self, step: &PlanStep, _index: usize, _total: usize) {
        self.with_bar(|bar| bar.set_message(format!("{} ({})", step.action, step.tool)));
    }

    fn on_step_complete(&self, record: &ExecutionRecord) {
        self.with_bar(|bar| {
            let status = if record.is_success() {
                format!("{} {}", "v".green(), record.tool)
            } else {
                format!("{} {}", "x".red(), record.tool)
            };
            bar.println(format!("  {} #{}", status, record.step_order));
            bar.inc(1);
        });
    }

    fn on_validation(&self, outcome: &ValidationOutcome) {
        self.replace_bar(None);
        let verdict = if outcome.success {
            "passed".green()
        } else {
            "failed".red()
        };
        eprintln!("{} validation {}", "->".cyan(), verdict);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl OrchestrationProgress for SimpleProgress {
    fn on_phase_start(&self, phase: Phase) {
        eprintln!("{} {}", "->".cyan(), phase_display_name(phase).bold());
    }

    fn on_plan_ready(&self, plan: &Plan) {
        for step in plan.steps() {
            eprintln!("  {}. {} ({})", step.order, step.action, step.tool.dimmed());
        }
    }

    fn on_step_complete(&self, record: &ExecutionRecord) {
        if record.is_success() {
            eprintln!("  {} #{} {}", "v".green(), record.step_order, record.tool);
        } else {
            eprintln!(
                "  {} #{} {} (failed)",
                "x".red(),
                record.step_order,
                record.tool
            );
        }
    }

    fn on_validation(&self, outcome: &ValidationOutcome) {
        let mark = if outcome.success {
            "v".green()
        } else {
            "x".red()
        };
        eprintln!("  {} {}", mark, outcome.reasoning);
    }
}
