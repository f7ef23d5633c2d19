//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for intent reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full report: plan analysis, every step, verdict
    Full,
    /// One line per run
    Summary,
    /// The report as JSON
    Json,
}

/// CLI arguments for pmcro
#[derive(Parser, Debug)]
#[command(name = "pmcro")]
#[command(author, version, about = "Drive an intent through Plan, Make, Check and Reflect")]
#[command(long_about = r#"
pmcro turns a natural-language intent into a plan, executes each step against
registered tools, and asks the oracle whether the result satisfies the intent.

The cycle has four phases:
1. Plan:    the oracle produces ordered steps, each naming a tool
2. Make:    steps run one at a time through the tool dispatcher
3. Check:   the oracle judges the execution log against the intent
4. Reflect: the run is summarized into a report

Configuration files are loaded from (in priority order):
1. PMCRO_* environment variables (e.g. PMCRO_ORACLE__MODEL)
2. --config <path>     Explicit config file
3. ./pmcro.toml        Project-level config
4. ~/.config/pmcro/config.toml   Global config

Example:
  pmcro run "Echo hello, then tell me the current UTC time"
  pmcro tools
  pmcro serve-tools
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run one intent through the full cycle
    Run {
        /// The intent, in plain language
        #[arg(required = true, num_args = 1.., value_name = "INTENT")]
        intent: Vec<String>,
    },

    /// List the registered tools
    Tools,

    /// Serve the tool registry as newline-delimited JSON-RPC on stdin/stdout
    ServeTools,
}

impl Command {
    /// The intent text for `run`, words joined by single spaces.
    pub fn intent(&self) -> Option<String> {
        match self {
            Command::Run { intent } => Some(intent.join(" ")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["pmcro", "-vv", "run", "echo", "hello"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, OutputFormat::Full);
        let command = cli.command.unwrap();
        assert_eq!(command.intent().as_deref(), Some("echo hello"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["pmcro", "run", "do it", "--output", "json", "--no-config"])
                .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.no_config);
    }

    #[test]
    fn test_run_requires_intent() {
        assert!(Cli::try_parse_from(["pmcro", "run"]).is_err());
    }

    #[test]
    fn test_other_subcommands() {
        let cli = Cli::try_parse_from(["pmcro", "tools"]).unwrap();
        assert_eq!(cli.command, Some(Command::Tools));
        assert!(cli.command.unwrap().intent().is_none());

        let cli = Cli::try_parse_from(["pmcro", "serve-tools"]).unwrap();
        assert_eq!(cli.command, Some(Command::ServeTools));
    }

    #[test]
    fn test_show_config_without_subcommand() {
        let cli = Cli::try_parse_from(["pmcro", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
