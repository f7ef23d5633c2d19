//! CLI entrypoint for pmcro
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use pmcro_application::{
    LlmGateway, NoProgress, OrchestrationProgress, RunIntentUseCase, ToolDispatcherPort,
};
use pmcro_domain::{CognitiveTrail, InMemoryTrail};
use pmcro_infrastructure::{
    ConfigLoader, DispatcherMode, FileConfig, HttpDispatcher, InProcessDispatcher,
    JsonlCognitiveTrail, OllamaGateway, ToolServer, default_registry,
};
use pmcro_presentation::{
    Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    let Some(command) = cli.command.clone() else {
        bail!("No command given. Try `pmcro run <INTENT>` or `pmcro --help`.");
    };

    info!("Starting pmcro ({} dispatcher)", config.dispatcher.mode);

    match command {
        Command::ServeTools => serve_tools(&config).await,
        Command::Tools => match config.dispatcher.mode {
            DispatcherMode::Local => list_tools(&local_dispatcher(&config)?).await,
            DispatcherMode::Remote => list_tools(&remote_dispatcher(&config)?).await,
        },
        Command::Run { .. } => {
            let intent = command.intent().unwrap_or_default();
            let gateway = Arc::new(
                OllamaGateway::new(
                    &config.oracle.base_url,
                    &config.oracle.model,
                    config.oracle_request_timeout(),
                )?
                .with_temperature(config.oracle.temperature),
            );
            match config.dispatcher.mode {
                DispatcherMode::Local => {
                    let dispatcher = Arc::new(local_dispatcher(&config)?);
                    run_intent(&cli, &config, gateway, dispatcher, &intent).await
                }
                DispatcherMode::Remote => {
                    let dispatcher = Arc::new(remote_dispatcher(&config)?);
                    run_intent(&cli, &config, gateway, dispatcher, &intent).await
                }
            }
        }
    }
}

/// Logs go to stderr (stdout carries reports and protocol frames), and
/// optionally to a file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn print_config_sources(config_path: Option<&Path>) {
    println!("Configuration sources (in priority order):");
    for source in ConfigLoader::config_sources(config_path) {
        let marker = if source.found { "FOUND" } else { "     " };
        println!("  [{}] {:<8} {}", marker, format!("{}:", source.label), source.location);
    }
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            token.cancel();
        }
    });
}

fn tool_server(config: &FileConfig) -> Result<ToolServer> {
    let registry = default_registry(&config.tools.to_options())?;
    info!("Registered tools: {}", registry.names().join(", "));
    Ok(ToolServer::new(Arc::new(registry)))
}

fn local_dispatcher(config: &FileConfig) -> Result<InProcessDispatcher> {
    Ok(InProcessDispatcher::new(Arc::new(tool_server(config)?)))
}

fn remote_dispatcher(config: &FileConfig) -> Result<HttpDispatcher> {
    let url = config
        .dispatcher
        .url
        .as_deref()
        .context("dispatcher.url is required in remote mode")?;
    Ok(HttpDispatcher::new(
        url,
        Duration::from_secs(config.dispatcher.call_timeout_secs),
    )?)
}

fn build_trail(config: &FileConfig) -> Result<Arc<dyn CognitiveTrail>> {
    let trail: Arc<dyn CognitiveTrail> = match &config.trail.path {
        Some(path) => {
            let trail = JsonlCognitiveTrail::open(path)
                .with_context(|| format!("Could not open trail file {}", path.display()))?;
            Arc::new(match config.trail.retention {
                Some(limit) => trail.with_retention(limit),
                None => trail,
            })
        }
        None => Arc::new(match config.trail.retention {
            Some(limit) => InMemoryTrail::new().with_retention(limit),
            None => InMemoryTrail::new(),
        }),
    };
    Ok(trail)
}

async fn serve_tools(config: &FileConfig) -> Result<ExitCode> {
    let server = tool_server(config)?;
    let token = CancellationToken::new();
    cancel_on_ctrl_c(token.clone());
    server.serve_stdio(Some(token)).await?;
    Ok(ExitCode::SUCCESS)
}

async fn list_tools<D: ToolDispatcherPort>(dispatcher: &D) -> Result<ExitCode> {
    let tools = dispatcher.list_tools().await?;
    print!("{}", ConsoleFormatter::format_tools(&tools));
    Ok(ExitCode::SUCCESS)
}

async fn run_intent<G, D>(
    cli: &Cli,
    config: &FileConfig,
    gateway: Arc<G>,
    dispatcher: Arc<D>,
    intent: &str,
) -> Result<ExitCode>
where
    G: LlmGateway + 'static,
    D: ToolDispatcherPort + 'static,
{
    let token = CancellationToken::new();
    cancel_on_ctrl_c(token.clone());

    let use_case = RunIntentUseCase::new(gateway, dispatcher, build_trail(config)?)
        .with_params(config.execution_params())
        .with_cancellation(token);

    let progress: Box<dyn OrchestrationProgress> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let report = use_case
        .execute_with_progress(intent, progress.as_ref())
        .await?;

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
